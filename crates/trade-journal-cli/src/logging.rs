use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `--verbose` forces debug level, otherwise
/// `RUST_LOG` is honoured with a default of `warn`.
pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
