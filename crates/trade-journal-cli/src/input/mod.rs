pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Load a typed request from `--input <file>` or piped stdin, in that order.
/// Returns `None` when neither source supplied anything.
pub fn load<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_json(path)?));
    }
    stdin::read_stdin()
}
