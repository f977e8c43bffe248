use rust_decimal::Decimal;
use serde::Deserialize;

use trade_journal_core::Currency;

use crate::input::file;

/// Settings read from `--config <file>`. Flags given on the command line
/// take precedence over anything set here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Fee rate per leg, e.g. 0.001 for 0.1%
    pub fee_rate: Option<Decimal>,
    pub currency: Option<Currency>,
    /// Default page size for `tj trades`
    pub page_size: Option<u32>,
}

impl CliConfig {
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        match path {
            Some(p) => {
                let config: CliConfig = file::read_yaml(p)?;
                tracing::debug!(?config, "loaded config file");
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// An explicitly requested rate wins over the config file; None leaves
    /// the library default in place.
    pub fn fee_rate(&self, explicit: Option<Decimal>) -> Option<Decimal> {
        explicit.or(self.fee_rate)
    }
}
