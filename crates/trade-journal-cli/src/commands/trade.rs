use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use trade_journal_core::trade::calculator::{self, TradeEvaluationInput, TradeInputs};
use trade_journal_core::trade::form::{self, TradeForm};
use trade_journal_core::TradeDirection;

use crate::config::CliConfig;
use crate::input;

/// Arguments for trade P&L and risk/reward evaluation
#[derive(Args)]
pub struct TradeArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Entry price per unit
    #[arg(long)]
    pub entry_price: Option<Decimal>,

    /// Exit price per unit; omit for an open position
    #[arg(long)]
    pub exit_price: Option<Decimal>,

    /// Shares or contracts
    #[arg(long)]
    pub quantity: Option<Decimal>,

    /// Trade direction: long, short
    #[arg(long, default_value = "long")]
    pub direction: String,

    /// Stop-loss price
    #[arg(long)]
    pub stop_loss: Option<Decimal>,

    /// Take-profit price
    #[arg(long)]
    pub take_profit: Option<Decimal>,

    /// Fee rate charged on each leg's notional (0.001 = 0.1%)
    #[arg(long)]
    pub fee_rate: Option<Decimal>,

    /// Skip the stop/target consistency rules
    #[arg(long)]
    pub no_validate: bool,
}

/// Arguments for trade form validation. Values are taken as raw text.
#[derive(Args)]
pub struct ValidateArgs {
    /// Path to JSON file holding the raw form fields
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long)]
    pub direction: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub entry_price: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub exit_price: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub quantity: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub stop_loss: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub take_profit: Option<String>,
}

pub fn run_trade(args: TradeArgs, config: &CliConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let mut request: TradeEvaluationInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if args.entry_price.is_some() {
        TradeEvaluationInput {
            trade: TradeInputs {
                entry_price: args.entry_price,
                exit_price: args.exit_price,
                quantity: args.quantity,
                direction: TradeDirection::from_str(&args.direction)?,
                stop_loss: args.stop_loss,
                take_profit: args.take_profit,
            },
            fee_rate: None,
            currency: None,
            validate: true,
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--entry-price, --input <file.json> or stdin required for trade evaluation".into());
    };

    request.fee_rate = config.fee_rate(args.fee_rate.or(request.fee_rate));
    if request.currency.is_none() {
        request.currency = config.currency.clone();
    }
    if args.no_validate {
        request.validate = false;
    }

    let result = calculator::evaluate_trade(&request)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_validate(args: ValidateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let from_flags = TradeForm {
        direction: args.direction,
        entry_price: args.entry_price,
        exit_price: args.exit_price,
        quantity: args.quantity,
        stop_loss: args.stop_loss,
        take_profit: args.take_profit,
    };
    let trade_form: TradeForm = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if !from_flags.is_blank() {
        from_flags
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("form fields as flags, --input <file.json> or stdin required for validation".into());
    };
    let report = form::check_trade_form(&trade_form);
    Ok(serde_json::to_value(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::fs;
    use tempfile::TempDir;

    const REQUEST_WITH_FEE: &str = r#"{
        "trade": {"entry_price": 100, "exit_price": 110, "quantity": 10, "direction": "long"},
        "fee_rate": "0.002"
    }"#;
    const REQUEST_WITHOUT_FEE: &str = r#"{
        "trade": {"entry_price": 100, "exit_price": 110, "quantity": 10, "direction": "long"}
    }"#;

    fn write_request(dir: &TempDir, body: &str) -> String {
        let path = dir.path().join("trade.json");
        fs::write(&path, body).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn args(input: String, fee_rate: Option<Decimal>) -> TradeArgs {
        TradeArgs {
            input: Some(input),
            entry_price: None,
            exit_price: None,
            quantity: None,
            direction: "long".into(),
            stop_loss: None,
            take_profit: None,
            fee_rate,
            no_validate: false,
        }
    }

    fn config_with_fee(rate: Decimal) -> CliConfig {
        CliConfig {
            fee_rate: Some(rate),
            ..Default::default()
        }
    }

    fn applied_fee_rate(out: &Value) -> &str {
        out["assumptions"]["fee_rate"].as_str().unwrap()
    }

    #[test]
    fn test_flag_fee_rate_beats_request_and_config() {
        let dir = TempDir::new().unwrap();
        let path = write_request(&dir, REQUEST_WITH_FEE);
        let out = run_trade(args(path, Some(dec!(0.01))), &config_with_fee(dec!(0.005))).unwrap();
        assert_eq!(applied_fee_rate(&out), "0.01");
    }

    #[test]
    fn test_request_fee_rate_beats_config() {
        let dir = TempDir::new().unwrap();
        let path = write_request(&dir, REQUEST_WITH_FEE);
        let out = run_trade(args(path, None), &config_with_fee(dec!(0.005))).unwrap();
        assert_eq!(applied_fee_rate(&out), "0.002");
    }

    #[test]
    fn test_config_fee_rate_then_library_default() {
        let dir = TempDir::new().unwrap();
        let path = write_request(&dir, REQUEST_WITHOUT_FEE);
        let out = run_trade(args(path.clone(), None), &config_with_fee(dec!(0.005))).unwrap();
        assert_eq!(applied_fee_rate(&out), "0.005");

        let out = run_trade(args(path, None), &CliConfig::default()).unwrap();
        assert_eq!(applied_fee_rate(&out), "0.001");
    }

    #[test]
    fn test_negative_flag_fee_rate_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_request(&dir, REQUEST_WITH_FEE);
        assert!(run_trade(args(path, Some(dec!(-0.01))), &CliConfig::default()).is_err());
    }
}
