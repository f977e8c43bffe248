pub mod calculator;
pub mod form;
pub mod validation;

pub use calculator::{
    calculate_trade, evaluate_trade, CalculatorConfig, MemoizedCalculator, TradeCalculations,
    TradeInputs,
};
pub use form::{check_trade_form, parse_trade_form, TradeForm};
pub use validation::{validate_trade, TradeDraft, ValidationReport};
