use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::trade::validation::{validate_trade, TradeDraft, ValidationReport};
use crate::{types::*, TradeJournalError, TradeJournalResult};

/// Raw text of the trade entry form, one string per field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradeForm {
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub entry_price: Option<String>,
    #[serde(default)]
    pub exit_price: Option<String>,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub stop_loss: Option<String>,
    #[serde(default)]
    pub take_profit: Option<String>,
}

impl TradeForm {
    /// True when no field carries any non-whitespace text.
    pub fn is_blank(&self) -> bool {
        [
            &self.direction,
            &self.entry_price,
            &self.exit_price,
            &self.quantity,
            &self.stop_loss,
            &self.take_profit,
        ]
        .into_iter()
        .all(|f| non_blank(f).is_none())
    }
}

/// Parse form text into a typed draft.
///
/// Blank fields become `None`. Every unparseable field is reported, not just
/// the first, so the form can flag them all at once.
pub fn parse_trade_form(form: &TradeForm) -> TradeJournalResult<TradeDraft> {
    let mut report = ValidationReport::new();

    let direction = match non_blank(&form.direction) {
        None => None,
        Some(text) => match TradeDirection::from_str(text) {
            Ok(d) => Some(d),
            Err(reason) => {
                report.reject("direction", reason);
                None
            }
        },
    };

    let draft = TradeDraft {
        direction,
        entry_price: parse_number(&mut report, "entry_price", &form.entry_price),
        exit_price: parse_number(&mut report, "exit_price", &form.exit_price),
        quantity: parse_number(&mut report, "quantity", &form.quantity),
        stop_loss: parse_number(&mut report, "stop_loss", &form.stop_loss),
        take_profit: parse_number(&mut report, "take_profit", &form.take_profit),
    };

    if !report.valid {
        tracing::debug!(fields = ?report.errors.keys().collect::<Vec<_>>(), "form parse failed");
    }
    report.into_result()?;
    Ok(draft)
}

/// Parse then validate, producing one combined report.
///
/// Fields that failed to parse carry their parse message; the remaining
/// fields are checked against the trade acceptance rules.
pub fn check_trade_form(form: &TradeForm) -> ValidationReport {
    match parse_trade_form(form) {
        Ok(draft) => validate_trade(&draft),
        Err(TradeJournalError::ValidationFailed { errors }) => {
            let partial = lenient_draft(form);
            let mut report = validate_trade(&partial);
            // Parse messages take precedence over "is required"
            for (field, message) in errors {
                report.errors.insert(field, message);
            }
            report.valid = false;
            report
        }
        Err(other) => {
            let mut report = ValidationReport::new();
            report.reject("form", other.to_string());
            report
        }
    }
}

fn lenient_draft(form: &TradeForm) -> TradeDraft {
    let number = |raw: &Option<String>| non_blank(raw).and_then(|t| parse_decimal(t).ok());
    TradeDraft {
        direction: non_blank(&form.direction).and_then(|t| TradeDirection::from_str(t).ok()),
        entry_price: number(&form.entry_price),
        exit_price: number(&form.exit_price),
        quantity: number(&form.quantity),
        stop_loss: number(&form.stop_loss),
        take_profit: number(&form.take_profit),
    }
}

fn non_blank(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_number(
    report: &mut ValidationReport,
    field: &str,
    raw: &Option<String>,
) -> Option<Decimal> {
    let text = non_blank(raw)?;
    match parse_decimal(text) {
        Ok(v) => Some(v),
        Err(()) => {
            report.reject(field, format!("'{}' is not a valid number.", text));
            None
        }
    }
}

/// Accepts "1,234.50", "$99" and "1e3" style input.
fn parse_decimal(text: &str) -> Result<Decimal, ()> {
    let cleaned: String = text
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| ())
}
