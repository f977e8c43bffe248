use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::trade::calculator::TradeInputs;
use crate::{types::*, TradeJournalError, TradeJournalResult};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A trade as submitted for acceptance: every field may still be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeDraft {
    #[serde(default)]
    pub direction: Option<TradeDirection>,
    #[serde(default)]
    pub entry_price: Option<Money>,
    #[serde(default)]
    pub exit_price: Option<Money>,
    #[serde(default)]
    pub quantity: Option<Quantity>,
    #[serde(default)]
    pub stop_loss: Option<Money>,
    #[serde(default)]
    pub take_profit: Option<Money>,
}

/// Pass/fail plus one human-readable message per offending field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: BTreeMap<String, String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: BTreeMap::new(),
        }
    }

    /// Record a violation. The first message recorded for a field is kept.
    pub fn reject(&mut self, field: &str, message: impl Into<String>) {
        self.valid = false;
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn into_result(self) -> TradeJournalResult<()> {
        if self.valid {
            Ok(())
        } else {
            Err(TradeJournalError::ValidationFailed {
                errors: self.errors,
            })
        }
    }
}

impl From<&TradeInputs> for TradeDraft {
    fn from(inputs: &TradeInputs) -> Self {
        Self {
            direction: Some(inputs.direction),
            entry_price: inputs.entry_price,
            exit_price: inputs.exit_price,
            quantity: inputs.quantity,
            stop_loss: inputs.stop_loss,
            take_profit: inputs.take_profit,
        }
    }
}

impl TradeDraft {
    /// Validate the draft and convert it into calculator inputs.
    pub fn validated_inputs(&self) -> TradeJournalResult<TradeInputs> {
        validate_trade(self).into_result()?;
        // validate_trade rejects a missing direction
        let direction = self.direction.unwrap_or_default();
        Ok(TradeInputs {
            entry_price: self.entry_price,
            exit_price: self.exit_price,
            quantity: self.quantity,
            direction,
            stop_loss: self.stop_loss,
            take_profit: self.take_profit,
        })
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Check a draft against the trade acceptance rules.
///
/// A stop loss must sit on the losing side of entry and a take profit on the
/// winning side, relative to direction. Directional rules only run once the
/// direction and a positive entry price are known.
pub fn validate_trade(draft: &TradeDraft) -> ValidationReport {
    let mut report = ValidationReport::new();

    if draft.direction.is_none() {
        report.reject("direction", "Direction is required (long or short).");
    }

    match draft.entry_price {
        None => report.reject("entry_price", "Entry price is required."),
        Some(p) if p <= Decimal::ZERO => {
            report.reject("entry_price", "Entry price must be greater than zero.")
        }
        _ => {}
    }

    if let Some(p) = draft.exit_price {
        if p <= Decimal::ZERO {
            report.reject("exit_price", "Exit price must be greater than zero.");
        }
    }

    match draft.quantity {
        None => report.reject("quantity", "Quantity is required."),
        Some(q) if q <= Decimal::ZERO => {
            report.reject("quantity", "Quantity must be greater than zero.")
        }
        Some(q) if !q.fract().is_zero() => {
            report.reject("quantity", "Quantity must be a whole number.")
        }
        _ => {}
    }

    for (field, label, value) in [
        ("stop_loss", "Stop loss", draft.stop_loss),
        ("take_profit", "Take profit", draft.take_profit),
    ] {
        if let Some(v) = value {
            if v <= Decimal::ZERO {
                report.reject(field, format!("{label} must be greater than zero."));
            }
        }
    }

    let entry = draft.entry_price.filter(|p| *p > Decimal::ZERO);
    if let (Some(direction), Some(entry)) = (draft.direction, entry) {
        if let Some(stop) = draft.stop_loss {
            let coherent = match direction {
                TradeDirection::Long => stop < entry,
                TradeDirection::Short => stop > entry,
            };
            if !coherent {
                let side = match direction {
                    TradeDirection::Long => "below",
                    TradeDirection::Short => "above",
                };
                report.reject(
                    "stop_loss",
                    format!("Stop loss must be {side} entry price for {direction} positions."),
                );
            }
        }
        if let Some(target) = draft.take_profit {
            let coherent = match direction {
                TradeDirection::Long => target > entry,
                TradeDirection::Short => target < entry,
            };
            if !coherent {
                let side = match direction {
                    TradeDirection::Long => "above",
                    TradeDirection::Short => "below",
                };
                report.reject(
                    "take_profit",
                    format!("Take profit must be {side} entry price for {direction} positions."),
                );
            }
        }
    }

    report
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
