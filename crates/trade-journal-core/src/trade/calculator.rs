use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::trade::validation::{validate_trade, TradeDraft};
use crate::{types::*, TradeJournalError, TradeJournalResult};

/// Fee rate applied to both entry and exit notional when none is configured.
pub const DEFAULT_FEE_RATE: Rate = dec!(0.001);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Raw figures for a single trade, as entered on the journal form.
///
/// `entry_price` and `quantity` are optional so a half-filled form can be
/// evaluated; the calculator reports no result until both are positive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeInputs {
    #[serde(default)]
    pub entry_price: Option<Money>,
    /// None while the position is still open
    #[serde(default)]
    pub exit_price: Option<Money>,
    #[serde(default)]
    pub quantity: Option<Quantity>,
    pub direction: TradeDirection,
    #[serde(default)]
    pub stop_loss: Option<Money>,
    #[serde(default)]
    pub take_profit: Option<Money>,
}

/// Derived performance figures for one evaluation of [`TradeInputs`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeCalculations {
    /// Signed result before fees; zero while the trade is open
    pub gross_pl: Money,
    /// fee_rate * quantity * (entry + exit); zero while the trade is open
    pub fees: Money,
    pub net_pl: Money,
    /// Net P&L as a percentage of entry notional (3.5 = 3.5%)
    pub roi: Rate,
    /// Magnitude of the loss if the stop is hit, never negative
    pub potential_loss: Option<Money>,
    /// Signed gain if the target is hit
    pub potential_gain: Option<Money>,
    /// potential_gain / potential_loss; None when the loss is zero
    pub risk_reward: Option<Rate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// Fraction of notional charged on each leg
    #[serde(default = "default_fee_rate")]
    pub fee_rate: Rate,
}

fn default_fee_rate() -> Rate {
    DEFAULT_FEE_RATE
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            fee_rate: DEFAULT_FEE_RATE,
        }
    }
}

impl CalculatorConfig {
    pub fn with_fee_rate(fee_rate: Rate) -> Self {
        Self { fee_rate }
    }

    /// Reject settings no calculation path accepts: a negative fee rate
    /// would turn fees into a rebate.
    pub fn validate(&self) -> TradeJournalResult<()> {
        if self.fee_rate < Decimal::ZERO {
            tracing::warn!(rate = %self.fee_rate, "rejected negative fee rate");
            return Err(TradeJournalError::InvalidInput {
                field: "fee_rate".into(),
                reason: "Fee rate cannot be negative.".into(),
            });
        }
        Ok(())
    }
}

/// Request envelope for [`evaluate_trade`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeEvaluationInput {
    pub trade: TradeInputs,
    #[serde(default)]
    pub fee_rate: Option<Rate>,
    #[serde(default)]
    pub currency: Option<Currency>,
    /// Run the stop/target consistency rules before computing
    #[serde(default = "default_validate")]
    pub validate: bool,
}

fn default_validate() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    Closed,
    Open,
    InsufficientData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeEvaluation {
    pub status: EvaluationStatus,
    pub direction: TradeDirection,
    /// entry_price * quantity; None with insufficient data
    pub notional: Option<Money>,
    pub calculations: Option<TradeCalculations>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute realised and potential figures for a trade.
///
/// Returns `None` when `entry_price` or `quantity` is missing or not
/// positive, or when a realised figure falls outside the Decimal range.
/// Potential figures and the ratio are left absent on overflow. Every price
/// difference is multiplied by the direction sign, so a short trade that
/// falls from 100 to 90 reports a positive `gross_pl`.
pub fn calculate_trade(
    inputs: &TradeInputs,
    config: &CalculatorConfig,
) -> Option<TradeCalculations> {
    let entry = positive(inputs.entry_price)?;
    let quantity = positive(inputs.quantity)?;
    let sign = inputs.direction.multiplier();

    let (gross_pl, fees, net_pl, roi) = match inputs.exit_price {
        Some(exit) => realised(entry, exit, quantity, sign, config.fee_rate)?,
        None => (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
    };

    let potential_loss = inputs
        .stop_loss
        .and_then(|stop| signed_move(stop, entry, quantity, sign))
        .map(|loss| loss.abs());
    let potential_gain = inputs
        .take_profit
        .and_then(|target| signed_move(target, entry, quantity, sign));

    let risk_reward = match (potential_gain, potential_loss) {
        (Some(gain), Some(loss)) if !loss.is_zero() => gain.checked_div(loss),
        _ => None,
    };

    Some(TradeCalculations {
        gross_pl,
        fees,
        net_pl,
        roi,
        potential_loss,
        potential_gain,
        risk_reward,
    })
}

/// Evaluate a trade request and wrap the result in the standard envelope.
///
/// With `validate` set, a trade whose stop or target sits on the wrong side
/// of entry is rejected with [`TradeJournalError::ValidationFailed`].
pub fn evaluate_trade(
    input: &TradeEvaluationInput,
) -> TradeJournalResult<ComputationOutput<TradeEvaluation>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let config = input
        .fee_rate
        .map(CalculatorConfig::with_fee_rate)
        .unwrap_or_default();
    config.validate()?;

    if input.validate {
        let report = validate_trade(&TradeDraft::from(&input.trade));
        if !report.valid {
            tracing::warn!(fields = report.errors.len(), "trade failed validation");
            return Err(TradeJournalError::ValidationFailed {
                errors: report.errors,
            });
        }
    }

    let trade = &input.trade;
    let calculations = calculate_trade(trade, &config);

    let status = match (&calculations, trade.exit_price) {
        (None, _) => EvaluationStatus::InsufficientData,
        (Some(_), Some(_)) => EvaluationStatus::Closed,
        (Some(_), None) => EvaluationStatus::Open,
    };

    if let Some(calc) = &calculations {
        if calc.potential_loss.is_some_and(|loss| loss.is_zero()) {
            warnings.push("Stop loss equals entry price; risk/reward is undefined.".into());
        }
        if calc.potential_gain.is_some_and(|gain| gain < Decimal::ZERO) {
            warnings.push(format!(
                "Take profit is on the losing side of entry for a {} trade.",
                trade.direction
            ));
        }
    } else if positive(trade.entry_price).is_some() && positive(trade.quantity).is_some() {
        warnings.push("Trade figures exceed the supported numeric range.".into());
    } else {
        warnings.push("Entry price and quantity must be positive to compute results.".into());
    }

    let notional = calculations
        .as_ref()
        .and(trade.entry_price.zip(trade.quantity))
        .and_then(|(entry, qty)| entry.checked_mul(qty));

    tracing::debug!(
        direction = %trade.direction,
        status = ?status,
        fee_rate = %config.fee_rate,
        "trade evaluated"
    );

    let output = TradeEvaluation {
        status,
        direction: trade.direction,
        notional,
        calculations,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "fee_rate": config.fee_rate.to_string(),
        "fee_model": "fee_rate applied to entry and exit notional",
        "direction_sign": "long +1, short -1",
        "roi": "net_pl / (entry_price * quantity) * 100",
        "currency": format!("{:?}", input.currency.clone().unwrap_or_default()),
    });

    Ok(with_metadata(
        "Trade P&L and Risk/Reward",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Memoised evaluation
// ---------------------------------------------------------------------------

/// Calculator that keeps the last evaluation and reuses it while the inputs
/// compare equal. Each new input set supersedes the cached result entirely.
#[derive(Debug, Clone, Default)]
pub struct MemoizedCalculator {
    config: CalculatorConfig,
    last: Option<(TradeInputs, Option<TradeCalculations>)>,
}

impl MemoizedCalculator {
    pub fn new(config: CalculatorConfig) -> Self {
        Self { config, last: None }
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: CalculatorConfig) {
        if config != self.config {
            self.config = config;
            self.last = None;
        }
    }

    /// True when the next call with `inputs` will be served from cache.
    pub fn is_cached(&self, inputs: &TradeInputs) -> bool {
        matches!(&self.last, Some((cached, _)) if cached == inputs)
    }

    pub fn evaluate(&mut self, inputs: &TradeInputs) -> Option<TradeCalculations> {
        if let Some((cached, result)) = &self.last {
            if cached == inputs {
                return result.clone();
            }
        }
        let result = calculate_trade(inputs, &self.config);
        self.last = Some((inputs.clone(), result.clone()));
        result
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn positive(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| *v > Decimal::ZERO)
}

/// (price - entry) * quantity * sign
fn signed_move(price: Decimal, entry: Decimal, quantity: Decimal, sign: Decimal) -> Option<Decimal> {
    price
        .checked_sub(entry)?
        .checked_mul(quantity)?
        .checked_mul(sign)
}

/// gross P&L, fees, net P&L and ROI for a closed trade.
fn realised(
    entry: Decimal,
    exit: Decimal,
    quantity: Decimal,
    sign: Decimal,
    fee_rate: Rate,
) -> Option<(Money, Money, Money, Rate)> {
    let gross_pl = signed_move(exit, entry, quantity, sign)?;
    let fees = fee_rate
        .checked_mul(quantity)?
        .checked_mul(entry.checked_add(exit)?)?;
    let net_pl = gross_pl.checked_sub(fees)?;
    let roi = net_pl
        .checked_div(entry.checked_mul(quantity)?)?
        .checked_mul(dec!(100))?;
    Some((gross_pl, fees, net_pl, roi))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
