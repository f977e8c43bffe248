use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

use crate::journal::record::{TradeRecord, TradeStatus};
use crate::trade::calculator::{calculate_trade, CalculatorConfig, TradeCalculations};
use crate::{types::*, TradeJournalError, TradeJournalResult};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalSummaryInput {
    pub trades: Vec<TradeRecord>,
    #[serde(default)]
    pub fee_rate: Option<Rate>,
    #[serde(default)]
    pub currency: Option<Currency>,
}

/// Aggregate performance over the closed trades of a journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalSummary {
    pub total_trades: u32,
    pub open_trades: u32,
    pub closed_trades: u32,
    pub winning_trades: u32,
    pub losing_trades: u32,
    pub breakeven_trades: u32,
    /// winning / closed
    pub win_rate: Rate,
    pub total_gross_pl: Money,
    pub total_fees: Money,
    pub total_net_pl: Money,
    pub average_net_pl: Money,
    /// Mean of per-trade ROI percentages
    pub average_roi: Rate,
    pub largest_win: Money,
    /// Stored as a positive magnitude
    pub largest_loss: Money,
    /// Sum of winning net P&L / |sum of losing net P&L|; None without losses
    pub profit_factor: Option<Rate>,
    /// Mean planned risk/reward over trades where it is defined
    pub average_risk_reward: Option<Rate>,
    /// Largest peak-to-trough decline of cumulative net P&L
    pub max_drawdown: Money,
    pub max_consecutive_wins: u32,
    pub max_consecutive_losses: u32,
    pub equity_curve: Vec<JournalCurvePoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalCurvePoint {
    pub trade_date: NaiveDate,
    pub id: String,
    pub net_pl: Money,
    pub cumulative_net_pl: Money,
    pub drawdown: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Summarise a journal: counts over every trade, P&L statistics over the
/// closed ones in trade-date order.
pub fn summarize_journal(
    input: &JournalSummaryInput,
) -> TradeJournalResult<ComputationOutput<JournalSummary>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let config = input
        .fee_rate
        .map(CalculatorConfig::with_fee_rate)
        .unwrap_or_default();
    config.validate()?;
    validate_input(input)?;

    // -- Per-trade calculations ----------------------------------------------
    let mut closed: Vec<(&TradeRecord, TradeCalculations)> = Vec::new();
    let mut open_trades: u32 = 0;
    let mut risk_rewards: Vec<Rate> = Vec::new();

    for trade in &input.trades {
        let calc = match calculate_trade(&trade.inputs(), &config) {
            Some(c) => c,
            None => {
                warnings.push(format!(
                    "Trade {} skipped: entry price and quantity must be positive and its figures within numeric range.",
                    trade.id
                ));
                continue;
            }
        };
        if let Some(rr) = calc.risk_reward {
            risk_rewards.push(rr);
        }
        match trade.status() {
            TradeStatus::Open => open_trades += 1,
            TradeStatus::Closed => closed.push((trade, calc)),
        }
    }
    // Stable: same-day trades keep journal order
    closed.sort_by_key(|(t, _)| t.trade_date);

    let net: Vec<Money> = closed.iter().map(|(_, c)| c.net_pl).collect();
    let winners: Vec<Money> = net.iter().copied().filter(|&p| p > Decimal::ZERO).collect();
    let losers: Vec<Money> = net.iter().copied().filter(|&p| p < Decimal::ZERO).collect();

    let closed_trades = closed.len() as u32;
    let winning_trades = winners.len() as u32;
    let losing_trades = losers.len() as u32;
    let breakeven_trades = closed_trades - winning_trades - losing_trades;

    // -- Totals --------------------------------------------------------------
    let total_gross_pl = checked_sum(closed.iter().map(|(_, c)| c.gross_pl))?;
    let total_fees = checked_sum(closed.iter().map(|(_, c)| c.fees))?;
    let total_net_pl = checked_sum(net.iter().copied())?;
    let gross_wins = checked_sum(winners.iter().copied())?;
    let gross_losses = checked_sum(losers.iter().copied())?.abs();

    let (win_rate, average_net_pl, average_roi) = if closed_trades > 0 {
        let n = Decimal::from(closed_trades);
        let roi_sum = checked_sum(closed.iter().map(|(_, c)| c.roi))?;
        (
            Decimal::from(winning_trades) / n,
            total_net_pl / n,
            roi_sum / n,
        )
    } else {
        (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
    };

    let largest_win = winners.iter().copied().max().unwrap_or(Decimal::ZERO);
    let largest_loss = losers
        .iter()
        .copied()
        .map(|d| d.abs())
        .max()
        .unwrap_or(Decimal::ZERO);

    let profit_factor = if gross_losses > Decimal::ZERO {
        gross_wins.checked_div(gross_losses)
    } else {
        None
    };

    let average_risk_reward = if risk_rewards.is_empty() {
        None
    } else {
        let n = Decimal::from(risk_rewards.len() as u32);
        Some(checked_sum(risk_rewards.iter().copied())? / n)
    };

    // -- Streaks and equity curve --------------------------------------------
    let (max_consecutive_wins, max_consecutive_losses) = compute_streaks(&net);

    let mut equity_curve = Vec::with_capacity(closed.len());
    let mut cumulative = Decimal::ZERO;
    let mut peak = Decimal::ZERO;
    let mut max_drawdown = Decimal::ZERO;
    for (trade, calc) in &closed {
        cumulative = cumulative
            .checked_add(calc.net_pl)
            .ok_or_else(out_of_range)?;
        if cumulative > peak {
            peak = cumulative;
        }
        let drawdown = peak.checked_sub(cumulative).ok_or_else(out_of_range)?;
        if drawdown > max_drawdown {
            max_drawdown = drawdown;
        }
        equity_curve.push(JournalCurvePoint {
            trade_date: trade.trade_date,
            id: trade.id.clone(),
            net_pl: calc.net_pl,
            cumulative_net_pl: cumulative,
            drawdown,
        });
    }

    if closed_trades == 0 {
        warnings.push("No closed trades; P&L statistics are zero.".into());
    }

    tracing::debug!(
        total = input.trades.len(),
        closed = closed_trades,
        open = open_trades,
        "journal summarised"
    );

    let output = JournalSummary {
        total_trades: input.trades.len() as u32,
        open_trades,
        closed_trades,
        winning_trades,
        losing_trades,
        breakeven_trades,
        win_rate,
        total_gross_pl,
        total_fees,
        total_net_pl,
        average_net_pl,
        average_roi,
        largest_win,
        largest_loss,
        profit_factor,
        average_risk_reward,
        max_drawdown,
        max_consecutive_wins,
        max_consecutive_losses,
        equity_curve,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "fee_rate": config.fee_rate.to_string(),
        "ordering": "closed trades by trade_date, journal order within a day",
        "drawdown": "peak-to-trough on cumulative net P&L, peak starts at zero",
        "profit_factor": "sum of winning net P&L / |sum of losing net P&L|",
        "currency": format!("{:?}", input.currency.clone().unwrap_or_default()),
    });

    Ok(with_metadata(
        "Trade Journal Performance Summary",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_input(input: &JournalSummaryInput) -> TradeJournalResult<()> {
    if input.trades.is_empty() {
        return Err(TradeJournalError::InsufficientData(
            "At least one trade is required.".into(),
        ));
    }
    let mut seen = HashSet::new();
    for trade in &input.trades {
        if !seen.insert(trade.id.as_str()) {
            return Err(TradeJournalError::InvalidInput {
                field: "id".into(),
                reason: format!("Duplicate trade id: {}. Trade ids must be unique.", trade.id),
            });
        }
    }
    Ok(())
}

fn out_of_range() -> TradeJournalError {
    TradeJournalError::InvalidInput {
        field: "trades".into(),
        reason: "Journal totals exceed the supported numeric range.".into(),
    }
}

fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> TradeJournalResult<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
        .ok_or_else(out_of_range)
}

/// Longest runs of winning and losing trades; breakeven resets both.
fn compute_streaks(pnls: &[Money]) -> (u32, u32) {
    let mut max_wins = 0;
    let mut max_losses = 0;
    let mut wins = 0;
    let mut losses = 0;
    for &pnl in pnls {
        if pnl > Decimal::ZERO {
            wins += 1;
            losses = 0;
        } else if pnl < Decimal::ZERO {
            losses += 1;
            wins = 0;
        } else {
            wins = 0;
            losses = 0;
        }
        max_wins = max_wins.max(wins);
        max_losses = max_losses.max(losses);
    }
    (max_wins, max_losses)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
