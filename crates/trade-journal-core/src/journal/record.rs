use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::trade::calculator::{calculate_trade, CalculatorConfig, TradeCalculations, TradeInputs};
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Closed,
}

/// A trade as stored in the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: String,
    /// Ticker, e.g. "AAPL", "ES"
    pub symbol: String,
    pub trade_date: NaiveDate,
    pub direction: TradeDirection,
    pub entry_price: Money,
    /// None if the position is still open
    #[serde(default)]
    pub exit_price: Option<Money>,
    pub quantity: Quantity,
    #[serde(default)]
    pub stop_loss: Option<Money>,
    #[serde(default)]
    pub take_profit: Option<Money>,
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TradeRecord {
    pub fn status(&self) -> TradeStatus {
        if self.exit_price.is_some() {
            TradeStatus::Closed
        } else {
            TradeStatus::Open
        }
    }

    pub fn inputs(&self) -> TradeInputs {
        TradeInputs {
            entry_price: Some(self.entry_price),
            exit_price: self.exit_price,
            quantity: Some(self.quantity),
            direction: self.direction,
            stop_loss: self.stop_loss,
            take_profit: self.take_profit,
        }
    }

    pub fn calculations(&self, config: &CalculatorConfig) -> Option<TradeCalculations> {
        calculate_trade(&self.inputs(), config)
    }

    /// Case-insensitive match on symbol, strategy, notes and tags.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let hit = |text: &str| text.to_lowercase().contains(&needle);
        hit(&self.symbol)
            || self.strategy.as_deref().is_some_and(hit)
            || self.notes.as_deref().is_some_and(hit)
            || self.tags.iter().any(|t| hit(t))
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_follows_exit_price() {
        let open = record("t1", "AAPL", date(2025, 3, 3), TradeDirection::Long, dec!(100), None, dec!(10));
        assert_eq!(open.status(), TradeStatus::Open);
        let mut closed = open.clone();
        closed.exit_price = Some(dec!(101));
        assert_eq!(closed.status(), TradeStatus::Closed);
    }

    #[test]
    fn test_record_calculations() {
        let rec = record(
            "t1",
            "TSLA",
            date(2025, 3, 3),
            TradeDirection::Short,
            dec!(200),
            Some(dec!(190)),
            dec!(10),
        );
        let calc = rec.calculations(&CalculatorConfig::default()).unwrap();
        assert_eq!(calc.gross_pl, dec!(100));
        assert_eq!(calc.fees, dec!(3.9));
        assert_eq!(calc.net_pl, dec!(96.1));
    }

    #[test]
    fn test_search_matches_all_text_fields() {
        let mut rec = record("t1", "NVDA", date(2025, 3, 3), TradeDirection::Long, dec!(100), None, dec!(1));
        rec.strategy = Some("Breakout".into());
        rec.notes = Some("Entered after earnings gap".into());
        rec.tags = vec!["Momentum".into()];
        assert!(rec.matches_search("nvd"));
        assert!(rec.matches_search("BREAK"));
        assert!(rec.matches_search("earnings"));
        assert!(rec.matches_search("momentum"));
        assert!(rec.matches_search("  "));
        assert!(!rec.matches_search("reversal"));
        assert!(rec.has_tag("MOMENTUM"));
    }
}
