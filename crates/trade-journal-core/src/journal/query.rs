use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::journal::record::{TradeRecord, TradeStatus};
use crate::trade::calculator::CalculatorConfig;
use crate::{types::*, TradeJournalError, TradeJournalResult};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

// ---------------------------------------------------------------------------
// Query types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    TradeDate,
    Symbol,
    NetPl,
    Roi,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filter, sort and page parameters for a journal listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeQuery {
    pub search: Option<String>,
    pub direction: Option<TradeDirection>,
    pub status: Option<TradeStatus>,
    pub tag: Option<String>,
    /// Inclusive lower bound on trade date
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on trade date
    pub date_to: Option<NaiveDate>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    /// 1-based
    pub page: u32,
    pub page_size: u32,
}

impl Default for TradeQuery {
    fn default() -> Self {
        Self {
            search: None,
            direction: None,
            status: None,
            tag: None,
            date_from: None,
            date_to: None,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl TradeQuery {
    pub fn validate(&self) -> TradeJournalResult<()> {
        if self.page == 0 {
            return Err(TradeJournalError::InvalidInput {
                field: "page".into(),
                reason: "Page numbers start at 1.".into(),
            });
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(TradeJournalError::InvalidInput {
                field: "page_size".into(),
                reason: format!("Page size must be between 1 and {}.", MAX_PAGE_SIZE),
            });
        }
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(TradeJournalError::InvalidInput {
                    field: "date_from".into(),
                    reason: "date_from must not be after date_to.".into(),
                });
            }
        }
        Ok(())
    }

    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.page_size as usize
    }

    pub fn matches(&self, record: &TradeRecord) -> bool {
        if let Some(search) = &self.search {
            if !record.matches_search(search) {
                return false;
            }
        }
        if self.direction.is_some_and(|d| d != record.direction) {
            return false;
        }
        if self.status.is_some_and(|s| s != record.status()) {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !record.has_tag(tag) {
                return false;
            }
        }
        if self.date_from.is_some_and(|from| record.trade_date < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| record.trade_date > to) {
            return false;
        }
        true
    }
}

/// One page of results plus the totals needed to render pagination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Number of records matching the filters, across all pages
    pub total: usize,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub has_next: bool,
}

// ---------------------------------------------------------------------------
// Repository
// ---------------------------------------------------------------------------

/// Source of journal trades. The hosted database sits behind this trait.
pub trait TradeRepository {
    fn fetch_page(
        &self,
        query: &TradeQuery,
        config: &CalculatorConfig,
    ) -> TradeJournalResult<Page<TradeRecord>>;
}

/// Repository over an in-memory list, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTradeRepository {
    trades: Vec<TradeRecord>,
}

impl InMemoryTradeRepository {
    /// Load a journal; trade ids must be unique, as with [`Self::insert`].
    pub fn new(trades: Vec<TradeRecord>) -> TradeJournalResult<Self> {
        let mut repo = Self {
            trades: Vec::with_capacity(trades.len()),
        };
        for record in trades {
            repo.insert(record)?;
        }
        Ok(repo)
    }

    pub fn insert(&mut self, record: TradeRecord) -> TradeJournalResult<()> {
        if self.trades.iter().any(|t| t.id == record.id) {
            return Err(TradeJournalError::Repository(format!(
                "Duplicate trade id: {}",
                record.id
            )));
        }
        self.trades.push(record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }
}

impl TradeRepository for InMemoryTradeRepository {
    fn fetch_page(
        &self,
        query: &TradeQuery,
        config: &CalculatorConfig,
    ) -> TradeJournalResult<Page<TradeRecord>> {
        paginate(&self.trades, query, config)
    }
}

/// Filter, sort and slice `trades` according to `query`.
pub fn paginate(
    trades: &[TradeRecord],
    query: &TradeQuery,
    config: &CalculatorConfig,
) -> TradeJournalResult<Page<TradeRecord>> {
    config.validate()?;
    query.validate()?;

    let mut matched: Vec<&TradeRecord> = trades.iter().filter(|t| query.matches(t)).collect();
    sort_records(&mut matched, query.sort_by, query.sort_order, config);

    let total = matched.len();
    let page_size = query.page_size as usize;
    let total_pages = total.div_ceil(page_size) as u32;
    let offset = query.offset();

    let items: Vec<TradeRecord> = matched
        .into_iter()
        .skip(offset)
        .take(page_size)
        .cloned()
        .collect();
    let has_next = offset + items.len() < total;

    tracing::debug!(
        total,
        page = query.page,
        returned = items.len(),
        "journal page fetched"
    );

    Ok(Page {
        items,
        total,
        page: query.page,
        page_size: query.page_size,
        total_pages,
        has_next,
    })
}

fn sort_records(
    records: &mut [&TradeRecord],
    field: SortField,
    order: SortOrder,
    config: &CalculatorConfig,
) {
    let compare = |a: &&TradeRecord, b: &&TradeRecord| -> Ordering {
        match field {
            SortField::TradeDate => a.trade_date.cmp(&b.trade_date),
            SortField::Symbol => a.symbol.to_lowercase().cmp(&b.symbol.to_lowercase()),
            SortField::NetPl | SortField::Roi => {
                sort_metric(a, field, config).cmp(&sort_metric(b, field, config))
            }
        }
    };
    match order {
        SortOrder::Asc => records.sort_by(compare),
        SortOrder::Desc => records.sort_by(|a, b| compare(b, a)),
    }
}

/// Open trades and trades without a computable result sort as zero.
fn sort_metric(record: &TradeRecord, field: SortField, config: &CalculatorConfig) -> Decimal {
    match (record.calculations(config), field) {
        (Some(c), SortField::NetPl) => c.net_pl,
        (Some(c), SortField::Roi) => c.roi,
        _ => Decimal::ZERO,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::record::fixtures::{date, record};
    use rust_decimal_macros::dec;

    fn journal() -> Vec<TradeRecord> {
        let mut t1 = record("t1", "AAPL", date(2025, 1, 2), TradeDirection::Long, dec!(100), Some(dec!(110)), dec!(10));
        t1.tags = vec!["swing".into()];
        let t2 = record("t2", "TSLA", date(2025, 1, 3), TradeDirection::Short, dec!(200), Some(dec!(210)), dec!(5));
        let mut t3 = record("t3", "MSFT", date(2025, 1, 4), TradeDirection::Long, dec!(300), None, dec!(2));
        t3.notes = Some("Waiting on AAPL earnings read-through".into());
        let t4 = record("t4", "AMZN", date(2025, 1, 5), TradeDirection::Long, dec!(50), Some(dec!(49)), dec!(100));
        let t5 = record("t5", "NVDA", date(2025, 1, 6), TradeDirection::Short, dec!(80), Some(dec!(70)), dec!(10));
        vec![t1, t2, t3, t4, t5]
    }

    fn ids(page: &Page<TradeRecord>) -> Vec<&str> {
        page.items.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_default_query_newest_first() {
        let page = paginate(&journal(), &TradeQuery::default(), &CalculatorConfig::default()).unwrap();
        assert_eq!(ids(&page), vec!["t5", "t4", "t3", "t2", "t1"]);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next);
    }

    #[test]
    fn test_offset_pagination() {
        let query = TradeQuery {
            page: 2,
            page_size: 2,
            sort_order: SortOrder::Asc,
            ..Default::default()
        };
        let page = paginate(&journal(), &query, &CalculatorConfig::default()).unwrap();
        assert_eq!(ids(&page), vec!["t3", "t4"]);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next);

        let last = TradeQuery { page: 3, ..query.clone() };
        let page = paginate(&journal(), &last, &CalculatorConfig::default()).unwrap();
        assert_eq!(ids(&page), vec!["t5"]);
        assert!(!page.has_next);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let query = TradeQuery {
            page: 9,
            ..Default::default()
        };
        let page = paginate(&journal(), &query, &CalculatorConfig::default()).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 5);
        assert!(!page.has_next);
    }

    #[test]
    fn test_search_and_filters() {
        let query = TradeQuery {
            search: Some("aapl".into()),
            ..Default::default()
        };
        let page = paginate(&journal(), &query, &CalculatorConfig::default()).unwrap();
        // t3 mentions AAPL in its notes
        assert_eq!(ids(&page), vec!["t3", "t1"]);

        let query = TradeQuery {
            direction: Some(TradeDirection::Short),
            status: Some(TradeStatus::Closed),
            ..Default::default()
        };
        let page = paginate(&journal(), &query, &CalculatorConfig::default()).unwrap();
        assert_eq!(ids(&page), vec!["t5", "t2"]);

        let query = TradeQuery {
            tag: Some("Swing".into()),
            ..Default::default()
        };
        let page = paginate(&journal(), &query, &CalculatorConfig::default()).unwrap();
        assert_eq!(ids(&page), vec!["t1"]);

        let query = TradeQuery {
            date_from: Some(date(2025, 1, 3)),
            date_to: Some(date(2025, 1, 4)),
            ..Default::default()
        };
        let page = paginate(&journal(), &query, &CalculatorConfig::default()).unwrap();
        assert_eq!(ids(&page), vec!["t3", "t2"]);
    }

    #[test]
    fn test_sort_by_net_pl() {
        // Zero fees: t1 +100, t2 -50, t3 open 0, t4 -100, t5 +100
        let query = TradeQuery {
            sort_by: SortField::NetPl,
            sort_order: SortOrder::Asc,
            ..Default::default()
        };
        let page = paginate(
            &journal(),
            &query,
            &CalculatorConfig::with_fee_rate(Decimal::ZERO),
        )
        .unwrap();
        assert_eq!(ids(&page), vec!["t4", "t2", "t3", "t1", "t5"]);
    }

    #[test]
    fn test_sort_by_symbol_desc() {
        let query = TradeQuery {
            sort_by: SortField::Symbol,
            ..Default::default()
        };
        let page = paginate(&journal(), &query, &CalculatorConfig::default()).unwrap();
        assert_eq!(ids(&page), vec!["t2", "t5", "t3", "t4", "t1"]);
    }

    #[test]
    fn test_invalid_paging_rejected() {
        let zero_page = TradeQuery {
            page: 0,
            ..Default::default()
        };
        assert!(paginate(&journal(), &zero_page, &CalculatorConfig::default()).is_err());

        let huge = TradeQuery {
            page_size: MAX_PAGE_SIZE + 1,
            ..Default::default()
        };
        assert!(matches!(
            paginate(&journal(), &huge, &CalculatorConfig::default()),
            Err(TradeJournalError::InvalidInput { ref field, .. }) if field == "page_size"
        ));

        let inverted = TradeQuery {
            date_from: Some(date(2025, 2, 1)),
            date_to: Some(date(2025, 1, 1)),
            ..Default::default()
        };
        assert!(matches!(
            paginate(&journal(), &inverted, &CalculatorConfig::default()),
            Err(TradeJournalError::InvalidInput { ref field, .. }) if field == "date_from"
        ));
    }

    #[test]
    fn test_negative_fee_rate_rejected() {
        let flat = vec![record("t1", "AAPL", date(2025, 1, 2), TradeDirection::Long, dec!(100), Some(dec!(100)), dec!(10))];
        let query = TradeQuery {
            sort_by: SortField::NetPl,
            ..Default::default()
        };
        assert!(matches!(
            paginate(&flat, &query, &CalculatorConfig::with_fee_rate(dec!(-1))),
            Err(TradeJournalError::InvalidInput { ref field, .. }) if field == "fee_rate"
        ));

        let repo = InMemoryTradeRepository::new(flat).unwrap();
        assert!(repo
            .fetch_page(&query, &CalculatorConfig::with_fee_rate(dec!(-0.001)))
            .is_err());
        assert!(repo.fetch_page(&query, &CalculatorConfig::default()).is_ok());
    }

    #[test]
    fn test_repository_new_rejects_duplicate_ids() {
        let mut trades = journal();
        trades[3].id = "t1".into();
        assert!(matches!(
            InMemoryTradeRepository::new(trades),
            Err(TradeJournalError::Repository(ref msg)) if msg.contains("t1")
        ));
    }

    #[test]
    fn test_repository_rejects_duplicate_ids() {
        let mut repo = InMemoryTradeRepository::new(journal()).unwrap();
        let dup = repo.trades()[0].clone();
        assert!(repo.insert(dup).is_err());
        assert_eq!(repo.len(), 5);

        let query = TradeQuery {
            page_size: 3,
            ..Default::default()
        };
        let page = repo.fetch_page(&query, &CalculatorConfig::default()).unwrap();
        assert_eq!(page.items.len(), 3);
        assert!(page.has_next);
    }

    #[test]
    fn test_query_from_partial_json() {
        let query: TradeQuery =
            serde_json::from_str(r#"{"search": "nv", "sort_by": "roi", "page_size": 25}"#).unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 25);
        assert_eq!(query.sort_by, SortField::Roi);
        assert_eq!(query.sort_order, SortOrder::Desc);
    }
}
