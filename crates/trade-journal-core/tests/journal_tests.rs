use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use trade_journal_core::journal::{
    summarize_journal, InMemoryTradeRepository, JournalSummaryInput, SortField, SortOrder,
    TradeQuery, TradeRecord, TradeRepository, TradeStatus,
};
use trade_journal_core::trade::CalculatorConfig;
use trade_journal_core::TradeDirection;

// ===========================================================================
// Journal fixtures
// ===========================================================================

const JOURNAL_JSON: &str = r#"[
    {"id": "1", "symbol": "AAPL", "trade_date": "2025-04-01", "direction": "long",
     "entry_price": 170, "exit_price": 175, "quantity": 20,
     "stop_loss": 165, "take_profit": 185, "strategy": "Breakout", "tags": ["swing"]},
    {"id": "2", "symbol": "TSLA", "trade_date": "2025-04-02", "direction": "short",
     "entry_price": 250, "exit_price": 240, "quantity": 10, "notes": "Faded the open"},
    {"id": "3", "symbol": "SPY", "trade_date": "2025-04-03", "direction": "long",
     "entry_price": 510, "exit_price": 505, "quantity": 5, "tags": ["index", "swing"]},
    {"id": "4", "symbol": "QQQ", "trade_date": "2025-04-04", "direction": "short",
     "entry_price": 440, "quantity": 3, "stop_loss": 450, "take_profit": 420},
    {"id": "5", "symbol": "AMD", "trade_date": "2025-04-07", "direction": "long",
     "entry_price": 160, "exit_price": 168, "quantity": 15, "strategy": "Pullback"}
]"#;

fn journal() -> Vec<TradeRecord> {
    serde_json::from_str(JOURNAL_JSON).unwrap()
}

// ===========================================================================
// Paginated listing
// ===========================================================================

#[test]
fn test_records_deserialize_with_defaults() {
    let trades = journal();
    assert_eq!(trades.len(), 5);
    assert_eq!(trades[3].status(), TradeStatus::Open);
    assert_eq!(trades[1].direction, TradeDirection::Short);
    assert!(trades[1].tags.is_empty());
    assert_eq!(trades[0].stop_loss, Some(dec!(165)));
}

#[test]
fn test_repository_walks_every_page() {
    let repo = InMemoryTradeRepository::new(journal()).unwrap();
    let config = CalculatorConfig::default();
    let mut query = TradeQuery {
        page_size: 2,
        sort_order: SortOrder::Asc,
        ..Default::default()
    };

    let mut seen = Vec::new();
    loop {
        let page = repo.fetch_page(&query, &config).unwrap();
        assert!(page.items.len() <= 2);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        seen.extend(page.items.iter().map(|t| t.id.clone()));
        if !page.has_next {
            break;
        }
        query.page += 1;
    }
    assert_eq!(seen, vec!["1", "2", "3", "4", "5"]);
}

#[test]
fn test_search_with_sort_by_roi() {
    let repo = InMemoryTradeRepository::new(journal()).unwrap();
    let query = TradeQuery {
        tag: Some("swing".into()),
        sort_by: SortField::Roi,
        sort_order: SortOrder::Desc,
        ..Default::default()
    };
    let page = repo.fetch_page(&query, &CalculatorConfig::default()).unwrap();
    let ids: Vec<&str> = page.items.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
}

// ===========================================================================
// Summary
// ===========================================================================

#[test]
fn test_summary_over_journal() {
    let out = summarize_journal(&JournalSummaryInput {
        trades: journal(),
        fee_rate: Some(dec!(0)),
        currency: None,
    })
    .unwrap();
    let s = &out.result;
    // +100, +100, -25, +120 on closed trades
    assert_eq!(s.closed_trades, 4);
    assert_eq!(s.open_trades, 1);
    assert_eq!(s.total_net_pl, dec!(295));
    assert_eq!(s.win_rate, dec!(0.75));
    assert_eq!(s.profit_factor, Some(dec!(12.8)));
    assert_eq!(s.max_drawdown, dec!(25));
    assert_eq!(s.max_consecutive_wins, 2);
    // AAPL 300/100 = 3, QQQ 60/30 = 2
    assert_eq!(s.average_risk_reward, Some(dec!(2.5)));
    assert_eq!(out.methodology, "Trade Journal Performance Summary");
}

#[test]
fn test_summary_serialises_decimals_as_strings() {
    let out = summarize_journal(&JournalSummaryInput {
        trades: journal(),
        fee_rate: None,
        currency: None,
    })
    .unwrap();
    let value = serde_json::to_value(&out).unwrap();
    assert!(value["result"]["total_net_pl"].is_string());
    assert_eq!(value["result"]["total_trades"], 5);
}
