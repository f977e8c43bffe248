use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use trade_journal_core::journal::query::DEFAULT_PAGE_SIZE;
use trade_journal_core::journal::{
    summarize_journal, InMemoryTradeRepository, JournalSummaryInput, Page, SortField, SortOrder,
    TradeQuery, TradeRecord, TradeRepository, TradeStatus,
};
use trade_journal_core::trade::CalculatorConfig;
use trade_journal_core::{Money, Rate, TradeDirection};

use crate::config::CliConfig;
use crate::input;

/// Arguments for listing journal trades
#[derive(Args)]
pub struct TradesArgs {
    /// Path to JSON journal file (array of trades, or {"trades": [...]})
    #[arg(long)]
    pub input: Option<String>,

    /// Case-insensitive text matched against symbol, strategy, notes, tags
    #[arg(long)]
    pub search: Option<String>,

    /// Only trades in this direction: long, short
    #[arg(long)]
    pub direction: Option<String>,

    /// Only trades with this status: open, closed
    #[arg(long)]
    pub status: Option<String>,

    /// Only trades carrying this tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Earliest trade date (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Latest trade date (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Sort field: trade_date, symbol, net_pl, roi
    #[arg(long, default_value = "trade_date")]
    pub sort_by: String,

    /// Sort order: asc, desc
    #[arg(long, default_value = "desc")]
    pub order: String,

    /// Page number, starting at 1
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Trades per page (1-100)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Fee rate used for P&L columns and P&L sorting
    #[arg(long)]
    pub fee_rate: Option<Decimal>,
}

/// Arguments for the journal performance summary
#[derive(Args)]
pub struct SummaryArgs {
    /// Path to JSON journal file (array of trades, or {"trades": [...]})
    #[arg(long)]
    pub input: Option<String>,

    /// Fee rate per leg (0.001 = 0.1%)
    #[arg(long)]
    pub fee_rate: Option<Decimal>,
}

/// Journal files may be a bare list or a full summary request.
#[derive(Deserialize)]
#[serde(untagged)]
enum JournalFile {
    Trades(Vec<TradeRecord>),
    Request(JournalSummaryInput),
}

impl JournalFile {
    fn into_request(self) -> JournalSummaryInput {
        match self {
            JournalFile::Request(req) => req,
            JournalFile::Trades(trades) => JournalSummaryInput {
                trades,
                fee_rate: None,
                currency: None,
            },
        }
    }
}

/// One listing row: the stored fields plus computed P&L.
#[derive(Debug, Serialize)]
struct TradeRow {
    id: String,
    trade_date: NaiveDate,
    symbol: String,
    direction: TradeDirection,
    status: TradeStatus,
    entry_price: Money,
    exit_price: Option<Money>,
    quantity: Decimal,
    net_pl: Option<Money>,
    roi: Option<Rate>,
    risk_reward: Option<Rate>,
}

fn load_journal(path: Option<&str>) -> Result<JournalSummaryInput, Box<dyn std::error::Error>> {
    match input::load::<JournalFile>(path)? {
        Some(file) => Ok(file.into_request()),
        None => Err("--input <journal.json> or stdin required".into()),
    }
}

fn parse_sort_field(value: &str) -> Result<SortField, Box<dyn std::error::Error>> {
    match value.to_lowercase().as_str() {
        "trade_date" | "date" => Ok(SortField::TradeDate),
        "symbol" => Ok(SortField::Symbol),
        "net_pl" | "pnl" => Ok(SortField::NetPl),
        "roi" => Ok(SortField::Roi),
        _ => Err(format!(
            "Unknown sort field '{}'. Use: trade_date, symbol, net_pl, roi",
            value
        )
        .into()),
    }
}

fn parse_sort_order(value: &str) -> Result<SortOrder, Box<dyn std::error::Error>> {
    match value.to_lowercase().as_str() {
        "asc" => Ok(SortOrder::Asc),
        "desc" => Ok(SortOrder::Desc),
        _ => Err(format!("Unknown sort order '{}'. Use: asc, desc", value).into()),
    }
}

fn parse_status(value: &str) -> Result<TradeStatus, Box<dyn std::error::Error>> {
    match value.to_lowercase().as_str() {
        "open" => Ok(TradeStatus::Open),
        "closed" => Ok(TradeStatus::Closed),
        _ => Err(format!("Unknown status '{}'. Use: open, closed", value).into()),
    }
}

pub fn run_trades(args: TradesArgs, config: &CliConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let journal = load_journal(args.input.as_deref())?;
    let fee_rate = config
        .fee_rate(args.fee_rate.or(journal.fee_rate))
        .map(CalculatorConfig::with_fee_rate)
        .unwrap_or_default();

    let query = TradeQuery {
        search: args.search,
        direction: args
            .direction
            .as_deref()
            .map(TradeDirection::from_str)
            .transpose()?,
        status: args.status.as_deref().map(parse_status).transpose()?,
        tag: args.tag,
        date_from: args.from,
        date_to: args.to,
        sort_by: parse_sort_field(&args.sort_by)?,
        sort_order: parse_sort_order(&args.order)?,
        page: args.page,
        page_size: args
            .page_size
            .or(config.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE),
    };

    let repo = InMemoryTradeRepository::new(journal.trades)?;
    let page = repo.fetch_page(&query, &fee_rate)?;

    let rows: Vec<TradeRow> = page
        .items
        .iter()
        .map(|t| {
            let calc = t.calculations(&fee_rate);
            TradeRow {
                id: t.id.clone(),
                trade_date: t.trade_date,
                symbol: t.symbol.clone(),
                direction: t.direction,
                status: t.status(),
                entry_price: t.entry_price,
                exit_price: t.exit_price,
                quantity: t.quantity,
                net_pl: calc.as_ref().filter(|_| t.exit_price.is_some()).map(|c| c.net_pl),
                roi: calc.as_ref().filter(|_| t.exit_price.is_some()).map(|c| c.roi),
                risk_reward: calc.and_then(|c| c.risk_reward),
            }
        })
        .collect();

    let listing = Page {
        items: rows,
        total: page.total,
        page: page.page,
        page_size: page.page_size,
        total_pages: page.total_pages,
        has_next: page.has_next,
    };
    Ok(serde_json::to_value(listing)?)
}

pub fn run_summary(args: SummaryArgs, config: &CliConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let mut request = load_journal(args.input.as_deref())?;
    request.fee_rate = config.fee_rate(args.fee_rate.or(request.fee_rate));
    if request.currency.is_none() {
        request.currency = config.currency.clone();
    }
    let result = summarize_journal(&request)?;
    Ok(serde_json::to_value(result)?)
}
