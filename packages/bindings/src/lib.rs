use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use trade_journal_core::journal::{self, JournalSummaryInput, TradeQuery, TradeRecord, TradeRepository};
use trade_journal_core::trade::{self, CalculatorConfig, TradeDraft, TradeForm};
use trade_journal_core::Rate;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Trade calculator
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_trade(input_json: String) -> NapiResult<String> {
    let input: trade::calculator::TradeEvaluationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = trade::calculator::evaluate_trade(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn validate_trade(draft_json: String) -> NapiResult<String> {
    let draft: TradeDraft = serde_json::from_str(&draft_json).map_err(to_napi_error)?;
    let report = trade::validate_trade(&draft);
    serde_json::to_string(&report).map_err(to_napi_error)
}

/// Parse raw form text and validate it; always returns a report.
#[napi]
pub fn parse_trade_form(form_json: String) -> NapiResult<String> {
    let form: TradeForm = serde_json::from_str(&form_json).map_err(to_napi_error)?;
    let report = trade::check_trade_form(&form);
    serde_json::to_string(&report).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Journal
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct QueryRequest {
    trades: Vec<TradeRecord>,
    #[serde(default)]
    query: TradeQuery,
    #[serde(default)]
    fee_rate: Option<Rate>,
}

#[napi]
pub fn query_trades(request_json: String) -> NapiResult<String> {
    let request: QueryRequest = serde_json::from_str(&request_json).map_err(to_napi_error)?;
    let config = request
        .fee_rate
        .map(CalculatorConfig::with_fee_rate)
        .unwrap_or_default();
    let repo = journal::InMemoryTradeRepository::new(request.trades).map_err(to_napi_error)?;
    let page = repo
        .fetch_page(&request.query, &config)
        .map_err(to_napi_error)?;
    serde_json::to_string(&page).map_err(to_napi_error)
}

#[napi]
pub fn summarize_journal(input_json: String) -> NapiResult<String> {
    let input: JournalSummaryInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = journal::summarize_journal(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
