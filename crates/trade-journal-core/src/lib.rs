pub mod error;
pub mod trade;
pub mod types;

#[cfg(feature = "journal")]
pub mod journal;

pub use error::TradeJournalError;
pub use types::*;

/// Standard result type for all trade-journal operations
pub type TradeJournalResult<T> = Result<T, TradeJournalError>;
