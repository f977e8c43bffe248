pub mod query;
pub mod record;
pub mod summary;

pub use query::{paginate, InMemoryTradeRepository, Page, SortField, SortOrder, TradeQuery, TradeRepository};
pub use record::{TradeRecord, TradeStatus};
pub use summary::{summarize_journal, JournalSummary, JournalSummaryInput};
