use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TradeJournalError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Validation failed: {}", describe_fields(.errors))]
    ValidationFailed { errors: BTreeMap<String, String> },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

fn describe_fields(errors: &BTreeMap<String, String>) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<serde_json::Error> for TradeJournalError {
    fn from(e: serde_json::Error) -> Self {
        TradeJournalError::SerializationError(e.to_string())
    }
}
