use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanTrackerError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Month index {index} is outside the statement (0..{len})")]
    MonthOutOfRange { index: usize, len: usize },

    #[error("Loan {index} not found ({count} loans on record)")]
    LoanNotFound { index: usize, count: usize },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for LoanTrackerError {
    fn from(e: serde_json::Error) -> Self {
        LoanTrackerError::SerializationError(e.to_string())
    }
}
