use thiserror::Error;

/// Failures reported by a [`QueryExecutor`](crate::QueryExecutor).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("pipeline execution failed: {0}")]
    Execution(String),

    #[error("could not encode pipeline: {0}")]
    Encode(String),

    #[error("unexpected document shape: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid date format for {param}: {value:?} (expected YYYY or DD/MM/YYYY)")]
    InvalidDateFormat { param: &'static str, value: String },

    #[error(transparent)]
    StoreExecution(#[from] StoreError),
}
