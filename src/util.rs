use chrono::{SecondsFormat, Utc};
use thiserror::Error;

/// Problems the calculator knows how to report.
///
/// None of these leave the history in a partially applied state, so the
/// front-end can print the message and keep going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Operation error: {0}")]
    Operation(String),
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl CalcError {
    /// Short label used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            CalcError::Validation(_) => "validation",
            CalcError::Operation(_) => "operation",
            CalcError::UnknownOperation(_) => "unknown-operation",
            CalcError::Persistence(_) => "persistence",
        }
    }
}

/// Current UTC instant as second-precision ISO-8601 with a `Z` suffix
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
