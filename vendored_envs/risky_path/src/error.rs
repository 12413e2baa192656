use thiserror::Error;

/// Errors raised by the Risky Path engine.
///
/// Configuration problems are reported once, at construction. The only error
/// a running episode can produce is an out-of-range integer action.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskyPathError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid action {0} (expected 0..=3: west, north, east, south)")]
    InvalidAction(i64),
}

impl RiskyPathError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        RiskyPathError::InvalidConfiguration(msg.into())
    }
}
