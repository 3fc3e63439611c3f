//! Rule Engine Error Types

use thiserror::Error;

/// Errors raised by the rule engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Rule catalog failed validation at load time
    #[error("Rule catalog invalid: {0}")]
    CatalogInvalid(String),

    /// Patient fact is not well-formed
    #[error("Invalid patient fact: {0}")]
    InvalidFact(String),
}

/// Unknown value for one of the closed level sets (severity, confidence, urgency)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseLevelError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseLevelError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
