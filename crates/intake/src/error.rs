//! Intake Error Types

use rule_engine::EngineError;
use thiserror::Error;

/// Errors during intake validation
#[derive(Debug, Clone, Error)]
pub enum IntakeError {
    /// Missing or blank required field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Severity outside mild/moderate/severe/critical
    #[error("Unknown severity: {0}")]
    UnknownSeverity(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Fact rejected by the engine
    #[error(transparent)]
    Engine(#[from] EngineError),
}
