//! Patient Intake
//!
//! Normalizes free-text symptoms into rule tokens and validates raw patient
//! data before it reaches the rule engine.

mod error;
mod normalizer;
mod validator;

pub use error::IntakeError;
pub use normalizer::SymptomNormalizer;
pub use validator::{IntakeConfig, IntakeValidator, PatientIntake};
