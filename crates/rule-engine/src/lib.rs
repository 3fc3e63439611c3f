//! Diagnostic Rule Engine
//!
//! Evaluates a patient fact against an ordered catalog of symptom rules and
//! returns every diagnosis whose pattern holds, falling back to a general
//! assessment when no rule fires.

mod catalog;
mod diagnosis;
mod engine;
mod error;
mod fact;
mod loader;
mod pattern;

pub use catalog::{load_catalog, Rule, RuleCatalog, RulePattern};
pub use diagnosis::{Confidence, Diagnosis, Urgency};
pub use engine::{infer, InferenceStrategy, SinglePassEngine};
pub use error::{EngineError, ParseLevelError};
pub use fact::{PatientFact, Severity};
pub use loader::{load_catalog_file, parse_catalog};
pub use pattern::{matches, Condition};
