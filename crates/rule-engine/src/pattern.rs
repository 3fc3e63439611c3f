//! Rule Patterns and Matcher
//!
//! A pattern is a conjunction of field tests over a [`PatientFact`]. Symptom
//! tests check membership anywhere in the symptom list; position is ignored.

use crate::fact::{PatientFact, Severity};

/// A single test against one field of a patient fact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Symptom token is present
    SymptomPresent(String),
    /// Age lies within the inclusive bounds (either end may be open)
    AgeRange { min: Option<i32>, max: Option<i32> },
    /// Severity is at least the given level
    SeverityAtLeast(Severity),
    /// Severity equals the given level
    SeverityIs(Severity),
    /// Gender equals the given value, ignoring ASCII case
    GenderIs(String),
}

impl Condition {
    /// Shorthand for [`Condition::SymptomPresent`]
    pub fn symptom(token: impl Into<String>) -> Self {
        Condition::SymptomPresent(token.into())
    }

    /// Evaluate this test against a fact
    pub fn holds(&self, fact: &PatientFact) -> bool {
        match self {
            Condition::SymptomPresent(token) => fact.has_symptom(token),
            Condition::AgeRange { min, max } => {
                min.map_or(true, |min| fact.age >= min) && max.map_or(true, |max| fact.age <= max)
            }
            Condition::SeverityAtLeast(level) => fact.severity >= *level,
            Condition::SeverityIs(level) => fact.severity == *level,
            Condition::GenderIs(gender) => fact.gender.eq_ignore_ascii_case(gender),
        }
    }
}

/// True iff every condition of the conjunction holds for the fact
pub fn matches(fact: &PatientFact, pattern: &[Condition]) -> bool {
    pattern.iter().all(|condition| condition.holds(fact))
}
