//! Patient Fact Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{EngineError, ParseLevelError};

/// Reported severity of the patient's complaint
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    #[default]
    Moderate,
    Severe,
    Critical,
}

impl Severity {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mild" => Ok(Severity::Mild),
            "moderate" => Ok(Severity::Moderate),
            "severe" => Ok(Severity::Severe),
            "critical" => Ok(Severity::Critical),
            _ => Err(ParseLevelError::new("severity", s)),
        }
    }
}

/// One patient observation submitted for diagnosis.
///
/// Symptoms are normalized tokens (`chest-pain`, `fever`). Their order and
/// duplicates carry no meaning to the matcher, which tests membership only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientFact {
    /// Patient name
    pub name: String,
    /// Age in years
    pub age: i32,
    /// Free-form gender string
    pub gender: String,
    /// Normalized symptom tokens
    pub symptoms: Vec<String>,
    /// Complaint severity (defaults to moderate)
    #[serde(default)]
    pub severity: Severity,
}

impl PatientFact {
    /// Create a fact with no symptoms and moderate severity
    pub fn new(name: impl Into<String>, age: i32, gender: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age,
            gender: gender.into(),
            symptoms: Vec::new(),
            severity: Severity::default(),
        }
    }

    pub fn with_symptoms<I, S>(mut self, symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symptoms = symptoms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Whether the symptom token appears anywhere in the fact
    pub fn has_symptom(&self, token: &str) -> bool {
        self.symptoms.iter().any(|s| s == token)
    }

    /// Check structural well-formedness before inference
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.name.trim().is_empty() {
            return Err(EngineError::InvalidFact("patient name is empty".to_string()));
        }

        if self.age < 0 {
            return Err(EngineError::InvalidFact(format!(
                "age must be non-negative, got {}",
                self.age
            )));
        }

        for (position, token) in self.symptoms.iter().enumerate() {
            if token.is_empty() || token.chars().any(char::is_whitespace) {
                return Err(EngineError::InvalidFact(format!(
                    "symptom at position {} is malformed: {:?}",
                    position, token
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_default_is_moderate() {
        assert_eq!(Severity::default(), Severity::Moderate);

        let fact: PatientFact = serde_json::from_str(
            r#"{"name":"Ana","age":30,"gender":"female","symptoms":["fever"]}"#,
        )
        .unwrap();
        assert_eq!(fact.severity, Severity::Moderate);
    }

    #[test]
    fn test_severity_ordering_and_parse() {
        assert!(Severity::Mild < Severity::Moderate);
        assert!(Severity::Severe < Severity::Critical);
        assert_eq!(" Severe ".parse::<Severity>().unwrap(), Severity::Severe);
        assert!("extreme".parse::<Severity>().is_err());
    }

    #[test]
    fn test_negative_age_rejected() {
        let fact = PatientFact::new("Ana", -1, "female");
        assert!(matches!(fact.validate(), Err(EngineError::InvalidFact(_))));
    }

    #[test]
    fn test_empty_symptom_token_rejected() {
        let fact = PatientFact::new("Ana", 30, "female").with_symptoms(["fever", ""]);
        assert!(matches!(fact.validate(), Err(EngineError::InvalidFact(_))));

        let fact = PatientFact::new("Ana", 30, "female").with_symptoms(["chest pain"]);
        assert!(fact.validate().is_err());
    }

    #[test]
    fn test_blank_name_rejected() {
        let fact = PatientFact::new("   ", 30, "female");
        assert!(fact.validate().is_err());
    }

    #[test]
    fn test_membership_ignores_order() {
        let fact = PatientFact::new("Ana", 30, "female").with_symptoms(["cough", "fever", "cough"]);
        assert!(fact.has_symptom("fever"));
        assert!(fact.has_symptom("cough"));
        assert!(!fact.has_symptom("fatigue"));
        assert!(fact.validate().is_ok());
    }
}
