//! Patient Intake Validator

use rule_engine::{PatientFact, Severity};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::IntakeError;
use crate::normalizer::SymptomNormalizer;

/// Intake validation limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Accepted age range in years (inclusive)
    pub age_range: (i32, i32),
    /// Maximum number of distinct symptoms per request
    pub max_symptoms: usize,
    /// Maximum patient name length in characters
    pub max_name_len: usize,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            age_range: (0, 150),
            max_symptoms: 64,
            max_name_len: 200,
        }
    }
}

/// Raw patient data as submitted by a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientIntake {
    pub name: String,
    pub age: i32,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    /// Severity label; absent means moderate
    #[serde(default)]
    pub severity: Option<String>,
}

/// Builds well-formed patient facts from raw intake data
#[derive(Debug, Clone, Default)]
pub struct IntakeValidator {
    config: IntakeConfig,
    normalizer: SymptomNormalizer,
}

impl IntakeValidator {
    /// Create a new validator with given config
    pub fn new(config: IntakeConfig) -> Self {
        Self {
            config,
            normalizer: SymptomNormalizer::new(),
        }
    }

    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    /// Validate raw intake and produce an engine-ready fact
    pub fn build_fact(&self, intake: PatientIntake) -> Result<PatientFact, IntakeError> {
        let fact = self.check(intake).inspect_err(|e| warn!("Intake rejected: {}", e))?;
        fact.validate()?;
        debug!(
            "Intake accepted: age={}, severity={}, symptoms={:?}",
            fact.age, fact.severity, fact.symptoms
        );
        Ok(fact)
    }

    fn check(&self, intake: PatientIntake) -> Result<PatientFact, IntakeError> {
        let name = intake.name.trim();
        if name.is_empty() {
            return Err(IntakeError::MissingField("name"));
        }
        if name.chars().count() > self.config.max_name_len {
            return Err(IntakeError::InvalidFormat(format!(
                "name longer than {} characters",
                self.config.max_name_len
            )));
        }

        let (min_age, max_age) = self.config.age_range;
        if intake.age < min_age || intake.age > max_age {
            return Err(IntakeError::OutOfRange {
                field: "age",
                value: intake.age.into(),
                min: min_age.into(),
                max: max_age.into(),
            });
        }

        let severity = match intake.severity.as_deref().map(str::trim) {
            None | Some("") => Severity::default(),
            Some(label) => label
                .parse()
                .map_err(|_| IntakeError::UnknownSeverity(label.to_string()))?,
        };

        let symptoms = self.normalizer.normalize_all(&intake.symptoms);
        if symptoms.len() > self.config.max_symptoms {
            return Err(IntakeError::OutOfRange {
                field: "symptoms",
                value: symptoms.len() as i64,
                min: 0,
                max: self.config.max_symptoms as i64,
            });
        }

        Ok(PatientFact::new(name, intake.age, intake.gender.trim())
            .with_symptoms(symptoms)
            .with_severity(severity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intake(symptoms: &[&str], severity: Option<&str>) -> PatientIntake {
        PatientIntake {
            name: "Sam Rivera".to_string(),
            age: 34,
            gender: "male".to_string(),
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            severity: severity.map(str::to_string),
        }
    }

    #[test]
    fn test_builds_normalized_fact() {
        let validator = IntakeValidator::default();
        let fact = validator
            .build_fact(intake(&["Chest Pain", "Shortness of Breath", "chest pain"], Some("Severe")))
            .unwrap();

        assert_eq!(fact.symptoms, vec!["chest-pain", "shortness-of-breath"]);
        assert_eq!(fact.severity, Severity::Severe);
        assert_eq!(fact.name, "Sam Rivera");
    }

    #[test]
    fn test_severity_defaults_to_moderate() {
        let validator = IntakeValidator::default();
        assert_eq!(validator.build_fact(intake(&["fever"], None)).unwrap().severity, Severity::Moderate);
        assert_eq!(validator.build_fact(intake(&["fever"], Some(" "))).unwrap().severity, Severity::Moderate);
    }

    #[test]
    fn test_unknown_severity_rejected() {
        let validator = IntakeValidator::default();
        let err = validator.build_fact(intake(&["fever"], Some("unbearable"))).unwrap_err();
        assert!(matches!(err, IntakeError::UnknownSeverity(ref s) if s == "unbearable"));
    }

    #[test]
    fn test_age_out_of_range() {
        let validator = IntakeValidator::default();
        let mut negative = intake(&["fever"], None);
        negative.age = -4;
        assert!(matches!(
            validator.build_fact(negative),
            Err(IntakeError::OutOfRange { field: "age", .. })
        ));

        let mut ancient = intake(&["fever"], None);
        ancient.age = 200;
        assert!(validator.build_fact(ancient).is_err());
    }

    #[test]
    fn test_blank_name_rejected() {
        let validator = IntakeValidator::default();
        let mut anonymous = intake(&["fever"], None);
        anonymous.name = "  ".to_string();
        assert!(matches!(
            validator.build_fact(anonymous),
            Err(IntakeError::MissingField("name"))
        ));
    }

    #[test]
    fn test_symptom_limit() {
        let validator = IntakeValidator::new(IntakeConfig {
            max_symptoms: 2,
            ..Default::default()
        });
        assert!(validator.build_fact(intake(&["a", "b", "c"], None)).is_err());
        assert!(validator.build_fact(intake(&["a", "b", "A"], None)).is_ok());
    }

    #[test]
    fn test_request_deserialization() {
        let request: PatientIntake = serde_json::from_str(
            r#"{"name":"Sam","age":34,"gender":"male","symptoms":["Fever","Cough"]}"#,
        )
        .unwrap();
        assert_eq!(request.severity, None);

        let fact = IntakeValidator::default().build_fact(request).unwrap();
        assert_eq!(fact.symptoms, vec!["fever", "cough"]);
    }
}
