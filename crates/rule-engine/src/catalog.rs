//! Diagnostic Rule Catalog
//!
//! The catalog is a fixed, ordered list of rules. Order is the firing order and
//! the order of the returned diagnoses. The last entry is always the fallback
//! rule, which fires only when nothing else did.

use std::collections::HashSet;
use tracing::{info, warn};

use crate::diagnosis::{Confidence, Diagnosis, Urgency};
use crate::error::EngineError;
use crate::fact::PatientFact;
use crate::pattern::{matches, Condition};

/// Left-hand side of a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulePattern {
    /// Conjunction of field tests against the fact
    All(Vec<Condition>),
    /// Holds while no diagnosis has been derived in the current pass
    NoDiagnosisYet,
}

/// A catalog entry pairing a pattern with the diagnosis it asserts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Stable identifier
    pub id: String,
    /// Pattern that must hold for the rule to fire
    pub pattern: RulePattern,
    /// Diagnosis asserted verbatim when the rule fires
    pub template: Diagnosis,
}

impl Rule {
    /// Create a rule over a conjunction of conditions
    pub fn new(id: impl Into<String>, conditions: Vec<Condition>, template: Diagnosis) -> Self {
        Self {
            id: id.into(),
            pattern: RulePattern::All(conditions),
            template,
        }
    }

    /// Create the negation-as-absence fallback rule
    pub fn fallback(id: impl Into<String>, template: Diagnosis) -> Self {
        Self {
            id: id.into(),
            pattern: RulePattern::NoDiagnosisYet,
            template,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.pattern, RulePattern::NoDiagnosisYet)
    }

    /// Whether the rule fires for `fact`, given what the pass has derived so far
    pub fn fires(&self, fact: &PatientFact, derived: &[Diagnosis]) -> bool {
        match &self.pattern {
            RulePattern::All(conditions) => matches(fact, conditions),
            RulePattern::NoDiagnosisYet => derived.is_empty(),
        }
    }

    /// Instantiate the rule's diagnosis
    pub fn diagnosis(&self) -> Diagnosis {
        self.template.clone()
    }

    fn check(&self) -> Result<(), EngineError> {
        if self.id.trim().is_empty() {
            return Err(EngineError::CatalogInvalid("rule with empty id".to_string()));
        }
        if self.template.condition.trim().is_empty() {
            return Err(EngineError::CatalogInvalid(format!(
                "rule '{}' has no condition text",
                self.id
            )));
        }
        if self.template.recommendation.trim().is_empty() {
            return Err(EngineError::CatalogInvalid(format!(
                "rule '{}' has no recommendation",
                self.id
            )));
        }

        let RulePattern::All(conditions) = &self.pattern else {
            return Ok(());
        };

        if conditions.is_empty() {
            return Err(EngineError::CatalogInvalid(format!(
                "rule '{}' has an empty pattern",
                self.id
            )));
        }

        for condition in conditions {
            match condition {
                Condition::SymptomPresent(token) if token.trim().is_empty() => {
                    return Err(EngineError::CatalogInvalid(format!(
                        "rule '{}' tests an empty symptom token",
                        self.id
                    )));
                }
                Condition::AgeRange {
                    min: Some(min),
                    max: Some(max),
                } if min > max => {
                    return Err(EngineError::CatalogInvalid(format!(
                        "rule '{}' has an empty age range {}..={}",
                        self.id, min, max
                    )));
                }
                Condition::AgeRange { max: Some(max), .. } if *max < 0 => {
                    return Err(EngineError::CatalogInvalid(format!(
                        "rule '{}' caps age at {}, below any valid patient age",
                        self.id, max
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }
}

/// Validated, immutable rule catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleCatalog {
    /// Symptom rules in firing order
    rules: Vec<Rule>,
    /// Terminal fallback rule
    fallback: Rule,
}

impl RuleCatalog {
    /// Validate and build a catalog.
    ///
    /// Fails with [`EngineError::CatalogInvalid`] when ids repeat, when a rule
    /// is malformed, or when there is not exactly one fallback in last position.
    pub fn new(mut rules: Vec<Rule>) -> Result<Self, EngineError> {
        if let Err(e) = Self::validate(&rules) {
            warn!("Rejecting rule catalog: {}", e);
            return Err(e);
        }

        // validate() guarantees a trailing fallback
        let fallback = rules
            .pop()
            .ok_or_else(|| EngineError::CatalogInvalid("catalog is empty".to_string()))?;

        Ok(Self { rules, fallback })
    }

    fn validate(rules: &[Rule]) -> Result<(), EngineError> {
        let mut seen = HashSet::with_capacity(rules.len());
        for rule in rules {
            rule.check()?;
            if !seen.insert(rule.id.as_str()) {
                return Err(EngineError::CatalogInvalid(format!(
                    "duplicate rule id '{}'",
                    rule.id
                )));
            }
        }

        let fallbacks: Vec<usize> = rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.is_fallback())
            .map(|(index, _)| index)
            .collect();

        match fallbacks.as_slice() {
            [] => Err(EngineError::CatalogInvalid(
                "catalog has no fallback rule".to_string(),
            )),
            [index] if *index == rules.len() - 1 => Ok(()),
            [index] => Err(EngineError::CatalogInvalid(format!(
                "fallback rule '{}' must be the last entry",
                rules[*index].id
            ))),
            many => Err(EngineError::CatalogInvalid(format!(
                "catalog has {} fallback rules, expected exactly one",
                many.len()
            ))),
        }
    }

    /// The built-in medical rule base
    pub fn builtin() -> Result<Self, EngineError> {
        let catalog = Self::new(builtin_rules())?;
        info!("Loaded built-in rule catalog with {} rules", catalog.len());
        Ok(catalog)
    }

    /// Symptom rules in firing order, without the fallback
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The terminal fallback rule
    pub fn fallback(&self) -> &Rule {
        &self.fallback
    }

    /// Every rule in catalog order, fallback last
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().chain(std::iter::once(&self.fallback))
    }

    /// Look up a rule by id
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.iter().find(|rule| rule.id == id)
    }

    /// Number of rules including the fallback
    pub fn len(&self) -> usize {
        self.rules.len() + 1
    }

    /// Always false: a valid catalog holds at least the fallback rule
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Build and validate the built-in catalog
pub fn load_catalog() -> Result<RuleCatalog, EngineError> {
    RuleCatalog::builtin()
}

fn symptoms(tokens: &[&str]) -> Vec<Condition> {
    tokens.iter().map(|token| Condition::symptom(*token)).collect()
}

fn builtin_rules() -> Vec<Rule> {
    vec![
        Rule::new(
            "influenza-check",
            symptoms(&["fever", "cough", "fatigue"]),
            Diagnosis::new(
                "Influenza (Flu)",
                Confidence::High,
                "Rest, hydration, antiviral medication (e.g., Oseltamivir). Monitor temperature. Seek emergency care if breathing difficulty develops.",
                Urgency::Moderate,
            ),
        ),
        Rule::new(
            "cardiac-check",
            symptoms(&["chest-pain", "shortness-of-breath"]),
            Diagnosis::new(
                "Possible Cardiac Event",
                Confidence::High,
                "Immediate medical attention required. Call emergency services. Do not exert yourself. Take aspirin if not allergic.",
                Urgency::Critical,
            ),
        ),
        Rule::new(
            "migraine-check",
            symptoms(&["headache", "nausea", "light-sensitivity"]),
            Diagnosis::new(
                "Migraine",
                Confidence::Moderate,
                "Rest in a dark, quiet room. Over-the-counter pain relievers (ibuprofen, acetaminophen). Consider prescription triptans if recurrent.",
                Urgency::Low,
            ),
        ),
        Rule::new(
            "arthritis-check",
            symptoms(&["joint-pain", "swelling", "morning-stiffness"]),
            Diagnosis::new(
                "Rheumatoid Arthritis",
                Confidence::Moderate,
                "Anti-inflammatory medication (NSAIDs). Physical therapy. Consult a rheumatologist for disease-modifying therapy.",
                Urgency::Moderate,
            ),
        ),
        Rule::new(
            "diabetes-check",
            symptoms(&["frequent-urination", "excessive-thirst", "fatigue"]),
            Diagnosis::new(
                "Type 2 Diabetes Mellitus",
                Confidence::Moderate,
                "Blood glucose testing recommended. Dietary modifications, regular exercise. Consult endocrinologist for HbA1c testing.",
                Urgency::Moderate,
            ),
        ),
        Rule::new(
            "autoimmune-check",
            symptoms(&["skin-rash", "joint-pain", "fatigue"]),
            Diagnosis::new(
                "Systemic Lupus Erythematosus",
                Confidence::Moderate,
                "Antinuclear antibody (ANA) testing recommended. Limit sun exposure. Consult a rheumatologist for further evaluation.",
                Urgency::Moderate,
            ),
        ),
        Rule::fallback(
            "general-assessment",
            Diagnosis::new(
                "General Assessment Required",
                Confidence::Low,
                "Symptoms do not match a specific pattern. Comprehensive physical examination and laboratory workup recommended.",
                Urgency::Low,
            ),
        ),
    ]
}
