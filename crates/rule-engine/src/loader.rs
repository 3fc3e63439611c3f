//! Declarative Rule Loader
//!
//! Parses a TOML rule description into a [`RuleCatalog`]. The file holds a
//! `[[rules]]` array; each entry lists the symptoms it requires (plus optional
//! age, severity and gender tests) or sets `fallback = true`.

use config::{Config, File, FileFormat};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::catalog::{Rule, RuleCatalog};
use crate::diagnosis::{Confidence, Diagnosis, Urgency};
use crate::error::{EngineError, ParseLevelError};
use crate::fact::Severity;
use crate::pattern::Condition;

#[derive(Debug, Deserialize)]
struct RuleFile {
    rules: Vec<RuleEntry>,
}

#[derive(Debug, Deserialize)]
struct RuleEntry {
    id: String,
    #[serde(default)]
    fallback: bool,
    #[serde(default)]
    symptoms: Vec<String>,
    min_age: Option<i32>,
    max_age: Option<i32>,
    min_severity: Option<String>,
    severity: Option<String>,
    gender: Option<String>,
    condition: String,
    confidence: String,
    recommendation: String,
    urgency: String,
}

impl RuleEntry {
    fn into_rule(self) -> Result<Rule, EngineError> {
        let template = Diagnosis::new(
            self.condition,
            parse_level::<Confidence>(&self.id, &self.confidence)?,
            self.recommendation,
            parse_level::<Urgency>(&self.id, &self.urgency)?,
        );

        if self.fallback {
            let has_tests = !self.symptoms.is_empty()
                || self.min_age.is_some()
                || self.max_age.is_some()
                || self.min_severity.is_some()
                || self.severity.is_some()
                || self.gender.is_some();
            if has_tests {
                return Err(EngineError::CatalogInvalid(format!(
                    "fallback rule '{}' cannot carry field tests",
                    self.id
                )));
            }
            return Ok(Rule::fallback(self.id, template));
        }

        let mut conditions: Vec<Condition> =
            self.symptoms.into_iter().map(Condition::SymptomPresent).collect();

        if self.min_age.is_some() || self.max_age.is_some() {
            conditions.push(Condition::AgeRange {
                min: self.min_age,
                max: self.max_age,
            });
        }
        if let Some(level) = &self.min_severity {
            conditions.push(Condition::SeverityAtLeast(parse_level::<Severity>(&self.id, level)?));
        }
        if let Some(level) = &self.severity {
            conditions.push(Condition::SeverityIs(parse_level::<Severity>(&self.id, level)?));
        }
        if let Some(gender) = self.gender {
            conditions.push(Condition::GenderIs(gender));
        }

        Ok(Rule::new(self.id, conditions, template))
    }
}

fn parse_level<T>(rule_id: &str, value: &str) -> Result<T, EngineError>
where
    T: std::str::FromStr<Err = ParseLevelError>,
{
    value.parse().map_err(|e: ParseLevelError| {
        EngineError::CatalogInvalid(format!("rule '{}': {}", rule_id, e))
    })
}

fn build(
    settings: Result<Config, config::ConfigError>,
    origin: &str,
) -> Result<RuleCatalog, EngineError> {
    let file: RuleFile = settings
        .and_then(|settings| settings.try_deserialize::<RuleFile>())
        .map_err(|e| EngineError::CatalogInvalid(format!("{}: {}", origin, e)))?;

    let rules = file
        .rules
        .into_iter()
        .map(RuleEntry::into_rule)
        .collect::<Result<Vec<_>, _>>()?;

    let catalog = RuleCatalog::new(rules)?;
    info!("Loaded rule catalog from {} with {} rules", origin, catalog.len());
    Ok(catalog)
}

/// Load and validate a catalog from a TOML rule file
pub fn load_catalog_file(path: impl AsRef<Path>) -> Result<RuleCatalog, EngineError> {
    let path = path.as_ref();
    let settings = Config::builder()
        .add_source(File::from(path).format(FileFormat::Toml))
        .build();
    build(settings, &path.display().to_string())
}

/// Parse and validate a catalog from TOML source text
pub fn parse_catalog(source: &str) -> Result<RuleCatalog, EngineError> {
    let settings = Config::builder()
        .add_source(File::from_str(source, FileFormat::Toml))
        .build();
    build(settings, "inline rules")
}
