//! Inference Engine Implementation

use tracing::{debug, warn};

use crate::catalog::RuleCatalog;
use crate::diagnosis::Diagnosis;
use crate::error::EngineError;
use crate::fact::PatientFact;

/// Strategy for driving a rule catalog against a fact.
///
/// Implementations must be stateless across calls so one instance can serve
/// concurrent requests.
pub trait InferenceStrategy: Send + Sync {
    /// Derive the diagnoses for `fact`, never returning an empty list
    fn infer(&self, fact: &PatientFact, catalog: &RuleCatalog)
        -> Result<Vec<Diagnosis>, EngineError>;
}

/// Single-round forward chaining in catalog order.
///
/// Every symptom rule whose pattern holds fires once; nothing re-enters the
/// match phase. The fallback is evaluated after the pass against what the pass
/// derived, so it fires only when the result list is still empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct SinglePassEngine;

impl InferenceStrategy for SinglePassEngine {
    fn infer(
        &self,
        fact: &PatientFact,
        catalog: &RuleCatalog,
    ) -> Result<Vec<Diagnosis>, EngineError> {
        if let Err(e) = fact.validate() {
            warn!("Rejecting fact: {}", e);
            return Err(e);
        }

        let mut derived = Vec::new();

        for rule in catalog.rules() {
            if rule.fires(fact, &derived) {
                debug!("Rule fired: {} -> {}", rule.id, rule.template.condition);
                derived.push(rule.diagnosis());
            }
        }

        let fallback = catalog.fallback();
        if fallback.fires(fact, &derived) {
            debug!("No symptom rule fired, applying fallback {}", fallback.id);
            derived.push(fallback.diagnosis());
        }

        debug!(
            "Inference complete: {} diagnoses for {} symptoms",
            derived.len(),
            fact.symptoms.len()
        );
        Ok(derived)
    }
}

/// Run the default single-pass engine
pub fn infer(fact: &PatientFact, catalog: &RuleCatalog) -> Result<Vec<Diagnosis>, EngineError> {
    SinglePassEngine.infer(fact, catalog)
}
