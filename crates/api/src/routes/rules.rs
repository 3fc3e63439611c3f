//! Rule Catalog Routes

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

/// Catalog entry summary
#[derive(Debug, Serialize)]
pub struct RuleSummary {
    pub id: String,
    pub condition: String,
    pub fallback: bool,
}

/// Response for rules endpoint
#[derive(Debug, Serialize)]
pub struct RulesResponse {
    pub data: Vec<RuleSummary>,
    pub count: usize,
}

/// List catalog rules in firing order
pub async fn list_rules(State(state): State<Arc<AppState>>) -> Json<RulesResponse> {
    let data: Vec<RuleSummary> = state
        .catalog
        .iter()
        .map(|rule| RuleSummary {
            id: rule.id.clone(),
            condition: rule.template.condition.clone(),
            fallback: rule.is_fallback(),
        })
        .collect();

    Json(RulesResponse {
        count: data.len(),
        data,
    })
}
