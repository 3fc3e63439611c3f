//! Diagnosis Routes

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use intake::PatientIntake;
use metrics::counter;
use rule_engine::Diagnosis;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

/// Response for diagnose endpoint
#[derive(Debug, Serialize)]
pub struct DiagnoseResponse {
    pub source: &'static str,
    pub data: Vec<Diagnosis>,
}

/// Run the rule engine over submitted patient data
#[instrument(name = "diagnose", skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn diagnose(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PatientIntake>, JsonRejection>,
) -> Result<Json<DiagnoseResponse>, ApiError> {
    counter!("diagnose_requests_total").increment(1);

    let data = evaluate(&state, payload).inspect_err(|e| {
        counter!("diagnose_rejected_total").increment(1);
        warn!("Diagnose request rejected: {}", e);
    })?;

    for diagnosis in &data {
        counter!("diagnoses_total", "condition" => diagnosis.condition.clone()).increment(1);
    }

    info!(
        "Diagnose complete: {}",
        data.iter()
            .map(|d| d.condition.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(Json(DiagnoseResponse {
        source: "rules",
        data,
    }))
}

fn evaluate(
    state: &AppState,
    payload: Result<Json<PatientIntake>, JsonRejection>,
) -> Result<Vec<Diagnosis>, ApiError> {
    let Json(request) = payload?;
    let fact = state.validator.build_fact(request)?;
    Ok(state.engine.infer(&fact, &state.catalog)?)
}
