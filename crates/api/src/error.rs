//! API Error Types

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use intake::IntakeError;
use rule_engine::EngineError;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the API server
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request body was not a well-formed patient record
    #[error("Invalid request body: {}", .0.body_text())]
    BadRequest(#[from] JsonRejection),

    /// Request data failed intake validation
    #[error(transparent)]
    Intake(#[from] IntakeError),

    /// Rule engine failure
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Socket or server I/O failure
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::Config(err.to_string())
    }
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_)
            | ApiError::Intake(_)
            | ApiError::Engine(EngineError::InvalidFact(_)) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
