//! Medical Expert System API Server
//!
//! REST front end for the diagnostic rule engine. The engine and catalog are
//! immutable after start-up, so handlers share them without locking.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use intake::IntakeValidator;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use rule_engine::{
    load_catalog, load_catalog_file, InferenceStrategy, RuleCatalog, SinglePassEngine,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tower_governor::GovernorLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod error;
mod rate_limit;
mod routes;
mod settings;

pub use error::ApiError;
pub use rate_limit::{create_governor_config, DiagnoseGovernorConfig, RateLimitConfig};
pub use settings::ServerConfig;

/// Application state shared across handlers
pub struct AppState {
    /// Validated rule catalog
    pub catalog: Arc<RuleCatalog>,
    /// Inference strategy
    pub engine: Box<dyn InferenceStrategy>,
    /// Intake validation
    pub validator: IntakeValidator,
    /// Prometheus exporter handle, if a recorder is installed
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create state around a catalog with the single-pass engine
    pub fn new(catalog: RuleCatalog, validator: IntakeValidator) -> Self {
        Self {
            catalog: Arc::new(catalog),
            engine: Box::new(SinglePassEngine),
            validator,
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub rule_count: usize,
}

/// Create the application router.
///
/// When `governor` is set the diagnose route is rate limited per peer IP.
pub fn create_router(
    state: Arc<AppState>,
    governor: Option<Arc<DiagnoseGovernorConfig>>,
) -> Router {
    let mut diagnose =
        Router::new().route("/api/v1/diagnose", post(routes::diagnose::diagnose));
    if let Some(config) = governor {
        diagnose = diagnose.layer(GovernorLayer { config });
    }

    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/rules", get(routes::rules::list_rules))
        .route("/metrics", get(metrics_handler))
        .merge(diagnose)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        rule_count: state.catalog.len(),
    })
}

/// Prometheus scrape handler
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics recorder not installed".to_string(),
        ),
    }
}

/// Initialize logging at the given level
pub fn init_logging(level: &str) -> Result<(), ApiError> {
    let level = Level::from_str(level)
        .map_err(|_| ApiError::Config(format!("unknown log level '{}'", level)))?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| ApiError::Config(format!("failed to set tracing subscriber: {}", e)))
}

/// Load the catalog named by the config, or the built-in one
pub fn build_catalog(config: &ServerConfig) -> Result<RuleCatalog, ApiError> {
    let catalog = match &config.rules_path {
        Some(path) => load_catalog_file(path)?,
        None => load_catalog()?,
    };
    Ok(catalog)
}

/// Run the server
pub async fn run_server(config: ServerConfig) -> Result<(), ApiError> {
    let catalog = build_catalog(&config)?;
    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ApiError::Config(format!("failed to install metrics recorder: {}", e)))?;

    let state = Arc::new(
        AppState::new(catalog, IntakeValidator::new(config.intake.clone())).with_metrics(metrics),
    );
    let governor = create_governor_config(&config.rate_limit)?;
    let app = create_router(state, Some(governor));

    info!("Starting API server on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::extract::ConnectInfo;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_router() -> Router {
        let catalog = load_catalog().unwrap();
        let state = Arc::new(AppState::new(catalog, IntakeValidator::default()));
        create_router(state, None)
    }

    fn diagnose_request(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/diagnose")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, String) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn post_diagnose(body: Value) -> (StatusCode, Value) {
        let (status, text) = send(test_router(), diagnose_request(body.to_string())).await;
        (status, serde_json::from_str(&text).unwrap())
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, text) = send(test_router(), request).await;
        (status, serde_json::from_str(&text).unwrap())
    }

    #[tokio::test]
    async fn test_diagnose_flu_and_lupus() {
        let (status, body) = post_diagnose(json!({
            "name": "Maria Lopez",
            "age": 29,
            "gender": "female",
            "symptoms": ["Fever", "Cough", "Fatigue", "Skin Rash", "Joint Pain"],
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "rules");
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["condition"], "Influenza (Flu)");
        assert_eq!(data[0]["confidence"], "High");
        assert_eq!(data[1]["condition"], "Systemic Lupus Erythematosus");
    }

    #[tokio::test]
    async fn test_diagnose_cardiac_critical() {
        let (status, body) = post_diagnose(json!({
            "name": "Lee",
            "age": 67,
            "gender": "male",
            "symptoms": ["chest pain", "shortness of breath"],
            "severity": "severe",
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["urgency"], "Critical");
    }

    #[tokio::test]
    async fn test_diagnose_fallback() {
        let (status, body) = post_diagnose(json!({
            "name": "Lee",
            "age": 40,
            "gender": "male",
            "symptoms": [],
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["condition"], "General Assessment Required");
    }

    #[tokio::test]
    async fn test_diagnose_rejects_negative_age() {
        let (status, body) = post_diagnose(json!({
            "name": "Lee",
            "age": -1,
            "gender": "male",
            "symptoms": ["fever"],
        }))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("age"));
    }

    #[tokio::test]
    async fn test_diagnose_rejects_unknown_severity() {
        let (status, _) = post_diagnose(json!({
            "name": "Lee",
            "age": 40,
            "gender": "male",
            "symptoms": ["fever"],
            "severity": "apocalyptic",
        }))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_diagnose_missing_name_is_json_bad_request() {
        let (status, body) = post_diagnose(json!({
            "age": 30,
            "gender": "f",
            "symptoms": ["fever"],
        }))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("name"));
    }

    #[tokio::test]
    async fn test_diagnose_mistyped_fields_are_json_bad_request() {
        for body in [
            json!({ "name": "Lee", "age": "thirty", "symptoms": ["fever"] }),
            json!({ "name": "Lee", "age": 30.5, "symptoms": ["fever"] }),
            json!({ "name": "Lee", "age": 30, "symptoms": "fever" }),
        ] {
            let (status, body) = post_diagnose(body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_diagnose_unparseable_body_is_json_bad_request() {
        let (status, text) = send(test_router(), diagnose_request("{\"name\": ")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&text).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_rate_limit_applies_to_diagnose_only() {
        let catalog = load_catalog().unwrap();
        let state = Arc::new(AppState::new(catalog, IntakeValidator::default()));
        let governor = create_governor_config(&RateLimitConfig {
            per_second: 60,
            burst_size: 1,
        })
        .unwrap();
        let router = create_router(state, Some(governor));
        let peer = ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 8080)));
        let body = json!({ "name": "Lee", "age": 40, "symptoms": ["fever"] }).to_string();

        let mut first = diagnose_request(body.clone());
        first.extensions_mut().insert(peer);
        let (status, _) = send(router.clone(), first).await;
        assert_eq!(status, StatusCode::OK);

        let mut second = diagnose_request(body);
        second.extensions_mut().insert(peer);
        let (status, _) = send(router.clone(), second).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

        for _ in 0..3 {
            let mut rules = Request::builder().uri("/api/v1/rules").body(Body::empty()).unwrap();
            rules.extensions_mut().insert(peer);
            let (status, _) = send(router.clone(), rules).await;
            assert_eq!(status, StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_metrics_render_diagnose_counters() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let _guard = metrics::set_default_local_recorder(&recorder);

        let catalog = load_catalog().unwrap();
        let state = Arc::new(
            AppState::new(catalog, IntakeValidator::default()).with_metrics(recorder.handle()),
        );
        let router = create_router(state, None);

        let accepted = json!({ "name": "Lee", "age": 40, "symptoms": ["fever", "cough", "fatigue"] });
        let (status, _) = send(router.clone(), diagnose_request(accepted.to_string())).await;
        assert_eq!(status, StatusCode::OK);

        let rejected = json!({ "name": "Lee", "age": -1, "symptoms": [] });
        let (status, _) = send(router.clone(), diagnose_request(rejected.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let scrape = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let (status, text) = send(router, scrape).await;
        assert_eq!(status, StatusCode::OK);
        assert!(text.contains("diagnose_requests_total 2"));
        assert!(text.contains("diagnose_rejected_total 1"));
        assert!(text.contains(r#"diagnoses_total{condition="Influenza (Flu)"} 1"#));
    }

    #[tokio::test]
    async fn test_metrics_unavailable_without_recorder() {
        let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let (status, _) = send(test_router(), request).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_rules_listing_in_catalog_order() {
        let (status, body) = get_json("/api/v1/rules").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 7);
        assert_eq!(body["data"][0]["id"], "influenza-check");
        assert_eq!(body["data"][6]["id"], "general-assessment");
        assert_eq!(body["data"][6]["fallback"], true);
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json("/api/v1/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["rule_count"], 7);
    }

    #[test]
    fn test_build_catalog_from_rule_file() {
        let config = ServerConfig {
            rules_path: Some(
                concat!(env!("CARGO_MANIFEST_DIR"), "/../rule-engine/rules/medical_rules.toml").into(),
            ),
            ..Default::default()
        };
        let catalog = build_catalog(&config).unwrap();
        assert_eq!(catalog, load_catalog().unwrap());
    }
}
