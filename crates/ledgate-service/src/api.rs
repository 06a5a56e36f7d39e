//! REST API endpoints for ledgate-service.
//!
//! Every command handler does the same three synchronous steps: validate,
//! encode, submit. None of them waits for the device, so a `200` means the
//! command was queued, not that the light changed.
//!
//! ## Error Handling
//!
//! All endpoints return structured JSON errors via [`AppError`]:
//!
//! | Status | When |
//! |--------|------|
//! | 400 | `set_color` body is not JSON, has no string `color`, or the hex is malformed |
//! | 401 | `Authorization` header missing or wrong (see [`crate::middleware`]) |
//! | 503 | The command queue is full or the session has shut down |
//!
//! # Example
//!
//! ```ignore
//! use ledgate_service::api;
//!
//! let app = api::app(state);
//! ```

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use ledgate_core::{SessionMetricsSnapshot, SessionState, SubmitError};
use ledgate_types::{Color, encode_color, encode_power};
use serde::Serialize;
use time::OffsetDateTime;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::middleware::require_password;
use crate::state::AppState;

/// Create the API router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        // Commands
        .route("/power_on", post(power_on))
        .route("/power_off", post(power_off))
        .route("/set_color", post(set_color))
        // Health and status
        .route("/health", get(health))
        .route("/status", get(get_status))
}

/// Create the full application: routes, authentication and request tracing.
pub fn app(state: Arc<AppState>) -> Router {
    router()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(
                    Arc::clone(&state),
                    require_password,
                )),
        )
        .with_state(state)
}

/// Response to a command.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub status: &'static str,
}

/// Response to a color command.
#[derive(Debug, Serialize)]
pub struct ColorResponse {
    pub status: &'static str,
    /// The color string exactly as the client sent it.
    pub color: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Device session status.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub state: SessionState,
    pub address: String,
    pub metrics: SessionMetricsSnapshot,
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
    })
}

/// Session state and delivery counters.
async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        state: state.session.state(),
        address: state.session.address().to_string(),
        metrics: state.session.metrics(),
    })
}

async fn power_on(State(state): State<Arc<AppState>>) -> Result<Json<CommandResponse>, AppError> {
    state.session.submit(encode_power(true))?;
    info!("Power on dispatched");
    Ok(Json(CommandResponse {
        status: "Lights turned on",
    }))
}

async fn power_off(State(state): State<Arc<AppState>>) -> Result<Json<CommandResponse>, AppError> {
    state.session.submit(encode_power(false))?;
    info!("Power off dispatched");
    Ok(Json(CommandResponse {
        status: "Lights turned off",
    }))
}

/// Set the light color.
///
/// The body is parsed by hand so that every malformed request gets the same
/// JSON 400 rather than axum's plain-text extractor rejections.
async fn set_color(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ColorResponse>, AppError> {
    let hex = color_field(&body)?;
    let color = Color::from_hex(&hex).map_err(|e| {
        debug!(color = %hex, "Rejected color");
        AppError::BadRequest(e.to_string())
    })?;

    state.session.submit(encode_color(color))?;
    info!(color = %color, "Color dispatched");

    Ok(Json(ColorResponse {
        status: "Color set",
        color: hex,
    }))
}

/// Extract the `color` string from a JSON body.
fn color_field(body: &[u8]) -> Result<String, AppError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))?;

    match value.get("color") {
        Some(serde_json::Value::String(hex)) => Ok(hex.clone()),
        Some(_) => Err(AppError::BadRequest(
            "Field 'color' must be a string".to_string(),
        )),
        None => Err(AppError::BadRequest("Missing field 'color'".to_string())),
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    Unauthorized,
    BadRequest(String),
    Unavailable(String),
}

impl From<SubmitError> for AppError {
    fn from(e: SubmitError) -> Self {
        warn!(error = %e, "Command not accepted by device session");
        AppError::Unavailable(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, Json(body)).into_response()
    }
}
