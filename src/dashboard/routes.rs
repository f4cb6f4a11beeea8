//! Control-surface route handlers.
//!
//! All endpoints return JSON. The worker is shared via `Arc<Hunter>`.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, warn};

use crate::engine::worker::Hunter;
use crate::engine::stats::RECENT_HITS_CAPACITY;
use crate::types::{HitRecord, StatsSnapshot};

pub type AppState = Arc<Hunter>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /api/hunt`. Any JSON value is accepted as `action`;
/// only the strings `"start"` and `"stop"` do anything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HuntRequest {
    #[serde(default)]
    pub action: Option<Value>,
}

impl HuntRequest {
    pub fn action(&self) -> Option<&str> {
        self.action.as_ref().and_then(Value::as_str)
    }

    /// A body without a JSON content type, or an empty one, carries no
    /// action. A JSON body that does not parse is an error.
    pub fn from_body(headers: &HeaderMap, body: &[u8]) -> Result<Self, ApiError> {
        if !is_json(headers) || body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let value: Value =
            serde_json::from_slice(body).map_err(|e| ApiError::Hunt(e.to_string()))?;
        Ok(Self {
            action: value.get("action").cloned(),
        })
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

#[derive(Debug, Clone, Serialize)]
pub struct HuntResponse {
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
    pub timestamp: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid hunt request: {0}")]
    Hunt(String),

    #[error("internal error")]
    Internal,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    checked: Option<u64>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self {
            Self::Hunt(_) => ErrorBody { error: "Hunt error", checked: None },
            Self::Internal => ErrorBody { error: "Internal error", checked: Some(0) },
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Response for a handler that panicked.
pub fn panic_response(_err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    error!("Request handler panicked");
    ApiError::Internal.into_response()
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/stats
pub async fn get_stats(State(hunter): State<AppState>) -> Json<StatsSnapshot> {
    Json(hunter.snapshot())
}

/// POST /api/hunt
pub async fn post_hunt(
    State(hunter): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<HuntResponse>, ApiError> {
    let req = HuntRequest::from_body(&headers, &body).inspect_err(|e| {
        warn!(error = %e, "Rejected hunt request");
    })?;

    match req.action() {
        Some("start") => {
            hunter.start();
        }
        Some("stop") => {
            hunter.stop();
        }
        // accepted without effect
        _ => warn!(action = ?req.action, "Unknown hunt action ignored"),
    }

    Ok(Json(HuntResponse { status: "ok" }))
}

/// GET /api/hits
pub async fn get_hits(State(hunter): State<AppState>) -> Json<Vec<HitRecord>> {
    Json(hunter.recent_hits(RECENT_HITS_CAPACITY))
}

/// GET /
pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "Wallet Hunter live",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
