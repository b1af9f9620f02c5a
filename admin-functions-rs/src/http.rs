// admin-functions-rs/src/http.rs
//
// HTTP surface for the callable functions
// - POST /{operation} with {"data": ...}
// - GET /health

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use shared_types::{CallRequest, CallResponse, CallableError};

use crate::dispatch::CallableDispatcher;

/// Shared router state
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<CallableDispatcher>,
    pub started_at: Instant,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub service_name: String,
    pub uptime_seconds: u64,
    pub bootstrap: String,
}

pub fn router(dispatcher: Arc<CallableDispatcher>) -> Router {
    let state = AppState {
        dispatcher,
        started_at: Instant::now(),
    };

    Router::new()
        .route("/health", get(health_handler))
        .route("/:operation", post(call_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Extract the bearer credential from the Authorization header
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
}

fn parse_request(body: &Bytes) -> Result<Value, CallableError> {
    if body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice::<CallRequest>(body)
        .map(|request| request.data)
        .map_err(|e| CallableError::invalid_argument(format!("Bad Request: {}", e)))
}

async fn call_handler(
    State(state): State<AppState>,
    Path(operation): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let outcome = match parse_request(&body) {
        Ok(data) => {
            state
                .dispatcher
                .dispatch(&operation, extract_token(&headers), &data)
                .await
        }
        Err(e) => Err(e),
    };

    let status = match &outcome {
        Ok(_) => StatusCode::OK,
        Err(err) => {
            error!(operation = %operation, kind = %err.kind, "Callable failed: {}", err.message);
            StatusCode::from_u16(err.kind.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        }
    };

    (status, Json(CallResponse::from_outcome(outcome))).into_response()
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let functions = state.dispatcher.functions();
    let healthy = functions.store().is_healthy().await;
    info!(healthy, "Health check");

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(HealthResponse {
            healthy,
            service_name: config_rs::get_formatted_service_name(config_rs::ADMIN_FUNCTIONS),
            uptime_seconds: state.started_at.elapsed().as_secs(),
            bootstrap: functions.bootstrap_policy().as_str().to_string(),
        }),
    )
}
