use crate::api::success_response;
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime_secs: i64,
    timestamp: DateTime<Utc>,
    message: String,
}

/// `GET /` — process liveness only.
pub async fn health(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> Response {
    let now = Utc::now();
    success_response(
        StatusCode::OK,
        &trace_id,
        HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: (now - state.start_time).num_seconds(),
            timestamp: now,
            message: "plantmon sensor safety backend is running".to_string(),
        },
    )
}
