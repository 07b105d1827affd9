use crate::api::{error_response, success_response};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use plantmon_storage::AlertLedger;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct DeviceFilter {
    pub device_id: Option<String>,
}

/// `GET /alerts` — currently active alerts, optionally for one device.
pub async fn list_active(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(filter): Query<DeviceFilter>,
) -> Response {
    match state.store.active_alerts(filter.device_id.as_deref()) {
        Ok(alerts) => success_response(StatusCode::OK, &trace_id, alerts),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list active alerts");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// `GET /alerts/history` — resolved alerts, optionally for one device.
pub async fn list_history(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(filter): Query<DeviceFilter>,
) -> Response {
    match state.store.alert_history(filter.device_id.as_deref()) {
        Ok(alerts) => success_response(StatusCode::OK, &trace_id, alerts),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list alert history");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// `GET /alerts/stats` — ledger-wide counts.
pub async fn alert_stats(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> Response {
    match state.store.alert_stats() {
        Ok(stats) => success_response(StatusCode::OK, &trace_id, stats),
        Err(e) => {
            tracing::error!(error = %e, "Failed to compute alert stats");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}
