use crate::api::{error_response, success_response};
use crate::ingest::{self, IngestError};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use plantmon_common::types::{Alert, ReadingSubmission, SensorReading};
use plantmon_storage::ReadingStore;
use serde::Serialize;

/// Ingestion result returned to the submitting device.
#[derive(Serialize)]
pub struct IngestResponse {
    pub reading: SensorReading,
    pub alerts_opened: Vec<Alert>,
    pub alerts_resolved: usize,
}

/// `POST /sensor-data` — ingest one reading. Out-of-range input is
/// rejected with 422 before anything is persisted.
pub async fn ingest_reading(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Json(submission): Json<ReadingSubmission>,
) -> Response {
    match ingest::process_reading(&state, &submission) {
        Ok(outcome) => success_response(
            StatusCode::OK,
            &trace_id,
            IngestResponse {
                reading: outcome.reading,
                alerts_opened: outcome.opened,
                alerts_resolved: outcome.resolved,
            },
        ),
        Err(IngestError::Validation(e)) => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            &trace_id,
            "validation_error",
            &e.to_string(),
        ),
        Err(IngestError::Storage(e)) => {
            tracing::error!(error = %e, "Failed to persist reading");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// `GET /all-data` — every stored reading, newest first.
pub async fn list_readings(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> Response {
    match state.store.all_readings() {
        Ok(readings) => success_response(StatusCode::OK, &trace_id, readings),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list readings");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}
