use crate::state::AppState;
use chrono::Utc;
use plantmon_alert::rules::rolling::LOOKBACK_ROWS;
use plantmon_common::types::{Alert, ReadingSubmission, SensorReading, ValidationError};
use plantmon_storage::error::StorageError;
use plantmon_storage::{AlertLedger, NewReading, ReadingStore};

/// Why an ingestion was rejected. Validation failures happen before any
/// state is touched; storage failures abort before rule evaluation.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// What one accepted reading did to the ledger.
pub struct IngestOutcome {
    pub reading: SensorReading,
    pub opened: Vec<Alert>,
    pub resolved: usize,
}

/// Runs one submission through the full pipeline:
/// validate → persist reading → update windows and evaluate rules →
/// apply alert opens and auto-resolution.
///
/// The engine guard is held from before the reading insert until the last
/// ledger write, so concurrent submissions cannot interleave window
/// updates with the ledger's dedup checks. Everything under the guard is
/// synchronous; no await point is crossed while it is held.
///
/// A reading-insert failure aborts the whole ingestion. After a
/// successful insert, ledger failures are logged and skipped so the
/// persisted reading is never lost to alert bookkeeping.
pub fn process_reading(
    state: &AppState,
    submission: &ReadingSubmission,
) -> Result<IngestOutcome, IngestError> {
    submission.validate()?;

    let mut engine = state
        .engine
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    let now = Utc::now();
    let reading = state.store.append(&NewReading {
        device_id: submission.device_id.clone(),
        temperature: submission.temperature,
        gas_level: submission.gas_level,
        timestamp: now,
    })?;

    // The insert above precedes this query, so the rolling average sees
    // the current reading — matching the z-score windows, which include it
    // as well.
    let history = match state.store.recent(&reading.device_id, LOOKBACK_ROWS) {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(
                device_id = %reading.device_id,
                error = %e,
                "History query failed; rolling rules skip this cycle"
            );
            Vec::new()
        }
    };

    let evaluation = engine.evaluate(&reading, &history);

    let mut opened = Vec::new();
    for event in &evaluation.events {
        match state.store.open_alert(&reading.device_id, event, now) {
            Ok(Some(alert)) => {
                tracing::info!(
                    device_id = %reading.device_id,
                    alert_type = %alert.alert_type,
                    severity = %alert.severity,
                    "Alert opened"
                );
                opened.push(alert);
            }
            Ok(None) => {
                tracing::debug!(
                    device_id = %reading.device_id,
                    alert_type = %event.alert_type,
                    "Alert already active, skipped"
                );
            }
            Err(e) => {
                tracing::error!(
                    device_id = %reading.device_id,
                    alert_type = %event.alert_type,
                    error = %e,
                    "Failed to persist alert"
                );
            }
        }
    }

    let resolved = match state
        .store
        .resolve_alerts(&reading.device_id, &evaluation.resolve, now)
    {
        Ok(count) => {
            if count > 0 {
                tracing::info!(
                    device_id = %reading.device_id,
                    count,
                    "Alerts auto-resolved"
                );
            }
            count
        }
        Err(e) => {
            tracing::error!(
                device_id = %reading.device_id,
                error = %e,
                "Failed to auto-resolve alerts"
            );
            0
        }
    };

    Ok(IngestOutcome {
        reading,
        opened,
        resolved,
    })
}
