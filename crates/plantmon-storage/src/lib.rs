//! SQLite persistence for sensor readings and the alert ledger.
//!
//! The default implementation ([`engine::SqliteStore`]) keeps both tables
//! in a single database file with WAL mode enabled. Readings are
//! append-only; alerts are lifecycle rows that are opened once per active
//! (device, type) pair and flipped to resolved by auto-resolution — never
//! hard-deleted.

pub mod engine;
pub mod error;

#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};
use error::Result;
use plantmon_common::types::{Alert, AlertEvent, AlertStats, AlertType, SensorReading};

/// A reading about to be persisted: a validated submission plus the
/// ingestion timestamp. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewReading {
    pub device_id: String,
    pub temperature: f64,
    pub gas_level: f64,
    pub timestamp: DateTime<Utc>,
}

/// Append-only persistence for raw readings.
///
/// Implementations must be safe to share across threads (`Send + Sync`):
/// the store is hit by the ingestion handler and the read-side endpoints
/// concurrently.
pub trait ReadingStore: Send + Sync {
    /// Persists one reading and returns it with its assigned id.
    fn append(&self, reading: &NewReading) -> Result<SensorReading>;

    /// The most recent readings for a device, newest first. Returns fewer
    /// than `limit` rows when history is short.
    fn recent(&self, device_id: &str, limit: usize) -> Result<Vec<SensorReading>>;

    /// Every stored reading, newest first.
    fn all_readings(&self) -> Result<Vec<SensorReading>>;
}

/// Alert lifecycle storage. Guarantees the active-alert invariant: at most
/// one active row per (device_id, alert_type).
pub trait AlertLedger: Send + Sync {
    /// Opens a new active alert unless one of the same type is already
    /// active for the device, in which case this is a no-op returning
    /// `None`.
    fn open_alert(
        &self,
        device_id: &str,
        event: &AlertEvent,
        now: DateTime<Utc>,
    ) -> Result<Option<Alert>>;

    /// Resolves every active alert for the device whose type is in
    /// `targets`, stamping `resolved_at`. Returns how many rows changed;
    /// resolving an already-resolved or absent alert is a no-op.
    fn resolve_alerts(
        &self,
        device_id: &str,
        targets: &[AlertType],
        now: DateTime<Utc>,
    ) -> Result<usize>;

    /// Active alerts, newest first, optionally filtered by device.
    fn active_alerts(&self, device_id: Option<&str>) -> Result<Vec<Alert>>;

    /// Resolved alerts, newest first, optionally filtered by device.
    fn alert_history(&self, device_id: Option<&str>) -> Result<Vec<Alert>>;

    /// Simple counts over the whole ledger.
    fn alert_stats(&self) -> Result<AlertStats>;
}
