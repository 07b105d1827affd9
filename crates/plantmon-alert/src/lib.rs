//! Alerting engine for per-device sensor readings.
//!
//! The engine maintains per-(device, metric) sliding windows and evaluates
//! each incoming reading through the registered [`AlertRule`]
//! implementations. Built-in rule families cover static thresholds,
//! sliding-window z-score anomalies, and rolling-average deviation against
//! recent persisted history. The engine also decides which alert types have
//! recovered and should be auto-resolved by the ledger.

pub mod engine;
pub mod rules;
pub mod window;


use plantmon_common::types::{AlertEvent, SensorReading};

/// Everything a rule may look at for one reading. Windows are snapshots
/// taken *after* the tracker observed the current reading, so both window
/// slices include the newest value; `history` is the most recent persisted
/// rows for the device, newest first, and also includes the current reading
/// (the insert precedes evaluation).
pub struct RuleContext<'a> {
    pub device_id: &'a str,
    pub temperature: f64,
    pub gas_level: f64,
    pub temp_window: &'a [f64],
    pub gas_window: &'a [f64],
    pub history: &'a [SensorReading],
}

/// One independent rule family. Families never short-circuit each other: a
/// reading may produce zero, one, or several events across families.
///
/// Rules are infallible by design — degenerate inputs (short windows, zero
/// variance, zero averages) are no-verdict outcomes, never errors, so one
/// family can never prevent another from evaluating.
pub trait AlertRule: Send + Sync {
    /// Stable name used in logs (e.g. `"gas-threshold"`).
    fn name(&self) -> &'static str;

    /// Evaluates the context and returns any candidate alert events.
    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<AlertEvent>;
}
