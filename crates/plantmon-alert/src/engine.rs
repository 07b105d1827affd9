use crate::rules::{self, threshold};
use crate::window::{Metric, WindowTracker, WINDOW_CAPACITY};
use crate::{AlertRule, RuleContext};
use plantmon_common::types::{AlertEvent, AlertType, SensorReading};

/// What one reading produced: candidate alert events from every rule
/// family, plus the alert types the reading's nominal values recover.
pub struct Evaluation {
    pub events: Vec<AlertEvent>,
    pub resolve: Vec<AlertType>,
}

/// The alerting core. Owns the per-device windows and the registered rule
/// set; callers feed it each reading in arrival order together with the
/// recent persisted history for that device.
///
/// Sequencing contract: the tracker observes the reading *before* any rule
/// runs, so window snapshots include the current value; the caller must
/// likewise persist the reading before querying the history it passes in.
/// Callers must serialize `evaluate` calls for the same device — window
/// mutation and ledger application form a non-atomic read-modify-write.
pub struct AlertEngine {
    rules: Vec<Box<dyn AlertRule>>,
    windows: WindowTracker,
}

impl AlertEngine {
    pub fn new() -> Self {
        Self::with_rules(rules::default_rules())
    }

    pub fn with_rules(rules: Vec<Box<dyn AlertRule>>) -> Self {
        Self {
            rules,
            windows: WindowTracker::new(WINDOW_CAPACITY),
        }
    }

    /// Runs every rule family against the reading. `history` is the most
    /// recent persisted readings for the device, newest first, including
    /// the current one.
    pub fn evaluate(&mut self, reading: &SensorReading, history: &[SensorReading]) -> Evaluation {
        self.windows
            .observe(&reading.device_id, Metric::Temperature, reading.temperature);
        self.windows
            .observe(&reading.device_id, Metric::Gas, reading.gas_level);

        let temp_window = self.windows.snapshot(&reading.device_id, Metric::Temperature);
        let gas_window = self.windows.snapshot(&reading.device_id, Metric::Gas);

        let ctx = RuleContext {
            device_id: &reading.device_id,
            temperature: reading.temperature,
            gas_level: reading.gas_level,
            temp_window: &temp_window,
            gas_window: &gas_window,
            history,
        };

        let mut events = Vec::new();
        for rule in &self.rules {
            events.extend(rule.evaluate(&ctx));
        }

        Evaluation {
            events,
            resolve: recovery_targets(reading.temperature, reading.gas_level),
        }
    }

    /// Drops all window state, as if the process had restarted. The first
    /// readings after a reset produce no z-score verdicts until the
    /// windows refill.
    pub fn reset(&mut self) {
        self.windows.reset();
    }
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Alert types this reading's values recover. Evaluated on every
/// ingestion, independent of which rules fired: a nominal gas level clears
/// all gas-family alerts, a nominal temperature clears all
/// temperature-family alerts.
pub fn recovery_targets(temperature: f64, gas_level: f64) -> Vec<AlertType> {
    let mut targets = Vec::new();
    if gas_level <= threshold::GAS_ELEVATED_PPM {
        targets.extend([
            AlertType::HighGas,
            AlertType::GasAnomaly,
            AlertType::GasRollingAnomaly,
        ]);
    }
    if (threshold::TEMP_FREEZING_C..=threshold::TEMP_ELEVATED_C).contains(&temperature) {
        targets.extend([
            AlertType::HighTemp,
            AlertType::LowTemp,
            AlertType::TempAnomaly,
            AlertType::TempRollingAnomaly,
        ]);
    }
    targets
}
