use crate::{AlertRule, RuleContext};
use plantmon_common::types::{AlertEvent, AlertType, Severity};

/// How many recent persisted readings the deviation is computed over.
pub const LOOKBACK_ROWS: usize = 10;
/// Fewer historical rows than this and the rule stays silent.
pub const MIN_ROWS: usize = 5;
/// Temperature deviation (percent of the rolling average) that fires.
pub const TEMP_DEVIATION_PCT: f64 = 25.0;
/// Gas deviation (percent of the rolling average) that fires.
pub const GAS_DEVIATION_PCT: f64 = 30.0;

/// Rolling-average deviation detector over persisted history. The history
/// slice is newest-first and includes the reading that was just inserted;
/// the rule caps it at `lookback` rows.
pub struct RollingDeviationRule {
    pub lookback: usize,
    pub min_rows: usize,
    pub temp_threshold_pct: f64,
    pub gas_threshold_pct: f64,
}

impl Default for RollingDeviationRule {
    fn default() -> Self {
        Self {
            lookback: LOOKBACK_ROWS,
            min_rows: MIN_ROWS,
            temp_threshold_pct: TEMP_DEVIATION_PCT,
            gas_threshold_pct: GAS_DEVIATION_PCT,
        }
    }
}

/// Percentage deviation of `value` from `avg`. A zero average has no
/// meaningful percentage — returns `None` instead of dividing.
fn deviation_pct(value: f64, avg: f64) -> Option<f64> {
    if avg.abs() < f64::EPSILON {
        return None;
    }
    Some((value - avg).abs() / avg * 100.0)
}

impl AlertRule for RollingDeviationRule {
    fn name(&self) -> &'static str {
        "rolling-deviation"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<AlertEvent> {
        let rows = &ctx.history[..ctx.history.len().min(self.lookback)];
        if rows.len() < self.min_rows {
            return Vec::new();
        }

        let n = rows.len() as f64;
        let temp_avg = rows.iter().map(|r| r.temperature).sum::<f64>() / n;
        let gas_avg = rows.iter().map(|r| r.gas_level).sum::<f64>() / n;

        let mut events = Vec::new();
        if let Some(pct) = deviation_pct(ctx.temperature, temp_avg) {
            if pct > self.temp_threshold_pct {
                events.push(AlertEvent {
                    alert_type: AlertType::TempRollingAnomaly,
                    severity: Severity::Medium,
                    message: format!(
                        "Temperature deviates {pct:.1}% from rolling average {temp_avg:.1}"
                    ),
                });
            }
        }
        if let Some(pct) = deviation_pct(ctx.gas_level, gas_avg) {
            if pct > self.gas_threshold_pct {
                events.push(AlertEvent {
                    alert_type: AlertType::GasRollingAnomaly,
                    severity: Severity::High,
                    message: format!(
                        "Gas level deviates {pct:.1}% from rolling average {gas_avg:.1}"
                    ),
                });
            }
        }
        events
    }
}
