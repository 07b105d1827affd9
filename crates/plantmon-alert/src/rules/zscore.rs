use crate::{AlertRule, RuleContext};
use plantmon_common::types::{AlertEvent, AlertType, Severity};

/// Windows shorter than this yield no verdict (not enough signal for a
/// meaningful standard deviation).
pub const MIN_SAMPLES: usize = 10;
/// How many standard deviations from the window mean count as anomalous.
pub const SIGMA_THRESHOLD: f64 = 3.0;

/// Sliding-window z-score detector, evaluated independently for the
/// temperature and gas windows. The windows already contain the current
/// value (the tracker is updated before rules run), so the deviation is
/// measured against a mean that includes the newest sample.
pub struct ZScoreRule {
    pub min_samples: usize,
    pub sigma: f64,
}

impl Default for ZScoreRule {
    fn default() -> Self {
        Self {
            min_samples: MIN_SAMPLES,
            sigma: SIGMA_THRESHOLD,
        }
    }
}

impl ZScoreRule {
    fn check(&self, window: &[f64], current: f64) -> Option<f64> {
        if window.len() < self.min_samples {
            return None;
        }
        let mean = mean(window);
        let stdev = sample_stdev(window, mean);
        if stdev == 0.0 {
            return None;
        }
        let deviation = (current - mean).abs();
        (deviation > self.sigma * stdev).then_some(mean)
    }
}

impl AlertRule for ZScoreRule {
    fn name(&self) -> &'static str {
        "zscore-anomaly"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<AlertEvent> {
        let mut events = Vec::new();
        if let Some(mean) = self.check(ctx.temp_window, ctx.temperature) {
            events.push(AlertEvent {
                alert_type: AlertType::TempAnomaly,
                severity: Severity::Medium,
                message: format!(
                    "Temperature {:.1} deviates more than {:.0}σ from window mean {mean:.1}",
                    ctx.temperature, self.sigma
                ),
            });
        }
        if let Some(mean) = self.check(ctx.gas_window, ctx.gas_level) {
            events.push(AlertEvent {
                alert_type: AlertType::GasAnomaly,
                severity: Severity::High,
                message: format!(
                    "Gas level {:.1} deviates more than {:.0}σ from window mean {mean:.1}",
                    ctx.gas_level, self.sigma
                ),
            });
        }
        events
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Bessel-corrected (N−1) sample standard deviation.
pub(crate) fn sample_stdev(values: &[f64], mean: f64) -> f64 {
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
