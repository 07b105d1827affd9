use crate::{AlertRule, RuleContext};
use plantmon_common::types::{AlertEvent, AlertType, Severity};

/// Gas concentration above this opens a HIGH severity alert.
pub const GAS_CRITICAL_PPM: f64 = 600.0;
/// Gas concentration above this (but at or below critical) opens a MEDIUM
/// severity alert; at or below it, gas alerts auto-resolve.
pub const GAS_ELEVATED_PPM: f64 = 300.0;

/// Temperature above this opens a HIGH severity alert.
pub const TEMP_CRITICAL_C: f64 = 80.0;
/// Temperature above this (but at or below critical) opens a MEDIUM
/// severity alert; the nominal band tops out here.
pub const TEMP_ELEVATED_C: f64 = 60.0;
/// Temperature below this opens a LOW severity alert; the nominal band
/// bottoms out here.
pub const TEMP_FREEZING_C: f64 = 0.0;

pub struct GasThresholdRule {
    pub critical: f64,
    pub elevated: f64,
}

impl Default for GasThresholdRule {
    fn default() -> Self {
        Self {
            critical: GAS_CRITICAL_PPM,
            elevated: GAS_ELEVATED_PPM,
        }
    }
}

impl AlertRule for GasThresholdRule {
    fn name(&self) -> &'static str {
        "gas-threshold"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<AlertEvent> {
        let gas = ctx.gas_level;
        if gas > self.critical {
            vec![AlertEvent {
                alert_type: AlertType::HighGas,
                severity: Severity::High,
                message: format!(
                    "Gas level {gas:.1} ppm exceeds critical limit {:.0} ppm",
                    self.critical
                ),
            }]
        } else if gas > self.elevated {
            vec![AlertEvent {
                alert_type: AlertType::HighGas,
                severity: Severity::Medium,
                message: format!(
                    "Gas level {gas:.1} ppm exceeds safe limit {:.0} ppm",
                    self.elevated
                ),
            }]
        } else {
            Vec::new()
        }
    }
}

/// At most one temperature-threshold event per reading: the three bands
/// are mutually exclusive.
pub struct TempThresholdRule {
    pub critical: f64,
    pub elevated: f64,
    pub freezing: f64,
}

impl Default for TempThresholdRule {
    fn default() -> Self {
        Self {
            critical: TEMP_CRITICAL_C,
            elevated: TEMP_ELEVATED_C,
            freezing: TEMP_FREEZING_C,
        }
    }
}

impl AlertRule for TempThresholdRule {
    fn name(&self) -> &'static str {
        "temp-threshold"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<AlertEvent> {
        let temp = ctx.temperature;
        if temp > self.critical {
            vec![AlertEvent {
                alert_type: AlertType::HighTemp,
                severity: Severity::High,
                message: format!(
                    "Temperature {temp:.1}°C exceeds critical limit {:.0}°C",
                    self.critical
                ),
            }]
        } else if temp > self.elevated {
            vec![AlertEvent {
                alert_type: AlertType::HighTemp,
                severity: Severity::Medium,
                message: format!(
                    "Temperature {temp:.1}°C exceeds safe limit {:.0}°C",
                    self.elevated
                ),
            }]
        } else if temp < self.freezing {
            vec![AlertEvent {
                alert_type: AlertType::LowTemp,
                severity: Severity::Low,
                message: format!("Temperature {temp:.1}°C below freezing"),
            }]
        } else {
            Vec::new()
        }
    }
}
