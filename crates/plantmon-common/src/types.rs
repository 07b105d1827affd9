use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum accepted `device_id` length.
pub const DEVICE_ID_MIN_LEN: usize = 3;
/// Maximum accepted `device_id` length.
pub const DEVICE_ID_MAX_LEN: usize = 50;
/// Accepted temperature range in °C.
pub const TEMPERATURE_RANGE: (f64, f64) = (-40.0, 150.0);
/// Accepted gas concentration range in ppm.
pub const GAS_LEVEL_RANGE: (f64, f64) = (0.0, 1000.0);

/// A persisted sensor reading. Immutable once stored; the id is assigned
/// by the reading store on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorReading {
    pub id: i64,
    pub device_id: String,
    pub temperature: f64,
    pub gas_level: f64,
    pub timestamp: DateTime<Utc>,
}

/// An incoming reading as submitted by a device, before validation and
/// before the store assigns an id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingSubmission {
    pub device_id: String,
    pub temperature: f64,
    pub gas_level: f64,
}

impl ReadingSubmission {
    /// Checks the declared input bounds. Rejection happens before any
    /// engine logic runs; no state is mutated for an invalid submission.
    ///
    /// # Examples
    ///
    /// ```
    /// use plantmon_common::types::ReadingSubmission;
    ///
    /// let ok = ReadingSubmission {
    ///     device_id: "TEMP_SENSOR_01".into(),
    ///     temperature: 25.0,
    ///     gas_level: 120.0,
    /// };
    /// assert!(ok.validate().is_ok());
    ///
    /// let bad = ReadingSubmission { gas_level: 2000.0, ..ok };
    /// assert!(bad.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ValidationError> {
        let len = self.device_id.chars().count();
        if len < DEVICE_ID_MIN_LEN || len > DEVICE_ID_MAX_LEN {
            return Err(ValidationError::DeviceIdLength { len });
        }
        let (t_min, t_max) = TEMPERATURE_RANGE;
        if !self.temperature.is_finite() || self.temperature < t_min || self.temperature > t_max {
            return Err(ValidationError::TemperatureOutOfRange {
                value: self.temperature,
            });
        }
        let (g_min, g_max) = GAS_LEVEL_RANGE;
        if !self.gas_level.is_finite() || self.gas_level < g_min || self.gas_level > g_max {
            return Err(ValidationError::GasLevelOutOfRange {
                value: self.gas_level,
            });
        }
        Ok(())
    }
}

/// Input rejected before reaching the alerting engine.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("device_id must be 3-50 characters, got {len}")]
    DeviceIdLength { len: usize },

    #[error("temperature {value} outside accepted range [-40, 150]")]
    TemperatureOutOfRange { value: f64 },

    #[error("gas_level {value} outside accepted range [0, 1000]")]
    GasLevelOutOfRange { value: f64 },
}

/// Alert classification, ordered from lowest to highest urgency.
///
/// # Examples
///
/// ```
/// use plantmon_common::types::Severity;
///
/// let sev: Severity = "HIGH".parse().unwrap();
/// assert_eq!(sev, Severity::High);
/// assert_eq!(sev.to_string(), "HIGH");
/// assert!(Severity::High > Severity::Low);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "LOW"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::High => write!(f, "HIGH"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LOW" => Ok(Severity::Low),
            "MEDIUM" => Ok(Severity::Medium),
            "HIGH" => Ok(Severity::High),
            _ => Err(format!("unknown severity: {s}")),
        }
    }
}

/// The kind of safety condition an alert reports. At most one *active*
/// alert per (device, type) exists at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    HighGas,
    HighTemp,
    LowTemp,
    TempAnomaly,
    GasAnomaly,
    TempRollingAnomaly,
    GasRollingAnomaly,
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AlertType::HighGas => "HIGH_GAS",
            AlertType::HighTemp => "HIGH_TEMP",
            AlertType::LowTemp => "LOW_TEMP",
            AlertType::TempAnomaly => "TEMP_ANOMALY",
            AlertType::GasAnomaly => "GAS_ANOMALY",
            AlertType::TempRollingAnomaly => "TEMP_ROLLING_ANOMALY",
            AlertType::GasRollingAnomaly => "GAS_ROLLING_ANOMALY",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for AlertType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HIGH_GAS" => Ok(AlertType::HighGas),
            "HIGH_TEMP" => Ok(AlertType::HighTemp),
            "LOW_TEMP" => Ok(AlertType::LowTemp),
            "TEMP_ANOMALY" => Ok(AlertType::TempAnomaly),
            "GAS_ANOMALY" => Ok(AlertType::GasAnomaly),
            "TEMP_ROLLING_ANOMALY" => Ok(AlertType::TempRollingAnomaly),
            "GAS_ROLLING_ANOMALY" => Ok(AlertType::GasRollingAnomaly),
            _ => Err(format!("unknown alert type: {s}")),
        }
    }
}

/// A candidate alert produced by the rule evaluator. The ledger decides
/// whether it becomes a row (dedup against already-active alerts).
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub alert_type: AlertType,
    pub severity: Severity,
    pub message: String,
}

/// A persisted alert lifecycle record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub device_id: String,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub message: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Aggregate alert counts over the whole ledger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AlertStats {
    pub total_alerts: u64,
    pub active_alerts: u64,
    pub resolved_alerts: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(device_id: &str, temperature: f64, gas_level: f64) -> ReadingSubmission {
        ReadingSubmission {
            device_id: device_id.to_string(),
            temperature,
            gas_level,
        }
    }

    #[test]
    fn validate_accepts_in_range_submission() {
        assert!(submission("GAS_SENSOR_01", 25.0, 120.0).validate().is_ok());
        // Boundary values are accepted
        assert!(submission("abc", -40.0, 0.0).validate().is_ok());
        assert!(submission("abc", 150.0, 1000.0).validate().is_ok());
    }

    #[test]
    fn validate_rejects_short_and_long_device_ids() {
        assert!(matches!(
            submission("ab", 25.0, 120.0).validate(),
            Err(ValidationError::DeviceIdLength { len: 2 })
        ));
        let long = "x".repeat(51);
        assert!(submission(&long, 25.0, 120.0).validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        assert!(matches!(
            submission("dev-1", -41.0, 120.0).validate(),
            Err(ValidationError::TemperatureOutOfRange { .. })
        ));
        assert!(matches!(
            submission("dev-1", 25.0, 1000.5).validate(),
            Err(ValidationError::GasLevelOutOfRange { .. })
        ));
        assert!(submission("dev-1", f64::NAN, 120.0).validate().is_err());
    }

    #[test]
    fn alert_type_round_trips_through_str() {
        for t in [
            AlertType::HighGas,
            AlertType::HighTemp,
            AlertType::LowTemp,
            AlertType::TempAnomaly,
            AlertType::GasAnomaly,
            AlertType::TempRollingAnomaly,
            AlertType::GasRollingAnomaly,
        ] {
            let parsed: AlertType = t.to_string().parse().unwrap();
            assert_eq!(parsed, t);
        }
    }

    #[test]
    fn severity_serializes_uppercase() {
        let json = serde_json::to_string(&Severity::Medium).unwrap();
        assert_eq!(json, "\"MEDIUM\"");
    }
}
