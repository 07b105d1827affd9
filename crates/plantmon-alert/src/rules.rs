pub mod rolling;
pub mod threshold;
pub mod zscore;

use crate::AlertRule;

/// The built-in rule set: gas/temperature thresholds, the z-score window
/// detector, and the rolling-average deviation detector.
pub fn default_rules() -> Vec<Box<dyn AlertRule>> {
    vec![
        Box::new(threshold::GasThresholdRule::default()),
        Box::new(threshold::TempThresholdRule::default()),
        Box::new(zscore::ZScoreRule::default()),
        Box::new(rolling::RollingDeviationRule::default()),
    ]
}
