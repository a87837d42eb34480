//! Scoring configuration

use crate::error::FatigueError;
use serde::{Deserialize, Serialize};

/// Default number of standard deviations that saturates a factor's risk
pub const DEFAULT_Z_THRESHOLD: f64 = 2.5;

/// Tunable options for the scoring engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Z-score at which a factor's risk reaches 1.0
    pub z_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            z_threshold: DEFAULT_Z_THRESHOLD,
        }
    }
}

impl ScoringConfig {
    pub fn with_z_threshold(z_threshold: f64) -> Self {
        Self { z_threshold }
    }

    /// Reject thresholds that would make risk normalization meaningless
    pub fn validate(&self) -> Result<(), FatigueError> {
        if !self.z_threshold.is_finite() || self.z_threshold <= 0.0 {
            return Err(FatigueError::InvalidConfig(format!(
                "z_threshold must be a positive finite number, got {}",
                self.z_threshold
            )));
        }
        Ok(())
    }

    /// Load and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, FatigueError> {
        let config: ScoringConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_threshold() {
        assert_eq!(ScoringConfig::default().z_threshold, 2.5);
        assert!(ScoringConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = ScoringConfig::from_json("{}").unwrap();
        assert_eq!(config, ScoringConfig::default());

        let config = ScoringConfig::from_json(r#"{"z_threshold": 3.0}"#).unwrap();
        assert_eq!(config.z_threshold, 3.0);
    }

    #[test]
    fn test_rejects_invalid_threshold() {
        assert!(matches!(
            ScoringConfig::from_json(r#"{"z_threshold": 0.0}"#),
            Err(FatigueError::InvalidConfig(_))
        ));
        assert!(ScoringConfig::with_z_threshold(-1.0).validate().is_err());
        assert!(ScoringConfig::with_z_threshold(f64::NAN).validate().is_err());
        assert!(matches!(
            ScoringConfig::from_json("not json"),
            Err(FatigueError::JsonError(_))
        ));
    }
}
