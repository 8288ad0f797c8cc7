//! Monitor configuration.

use serde::{Deserialize, Serialize};

use crate::error::{AerResult, ValidationError};

/// Settings shared by a registry and the views it produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Timestamp units per second (1000.0 for millisecond timestamps).
    pub time_units_per_second: f64,

    /// Bin width used when a rate summary is requested without one.
    pub default_time_bin: f64,

    /// Fraction of each stacked row used by remapped addresses, `(lo, hi)`.
    pub raster_margins: (f64, f64),
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            time_units_per_second: 1000.0,
            default_time_bin: 30.0,
            raster_margins: (0.05, 0.95),
        }
    }
}

impl MonitorConfig {
    /// Parses a JSON config; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidConfig` if the JSON is malformed or the
    /// resulting config does not validate.
    pub fn from_json_str(json: &str) -> AerResult<Self> {
        let cfg: Self = serde_json::from_str(json).map_err(|e| ValidationError::InvalidConfig {
            reason: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidConfig` naming the offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidConfig {
            reason: reason.to_string(),
        };

        if !(self.time_units_per_second.is_finite() && self.time_units_per_second > 0.0) {
            return Err(invalid("time_units_per_second must be > 0"));
        }
        if !(self.default_time_bin.is_finite() && self.default_time_bin > 0.0) {
            return Err(invalid("default_time_bin must be > 0"));
        }
        let (lo, hi) = self.raster_margins;
        if !((0.0..=1.0).contains(&lo) && (0.0..=1.0).contains(&hi) && lo <= hi) {
            return Err(invalid("raster_margins must satisfy 0 <= lo <= hi <= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_validates() {
        let cfg = MonitorConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.time_units_per_second, 1000.0);
        assert_eq!(cfg.default_time_bin, 30.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let cfg = MonitorConfig::from_json_str(r#"{"default_time_bin": 5.0}"#).unwrap();
        assert_eq!(cfg.default_time_bin, 5.0);
        assert_eq!(cfg.raster_margins, (0.05, 0.95));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = MonitorConfig::from_json_str(r#"{"default_time_bin": 0.0}"#).unwrap_err();
        assert!(err.is_validation());

        let cfg = MonitorConfig {
            raster_margins: (0.9, 0.1),
            ..MonitorConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = MonitorConfig::from_json_str("{not json").unwrap_err();
        assert!(format!("{err}").contains("Invalid configuration"));
    }
}
