//! Provider configuration.

use crate::error::Result;
use crate::hardware::{AcquisitionParams, PositionMode, Recurrence};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Provider configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Maximum age of the last fix for a query to be answered immediately.
    /// Default: 1000
    pub max_location_age_ms: u64,

    /// Grace period with no demand before the service exits.
    /// Default: 30000
    pub quit_idle_time_ms: u64,

    /// Minimum interval between fixes requested from the hardware.
    pub minimum_interval_ms: u32,

    /// Preferred accuracy in metres.
    pub preferred_accuracy_m: u32,

    /// Preferred time to first fix (0 = no preference).
    pub preferred_initial_fix_ms: u32,

    pub position_mode: PositionMode,

    pub recurrence: Recurrence,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            max_location_age_ms: 1000,
            quit_idle_time_ms: 30_000,
            minimum_interval_ms: 1000,
            preferred_accuracy_m: 1,
            preferred_initial_fix_ms: 0,
            position_mode: PositionMode::Standalone,
            recurrence: Recurrence::Periodic,
        }
    }
}

impl ProviderConfig {
    /// Parse a JSON configuration. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Acquisition parameters handed to the hardware before each start.
    pub fn acquisition_params(&self) -> AcquisitionParams {
        AcquisitionParams {
            mode: self.position_mode,
            recurrence: self.recurrence,
            min_interval_ms: self.minimum_interval_ms,
            preferred_accuracy_m: self.preferred_accuracy_m,
            preferred_initial_fix_ms: self.preferred_initial_fix_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = ProviderConfig::default();
        assert_eq!(config.max_location_age_ms, 1000);
        assert_eq!(config.quit_idle_time_ms, 30_000);

        let params = config.acquisition_params();
        assert_eq!(params.mode, PositionMode::Standalone);
        assert_eq!(params.recurrence, Recurrence::Periodic);
        assert_eq!(params.min_interval_ms, 1000);
        assert_eq!(params.preferred_accuracy_m, 1);
        assert_eq!(params.preferred_initial_fix_ms, 0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            ProviderConfig::from_json_str(r#"{"quit_idle_time_ms": 5000, "position_mode": "ms_based"}"#)
                .unwrap();
        assert_eq!(config.quit_idle_time_ms, 5000);
        assert_eq!(config.position_mode, PositionMode::MsBased);
        assert_eq!(config.max_location_age_ms, 1000);
    }

    #[test]
    fn test_invalid_json() {
        let result = ProviderConfig::from_json_str("{not json");
        assert!(matches!(result, Err(ProviderError::Config(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_location_age_ms": 250}}"#).unwrap();

        let config = ProviderConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.max_location_age_ms, 250);
    }

    #[test]
    fn test_missing_file() {
        let result = ProviderConfig::from_json_file("/nonexistent/provider.json");
        assert!(matches!(result, Err(ProviderError::Io(_))));
    }
}
