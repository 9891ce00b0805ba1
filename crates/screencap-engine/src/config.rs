//! Recorder configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use screencap_encoder::{PresetKind, DEFAULT_TIMESLICE};
use screencap_ipc::QualityTier;

use crate::error::ConfigError;

/// Recorder settings, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Capture system audio alongside video.
    pub wants_audio: bool,

    /// Chunk delivery cadence in milliseconds (default: 1000).
    pub timeslice_ms: u64,

    /// Preset picked when the UI has no preference (default: "webm-vp9").
    pub default_preset: String,

    /// Quality picked when the UI has no preference.
    pub default_quality: QualityTier,

    /// Prefix of the file name offered by the save prompt (default: "vid").
    pub file_name_prefix: String,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            wants_audio: true,
            timeslice_ms: DEFAULT_TIMESLICE.as_millis() as u64,
            default_preset: PresetKind::WebmVp9.key().to_string(),
            default_quality: QualityTier::Medium,
            file_name_prefix: "vid".to_string(),
        }
    }
}

impl RecorderConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeslice_ms == 0 {
            return Err(ConfigError::Invalid("timeslice_ms must be positive".into()));
        }
        if PresetKind::from_key(&self.default_preset).is_none() {
            return Err(ConfigError::Invalid(format!(
                "unknown default_preset: {}",
                self.default_preset
            )));
        }
        if self.file_name_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("file_name_prefix must not be empty".into()));
        }
        Ok(())
    }

    /// Chunk delivery cadence.
    pub fn timeslice(&self) -> Duration {
        Duration::from_millis(self.timeslice_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RecorderConfig::default();
        assert!(config.wants_audio);
        assert_eq!(config.timeslice(), Duration::from_secs(1));
        assert_eq!(config.default_preset, "webm-vp9");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = RecorderConfig::from_json(r#"{ "wants_audio": false, "default_quality": "High" }"#)
            .unwrap();
        assert!(!config.wants_audio);
        assert_eq!(config.default_quality, QualityTier::High);
        assert_eq!(config.timeslice_ms, 1000);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            RecorderConfig::from_json(r#"{ "timeslice_ms": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RecorderConfig::from_json(r#"{ "default_preset": "avi-xvid" }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RecorderConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recorder.json");
        std::fs::write(&path, r#"{ "file_name_prefix": "capture" }"#).unwrap();

        let config = RecorderConfig::load(&path).unwrap();
        assert_eq!(config.file_name_prefix, "capture");
    }
}
