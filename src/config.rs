// src/config.rs
use crate::error::{CoachError, Result};
use crate::landmarks::KeypointLayout;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachConfig {
    /// Consecutive frames a new phase must hold before the rep tracker accepts it.
    #[serde(default = "default_min_stable_frames")]
    pub min_stable_frames: u32,
    #[serde(default)]
    pub keypoint_layout: KeypointLayout,
    #[serde(default)]
    pub pump: PumpConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpConfig {
    /// Detections buffered between the detector task and the analysis loop.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_min_stable_frames() -> u32 {
    1
}

fn default_channel_capacity() -> usize {
    4
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            min_stable_frames: default_min_stable_frames(),
            keypoint_layout: KeypointLayout::default(),
            pump: PumpConfig::default(),
        }
    }
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl CoachConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: CoachConfig = serde_json::from_str(&content)?;
        config.validate()?;
        debug!(path = %path.as_ref().display(), ?config, "loaded config");
        Ok(config)
    }

    /// Explicit path, else the platform config file if present, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => {
                info!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "form_coach").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    fn validate(&self) -> Result<()> {
        if self.min_stable_frames == 0 {
            return Err(CoachError::Config("min_stable_frames must be at least 1".into()));
        }
        if self.pump.channel_capacity == 0 {
            return Err(CoachError::Config("pump.channel_capacity must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("form_coach_{}_{name}", uuid::Uuid::new_v4()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let config: CoachConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CoachConfig::default());
        assert_eq!(config.min_stable_frames, 1);
        assert_eq!(config.pump.channel_capacity, 4);
        assert_eq!(config.keypoint_layout, KeypointLayout::Coco17);
    }

    #[test]
    fn test_load_partial_file() {
        let path = write_temp(
            "partial.json",
            r#"{ "min_stable_frames": 3, "keypoint_layout": "media_pipe33" }"#,
        );
        let config = CoachConfig::load(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.min_stable_frames, 3);
        assert_eq!(config.keypoint_layout, KeypointLayout::MediaPipe33);
        assert_eq!(config.pump, PumpConfig::default());
    }

    #[test]
    fn test_zero_stability_is_rejected() {
        let path = write_temp("zero.json", r#"{ "min_stable_frames": 0 }"#);
        let result = CoachConfig::load(&path);
        fs::remove_file(&path).ok();

        assert!(matches!(result, Err(CoachError::Config(_))));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let path = std::env::temp_dir().join("form_coach_does_not_exist.json");
        assert!(matches!(
            CoachConfig::load_or_default(Some(&path)),
            Err(CoachError::Io(_))
        ));
    }
}
