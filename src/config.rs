//! Configuration management for CrabRTC
//!
//! Provides configuration loading, saving, and validation for media capture
//! defaults, ICE servers, and audio detection tuning.

use crate::errors::SessionError;
use crate::types::{IceServerEntry, MediaConstraints, VideoConstraints};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrabRtcConfig {
    pub media: MediaConfig,
    pub ice: IceConfig,
    pub detection: DetectionConfig,
}

/// Media capture defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Capture audio by default
    pub audio: bool,
    /// Maximum video width in pixels
    pub video_max_width: u32,
    /// Frame rate bounds [min, ideal, max]
    pub frame_rate: [u32; 3],
}

/// ICE server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceConfig {
    pub servers: Vec<IceServerEntry>,
}

/// Audio activity detection tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Consecutive silence samples before activity is considered absent
    pub silence_threshold: usize,
}

impl Default for CrabRtcConfig {
    fn default() -> Self {
        Self {
            media: MediaConfig {
                audio: true,
                video_max_width: 640,
                frame_rate: [10, 15, 20],
            },
            ice: IceConfig {
                servers: vec![IceServerEntry::url_only(
                    "stun:stun.l.google.com:19302".to_string(),
                )],
            },
            detection: DetectionConfig {
                silence_threshold: 20,
            },
        }
    }
}

impl CrabRtcConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SessionError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            SessionError::SessionCreationError(format!("Failed to read config file: {}", e))
        })?;

        let config: CrabRtcConfig = toml::from_str(&contents).map_err(|e| {
            SessionError::SessionCreationError(format!("Failed to parse config file: {}", e))
        })?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SessionError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SessionError::SessionCreationError(format!(
                    "Failed to create config directory: {}",
                    e
                ))
            })?;
        }

        let toml_string = toml::to_string_pretty(self).map_err(|e| {
            SessionError::SessionCreationError(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, toml_string).map_err(|e| {
            SessionError::SessionCreationError(format!("Failed to write config file: {}", e))
        })?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("crabrtc.toml")
    }

    /// Load from default location or create with defaults
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Media constraints derived from the configured defaults
    pub fn default_constraints(&self) -> MediaConstraints {
        MediaConstraints {
            audio: self.media.audio,
            video: Some(VideoConstraints {
                max_width: self.media.video_max_width,
                min_frame_rate: self.media.frame_rate[0],
                ideal_frame_rate: self.media.frame_rate[1],
                max_frame_rate: self.media.frame_rate[2],
            }),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.media.video_max_width == 0 {
            return Err("Video max width must be non-zero".to_string());
        }
        let [min, ideal, max] = self.media.frame_rate;
        if min == 0 || max > 240 {
            return Err("Frame rate bounds must be within 1-240".to_string());
        }
        if min > ideal || ideal > max {
            return Err("Frame rate bounds must satisfy min <= ideal <= max".to_string());
        }

        for server in &self.ice.servers {
            if server.urls.is_empty() || server.urls.iter().any(|u| u.is_empty()) {
                return Err("ICE server entries must carry at least one url".to_string());
            }
        }

        if self.detection.silence_threshold == 0 {
            return Err("Silence threshold must be at least 1".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CrabRtcConfig::default();
        assert!(config.media.audio);
        assert_eq!(config.media.video_max_width, 640);
        assert_eq!(config.media.frame_rate, [10, 15, 20]);
        assert_eq!(config.detection.silence_threshold, 20);
    }

    #[test]
    fn test_config_validation() {
        let config = CrabRtcConfig::default();
        assert!(config.validate().is_ok());

        let mut bad_width = config.clone();
        bad_width.media.video_max_width = 0;
        assert!(bad_width.validate().is_err());

        let mut bad_rates = CrabRtcConfig::default();
        bad_rates.media.frame_rate = [20, 15, 10];
        assert!(bad_rates.validate().is_err());

        let mut bad_threshold = CrabRtcConfig::default();
        bad_threshold.detection.silence_threshold = 0;
        assert!(bad_threshold.validate().is_err());
    }

    #[test]
    fn test_default_constraints_follow_config() {
        let mut config = CrabRtcConfig::default();
        config.media.audio = false;
        config.media.video_max_width = 1280;

        let constraints = config.default_constraints();
        assert!(!constraints.audio);
        assert_eq!(constraints.video.unwrap().max_width, 1280);
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("test_crabrtc.toml");

        let mut config = CrabRtcConfig::default();
        config.ice.servers = vec![IceServerEntry::from_parameters(
            "turn:turn.example.org:3478".to_string(),
            "user".to_string(),
            "secret".to_string(),
        )];
        assert!(config.save_to_file(&config_path).is_ok());

        let loaded = CrabRtcConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.media.frame_rate, config.media.frame_rate);
        assert_eq!(loaded.ice.servers, config.ice.servers);
    }

    #[test]
    fn test_config_toml_format() {
        let config = CrabRtcConfig::default();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        assert!(toml_string.contains("[media]"));
        assert!(toml_string.contains("[[ice.servers]]"));
        assert!(toml_string.contains("[detection]"));
        assert!(toml_string.contains("video_max_width"));
        assert!(toml_string.contains("silence_threshold"));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = CrabRtcConfig::load_from_file("nonexistent_file.toml");
        assert!(result.is_ok()); // Should return default
        assert_eq!(result.unwrap().media.video_max_width, 640);
    }
}
