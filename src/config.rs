//! Runtime settings read from `escape-room.toml`.
//!
//! Every field has a default, so a missing file or a partial file is fine. The path can be
//! overridden with the `ESCAPE_ROOM_CONFIG` environment variable.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_ENV_VAR: &str = "ESCAPE_ROOM_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "escape-room.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Degrees of turn per pixel of mouse motion.
    pub mouse_sensitivity: f32,
    /// Walking speed in metres per second.
    pub move_speed: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// Simulation updates per second.
    pub tick_rate: u32,
    /// Most simulation steps run for a single rendered frame.
    pub max_steps_per_frame: u32,
    /// How far away objects can be used, in metres.
    pub reach: f32,
    pub audio_enabled: bool,
    /// Linear volume in `[0, 1]`.
    pub volume: f32,
    /// Level file; the built-in level is used when unset.
    pub level: Option<PathBuf>,
    pub audio_dir: PathBuf,
    pub wall_texture: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_title: "Escape Room".to_string(),
            window_width: 1280,
            window_height: 720,
            mouse_sensitivity: 0.12,
            move_speed: 2.5,
            fov: 75.0,
            tick_rate: 120,
            max_steps_per_frame: 8,
            reach: 2.5,
            audio_enabled: true,
            volume: 0.8,
            level: None,
            audio_dir: PathBuf::from("assets/audio"),
            wall_texture: PathBuf::from("assets/textures/wall.png"),
        }
    }
}

impl GameConfig {
    /// Loads from `ESCAPE_ROOM_CONFIG` or `escape-room.toml`, falling back to defaults when the
    /// file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GameConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::Invalid {
                field: "tick_rate",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_steps_per_frame == 0 {
            return Err(ConfigError::Invalid {
                field: "max_steps_per_frame",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(10.0..=150.0).contains(&self.fov) {
            return Err(ConfigError::Invalid {
                field: "fov",
                reason: format!("{} is outside 10..=150 degrees", self.fov),
            });
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(ConfigError::Invalid {
                field: "volume",
                reason: format!("{} is outside 0..=1", self.volume),
            });
        }
        if self.reach <= 0.0 || self.move_speed < 0.0 {
            return Err(ConfigError::Invalid {
                field: "reach/move_speed",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Seconds per simulation step.
    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: GameConfig = toml::from_str("fov = 90.0\nlevel = \"levels/custom.toml\"").unwrap();
        assert_eq!(config.fov, 90.0);
        assert_eq!(config.level, Some(PathBuf::from("levels/custom.toml")));
        assert_eq!(config.tick_rate, GameConfig::default().tick_rate);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<GameConfig>("fullscreen = true").is_err());
    }

    #[test]
    fn out_of_range_values_fail_validation() {
        let config = GameConfig {
            tick_rate: 0,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "tick_rate", .. })
        ));

        let config = GameConfig {
            volume: 1.5,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = GameConfig::load_from(Path::new("definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn tick_seconds_matches_rate() {
        let config = GameConfig::default();
        assert!((config.tick_seconds() - 1.0 / 120.0).abs() < 1e-9);
    }
}
