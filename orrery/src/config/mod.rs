//! Runtime configuration persisted as RON
//!
//! Every section uses `#[serde(default)]`, so a config file only needs the
//! values it changes and unknown keys are ignored.

mod cli;
mod error;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::controller::CameraTuning;
use crate::scene::SceneSettings;

pub use cli::CliArgs;
pub use error::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OrreryConfig {
    pub window: WindowConfig,
    pub simulation: SimulationConfig,
    pub camera: CameraTuning,
    pub scene: SceneSettings,
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Orrery - Interactive Solar System".to_string(),
            width: 1280,
            height: 800,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Multiplier on frame time fed to the orbits.
    pub time_scale: f32,
    pub max_time_scale: f32,
    pub start_paused: bool,
    /// Mouse drag sensitivity, radians per pixel.
    pub orbit_sensitivity: f32,
    /// Fraction of the current distance moved per scroll line.
    pub zoom_sensitivity: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            max_time_scale: 50.0,
            start_paused: false,
            orbit_sensitivity: 0.005,
            zoom_sensitivity: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Default `env_logger` filter, used when `RUST_LOG` is unset.
    pub log_level: String,
    pub show_fps: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info,wgpu_core=warn,wgpu_hal=warn,naga=warn".to_string(),
            show_fps: true,
        }
    }
}

impl OrreryConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = ron::from_str(&contents).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate(path)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject values that parse but cannot be used: an empty asteroid belt
    /// range, or camera easing that never arrives.
    pub fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let camera = &self.camera;
        let scene = &self.scene;
        // Comparisons are written so NaN fails them.
        let checks = [
            (
                camera.smoothing > 0.0 && camera.smoothing <= 1.0,
                "camera.smoothing must be in (0, 1]",
            ),
            (camera.arrival_epsilon > 0.0, "camera.arrival_epsilon must be positive"),
            (camera.release_margin >= 0.0, "camera.release_margin must not be negative"),
            (scene.belt_inner >= 0.0, "scene.belt_inner must not be negative"),
            (
                scene.belt_inner <= scene.belt_outer,
                "scene.belt_inner must not exceed scene.belt_outer",
            ),
            (scene.belt_thickness >= 0.0, "scene.belt_thickness must not be negative"),
        ];

        match checks.iter().find(|(ok, _)| !ok) {
            Some((_, reason)) => Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                reason: (*reason).to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Load from `path`, falling back to defaults on any error. The returned
    /// message is shown to the user.
    pub fn load_or_default(path: &Path) -> (Self, Option<String>) {
        match Self::load(path) {
            Ok(config) => (config, None),
            Err(err) => {
                log::warn!("{err}; falling back to defaults");
                let notice = format!(
                    "{err}\n\nThe default settings are in use. Check the file for typos \
                     or run with --write-default-config to regenerate it."
                );
                (Self::default(), Some(notice))
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::WriteError {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(path, serialized).map_err(|source| ConfigError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = OrreryConfig::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("smoothing: 0.05"));
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config: OrreryConfig = ron::from_str("(window: (width: 640))").unwrap();
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 800);
        assert_eq!(config.camera, CameraTuning::default());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let result: Result<OrreryConfig, _> = ron::from_str("(warp_drive: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("orrery.ron");
        let mut config = OrreryConfig::default();
        config.camera.release_margin = 25.0;
        config.scene.show_orbits = false;

        config.save(&path).unwrap();
        let loaded = OrreryConfig::load(&path).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (config, notice) = OrreryConfig::load_or_default(&dir.path().join("absent.ron"));
        assert_eq!(config, OrreryConfig::default());
        assert!(notice.is_none());
    }

    #[test]
    fn invalid_file_falls_back_with_notice() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orrery.ron");
        std::fs::write(&path, "{{not valid}}").unwrap();

        assert!(matches!(
            OrreryConfig::load(&path),
            Err(ConfigError::ParseError { .. })
        ));

        let (config, notice) = OrreryConfig::load_or_default(&path);
        assert_eq!(config, OrreryConfig::default());
        assert!(notice.unwrap().contains("orrery.ron"));
    }

    fn rejection(config: &OrreryConfig) -> String {
        match config.validate(Path::new("orrery.ron")) {
            Err(ConfigError::Invalid { reason, .. }) => reason,
            other => panic!("expected a rejection, got {other:?}"),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(OrreryConfig::default()
            .validate(Path::new("orrery.ron"))
            .is_ok());
    }

    #[test]
    fn inverted_belt_is_rejected() {
        let mut config = OrreryConfig::default();
        config.scene.belt_inner = 90.0;
        config.scene.belt_outer = 70.0;
        assert!(rejection(&config).contains("belt_inner"));
    }

    #[test]
    fn negative_belt_thickness_is_rejected() {
        let mut config = OrreryConfig::default();
        config.scene.belt_thickness = -1.0;
        assert!(rejection(&config).contains("belt_thickness"));
    }

    #[test]
    fn smoothing_outside_unit_interval_is_rejected() {
        for smoothing in [0.0, -0.1, 1.5, f32::NAN] {
            let mut config = OrreryConfig::default();
            config.camera.smoothing = smoothing;
            assert!(rejection(&config).contains("smoothing"), "{smoothing}");
        }

        let mut config = OrreryConfig::default();
        config.camera.smoothing = 1.0;
        assert!(config.validate(Path::new("orrery.ron")).is_ok());
    }

    #[test]
    fn non_positive_arrival_epsilon_is_rejected() {
        let mut config = OrreryConfig::default();
        config.camera.arrival_epsilon = 0.0;
        assert!(rejection(&config).contains("arrival_epsilon"));
    }

    #[test]
    fn negative_release_margin_is_rejected() {
        let mut config = OrreryConfig::default();
        config.camera.release_margin = -5.0;
        assert!(rejection(&config).contains("release_margin"));
    }

    #[test]
    fn inverted_belt_file_falls_back_and_builds_a_scene() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orrery.ron");
        std::fs::write(&path, "(scene: (belt_inner: 90.0, belt_outer: 70.0))").unwrap();

        assert!(matches!(
            OrreryConfig::load(&path),
            Err(ConfigError::Invalid { .. })
        ));

        let (config, notice) = OrreryConfig::load_or_default(&path);
        assert!(notice.unwrap().contains("belt_inner"));
        let orrery = crate::scene::Orrery::new(&config.scene);
        assert_eq!(
            orrery.belt.asteroids.len(),
            SceneSettings::default().asteroid_count
        );
    }
}
