//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;

use super::OrreryConfig;

/// Interactive 3D solar system.
///
/// Values given here override the config file.
#[derive(Parser, Debug, Default)]
#[command(name = "orrery", version, about = "Interactive 3D solar system")]
pub struct CliArgs {
    /// Path to the RON config file.
    #[arg(long, default_value = "orrery.ron")]
    pub config: PathBuf,

    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Start with orbits paused.
    #[arg(long)]
    pub paused: bool,

    /// Simulation speed multiplier.
    #[arg(long)]
    pub time_scale: Option<f32>,

    /// Log filter (error, warn, info, debug, trace, or an env_logger directive).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Write the effective config to `--config` and exit.
    #[arg(long)]
    pub write_default_config: bool,
}

impl OrreryConfig {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if args.paused {
            self.simulation.start_paused = true;
        }
        if let Some(scale) = args.time_scale {
            self.simulation.time_scale = scale.clamp(0.0, self.simulation.max_time_scale);
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_only_given_values() {
        let mut config = OrreryConfig::default();
        let args = CliArgs {
            width: Some(1920),
            paused: true,
            log_level: Some("debug".to_string()),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);

        assert_eq!(config.window.width, 1920);
        assert!(config.simulation.start_paused);
        assert_eq!(config.debug.log_level, "debug");
        assert_eq!(config.window.height, OrreryConfig::default().window.height);
    }

    #[test]
    fn no_overrides_leave_config_untouched() {
        let mut config = OrreryConfig::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, OrreryConfig::default());
    }

    #[test]
    fn time_scale_is_clamped() {
        let mut config = OrreryConfig::default();
        let args = CliArgs {
            time_scale: Some(1000.0),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.simulation.time_scale, config.simulation.max_time_scale);
    }

    #[test]
    fn parses_flags() {
        let args = CliArgs::parse_from([
            "orrery",
            "--config",
            "custom.ron",
            "--time-scale",
            "4",
            "--paused",
        ]);
        assert_eq!(args.config, PathBuf::from("custom.ron"));
        assert_eq!(args.time_scale, Some(4.0));
        assert!(args.paused);
        assert!(!args.write_default_config);
    }
}
