//! Loading service configuration (field geometry, robot start pose, playback
//! tuning, mission asset) from TOML.
//!
//! Every section is optional; missing values fall back to `Default`.
//!
//! ```toml
//! missions_path = "assets/missions.json"
//!
//! [field]
//! width = 236.0
//! height = 114.0
//!
//! [robot.start]
//! x = 30.0
//! y = 15.0
//! heading = 0.0
//!
//! [simulation]
//! speed_factor = 1.0
//! frame_interval_ms = 16
//! max_program_lines = 500
//! ```

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{Mission, Pose};
use crate::error::ConfigError;
use crate::path::FieldBounds;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  /// JSON mission asset; built-in seeds are used when absent.
  #[serde(default)]
  pub missions_path: Option<String>,
  #[serde(default)]
  pub field: FieldBounds,
  #[serde(default)]
  pub robot: RobotConfig,
  #[serde(default)]
  pub simulation: SimulationConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RobotConfig {
  #[serde(default = "default_start")]
  pub start: Pose,
}

fn default_start() -> Pose {
  Pose { x: 30.0, y: 15.0, heading: 0.0 }
}

impl Default for RobotConfig {
  fn default() -> Self {
    Self { start: default_start() }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
  /// Global playback speed multiplier.
  pub speed_factor: f64,
  /// Interval between pushed playback frames on the WebSocket.
  pub frame_interval_ms: u64,
  /// Longest accepted program source, in lines.
  pub max_program_lines: usize,
}

impl Default for SimulationConfig {
  fn default() -> Self {
    Self { speed_factor: 1.0, frame_interval_ms: 16, max_program_lines: 500 }
  }
}

impl AppConfig {
  pub fn validate(&self) -> Result<(), ConfigError> {
    if !(self.field.width > 0.0 && self.field.height > 0.0) {
      return Err(ConfigError::Invalid(format!(
        "field must have positive width and height (got {} x {})",
        self.field.width, self.field.height
      )));
    }
    if !(self.simulation.speed_factor.is_finite() && self.simulation.speed_factor > 0.0) {
      return Err(ConfigError::Invalid("simulation.speed_factor must be a positive number".into()));
    }
    if self.simulation.frame_interval_ms == 0 {
      return Err(ConfigError::Invalid("simulation.frame_interval_ms must be at least 1".into()));
    }
    Ok(())
  }
}

pub fn parse_config(text: &str, path: &str) -> Result<AppConfig, ConfigError> {
  let cfg: AppConfig = toml::from_str(text).map_err(|source| ConfigError::Toml { path: path.to_string(), source })?;
  cfg.validate()?;
  Ok(cfg)
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
  let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_string(), source })?;
  parse_config(&text, path)
}

/// Load `AppConfig` from ROBOSTAGE_CONFIG_PATH. Any error is logged and
/// defaults are used instead.
pub fn load_config_from_env() -> AppConfig {
  let Ok(path) = std::env::var("ROBOSTAGE_CONFIG_PATH") else {
    info!(target: "robostage_backend", "ROBOSTAGE_CONFIG_PATH not set; using default config");
    return AppConfig::default();
  };
  match load_config(&path) {
    Ok(cfg) => {
      info!(target: "robostage_backend", %path, "Loaded config (TOML)");
      cfg
    }
    Err(e) => {
      error!(target: "robostage_backend", %path, error = %e, "Failed to load config; using defaults");
      AppConfig::default()
    }
  }
}

pub fn parse_missions(text: &str, path: &str) -> Result<Vec<Mission>, ConfigError> {
  serde_json::from_str(text).map_err(|source| ConfigError::Json { path: path.to_string(), source })
}

pub fn load_missions(path: &str) -> Result<Vec<Mission>, ConfigError> {
  let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_string(), source })?;
  parse_missions(&text, path)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::MissionType;

  #[test]
  fn empty_config_uses_defaults() {
    let cfg = parse_config("", "inline").unwrap();
    assert_eq!(cfg.field, FieldBounds::default());
    assert_eq!(cfg.robot.start, Pose { x: 30.0, y: 15.0, heading: 0.0 });
    assert_eq!(cfg.simulation.frame_interval_ms, 16);
    assert!(cfg.missions_path.is_none());
  }

  #[test]
  fn partial_sections_merge_with_defaults() {
    let cfg = parse_config(
      "missions_path = \"m.json\"\n[field]\nwidth = 200.0\nheight = 100.0\n[simulation]\nspeed_factor = 2.5\n",
      "inline",
    )
    .unwrap();
    assert_eq!(cfg.missions_path.as_deref(), Some("m.json"));
    assert_eq!(cfg.field.width, 200.0);
    assert_eq!(cfg.simulation.speed_factor, 2.5);
    assert_eq!(cfg.simulation.max_program_lines, 500);
  }

  #[test]
  fn rejects_degenerate_field() {
    let err = parse_config("[field]\nwidth = 0.0\nheight = 10.0\n", "inline").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
  }

  #[test]
  fn reports_toml_errors_with_path() {
    let err = parse_config("field = [", "robostage.toml").unwrap_err();
    assert!(err.to_string().contains("robostage.toml"));
  }

  #[test]
  fn parses_mission_assets() {
    let ms = parse_missions(
      r#"[{"id":"M01","name":"Bonus","type":["switch"],"points":20,
           "submissions":[{"name":"extra","type":["range",0,2],"points":[0,5,10]}]}]"#,
      "inline",
    )
    .unwrap();
    assert_eq!(ms.len(), 1);
    assert_eq!(ms[0].submissions[0].kind, MissionType::Range { start: 0, end: 2 });
    assert!(parse_missions("{", "inline").is_err());
  }

  #[test]
  fn missing_files_are_io_errors() {
    let err = load_missions("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
  }
}
