use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// How asset failures are surfaced to the caller.
///
/// `Lenient` keeps the session running: a missing texture becomes an entry
/// with no pixel content, a broken model leaves the viewer empty. `Strict`
/// turns the same conditions into errors the caller must handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    #[default]
    Lenient,
    Strict,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub rendering: RenderConfig,
    pub assets: AssetConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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
            title: "glimpse".to_string(),
            width: 1024,
            height: 768,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// World units per second.
    pub movement_speed: f32,
    /// Radians of yaw/pitch per pixel of mouse travel.
    pub look_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 45.0,
            movement_speed: 1.0,
            look_sensitivity: 0.002,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub clear_color: [f32; 3],
    /// Mode selected at startup; one of "position", "normal", "texcoords",
    /// "uvtest", "shaded", "custom".
    pub initial_mode: String,
    /// Optional user-supplied program, installed as the "custom" mode.
    pub custom_shader: Option<ShaderPair>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShaderPair {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.2, 0.3, 0.3],
            initial_mode: "shaded".to_string(),
            custom_shader: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Model opened when none is given on the command line.
    pub model_path: Option<PathBuf>,
    pub failure_policy: FailurePolicy,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            failure_policy: FailurePolicy::Lenient,
        }
    }
}

pub fn load_or_create_config() -> Result<ViewerConfig> {
    let config_path = get_config_path()?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    if !config_path.exists() {
        let default_config = ViewerConfig::default();
        let toml_content = toml::to_string_pretty(&default_config)?;
        std::fs::write(&config_path, toml_content).context("Failed to write default config")?;
        return Ok(default_config);
    }

    let content = std::fs::read_to_string(&config_path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "MetroManDevTeam", "glimpse")
        .context("Couldn't determine project directory")?;
    Ok(proj_dirs.config_dir().join("glimpse.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = ViewerConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: ViewerConfig = toml::from_str(&text).unwrap();

        assert_eq!(parsed.window.width, config.window.width);
        assert_eq!(parsed.camera.fov, config.camera.fov);
        assert_eq!(parsed.assets.failure_policy, FailurePolicy::Lenient);
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let parsed: ViewerConfig = toml::from_str(
            r#"
            [camera]
            fov = 70.0

            [assets]
            failure_policy = "strict"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.camera.fov, 70.0);
        assert_eq!(parsed.camera.movement_speed, 1.0);
        assert_eq!(parsed.window.title, "glimpse");
        assert_eq!(parsed.assets.failure_policy, FailurePolicy::Strict);
    }
}
