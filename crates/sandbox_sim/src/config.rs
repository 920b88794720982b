//! Sandbox configuration
//!
//! # Sources (in priority order)
//!
//! 1. Environment variables: `SANDBOX_GRAVITY_X`, `SANDBOX_GRAVITY_Y`, `SANDBOX_ASSETS`
//! 2. Config file: `$SANDBOX_CONFIG`, else `sandbox.toml` in the working directory
//! 3. Built-in defaults
//!
//! # Example Config File
//!
//! ```toml
//! asset_root = "assets"
//!
//! [physics]
//! gravity = [0.0, 900.0]
//! timestep = 0.016666668
//!
//! [camera]
//! zoom_step = 0.05
//! pan_speed = 15.0
//!
//! [drag]
//! max_force = 700000.0
//!
//! [entities]
//! bounce_impulse = 500000.0
//! coin_value = 10
//!
//! [entities.ball]
//! mass = 10.0
//! radius = 12.0
//! ```

use sandbox_physics::{PhysicsConfig, PhysicsMaterial};
use sandbox_view::CameraConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "SANDBOX_CONFIG";

/// Config file looked up when the environment does not name one
pub const DEFAULT_CONFIG_FILE: &str = "sandbox.toml";

/// Construction parameters of one entity variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyTuning {
    /// Sprite file, relative to the asset root
    pub image: String,
    /// Sprite scale factor
    pub scale: f32,
    /// Mass; ignored for static variants
    pub mass: f32,
    /// Circle radius; boxes take their size from the sprite instead
    pub radius: f32,
    pub friction: f32,
    pub restitution: f32,
    /// Static variants never move
    pub is_static: bool,
}

impl Default for BodyTuning {
    fn default() -> Self {
        Self {
            image: "ball.png".to_string(),
            scale: 0.1,
            mass: 10.0,
            radius: 20.0,
            friction: 0.7,
            restitution: 0.8,
            is_static: false,
        }
    }
}

impl BodyTuning {
    /// Surface material built from friction and restitution
    pub fn material(&self) -> PhysicsMaterial {
        PhysicsMaterial::new(self.friction, self.restitution)
    }
}

/// Per-variant tuning.
///
/// A variant table in a config file only overrides the keys it names; the
/// rest keep that variant's defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TuningOverrides")]
pub struct EntityTuning {
    pub player: BodyTuning,
    pub ball: BodyTuning,
    #[serde(rename = "box")]
    pub crate_box: BodyTuning,
    pub bouncer: BodyTuning,
    pub coin: BodyTuning,
    /// Steering force applied to the controllable at full input
    pub player_force: f32,
    /// Impulse magnitude per second pushed into bodies touching a bouncer
    pub bounce_impulse: f32,
    /// Score added by each collected coin
    pub coin_value: u64,
}

impl Default for EntityTuning {
    fn default() -> Self {
        Self {
            player: BodyTuning {
                image: "ball.png".to_string(),
                scale: 0.1,
                mass: 5.0,
                radius: 15.0,
                ..Default::default()
            },
            ball: BodyTuning {
                image: "ball.png".to_string(),
                scale: 0.08,
                mass: 10.0,
                radius: 12.0,
                ..Default::default()
            },
            crate_box: BodyTuning {
                image: "box.png".to_string(),
                scale: 0.1,
                mass: 20.0,
                radius: 0.0,
                friction: 0.8,
                restitution: 0.4,
                is_static: false,
            },
            bouncer: BodyTuning {
                image: "bouncer.png".to_string(),
                scale: 0.2,
                mass: 0.0,
                radius: 25.0,
                friction: 0.5,
                restitution: 2.0,
                is_static: true,
            },
            coin: BodyTuning {
                image: "coin.png".to_string(),
                scale: 0.07,
                mass: 1.0,
                radius: 10.0,
                friction: 1.0,
                restitution: 0.1,
                is_static: false,
            },
            player_force: 20000.0,
            bounce_impulse: 500000.0,
            coin_value: 10,
        }
    }
}

/// Partial variant table as written in a config file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct BodyOverrides {
    image: Option<String>,
    scale: Option<f32>,
    mass: Option<f32>,
    radius: Option<f32>,
    friction: Option<f32>,
    restitution: Option<f32>,
    is_static: Option<bool>,
}

impl BodyOverrides {
    fn apply(self, base: &mut BodyTuning) {
        if let Some(image) = self.image {
            base.image = image;
        }
        base.scale = self.scale.unwrap_or(base.scale);
        base.mass = self.mass.unwrap_or(base.mass);
        base.radius = self.radius.unwrap_or(base.radius);
        base.friction = self.friction.unwrap_or(base.friction);
        base.restitution = self.restitution.unwrap_or(base.restitution);
        base.is_static = self.is_static.unwrap_or(base.is_static);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct TuningOverrides {
    player: BodyOverrides,
    ball: BodyOverrides,
    #[serde(rename = "box")]
    crate_box: BodyOverrides,
    bouncer: BodyOverrides,
    coin: BodyOverrides,
    player_force: Option<f32>,
    bounce_impulse: Option<f32>,
    coin_value: Option<u64>,
}

impl From<TuningOverrides> for EntityTuning {
    fn from(overrides: TuningOverrides) -> Self {
        let mut tuning = EntityTuning::default();
        overrides.player.apply(&mut tuning.player);
        overrides.ball.apply(&mut tuning.ball);
        overrides.crate_box.apply(&mut tuning.crate_box);
        overrides.bouncer.apply(&mut tuning.bouncer);
        overrides.coin.apply(&mut tuning.coin);
        tuning.player_force = overrides.player_force.unwrap_or(tuning.player_force);
        tuning.bounce_impulse = overrides.bounce_impulse.unwrap_or(tuning.bounce_impulse);
        tuning.coin_value = overrides.coin_value.unwrap_or(tuning.coin_value);
        tuning
    }
}

/// Pointer drag joint parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Joint force limit at zoom 1; scaled by the current zoom
    pub max_force: f32,
    /// Fraction of positional error left after one second
    pub error_bias: f32,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            max_force: 700000.0,
            error_bias: (1.0f32 - 0.15).powf(60.0),
        }
    }
}

/// Static walls around the starting view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    pub enabled: bool,
    /// Wall radius; walls sit this far outside the view edges
    pub thickness: f32,
    /// How far the walls extend past the view on each side
    pub extent: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            thickness: 50.0,
            extent: 5000.0,
            friction: 0.9,
            restitution: 0.7,
        }
    }
}

/// Complete sandbox configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub physics: PhysicsConfig,
    pub camera: CameraConfig,
    pub drag: DragConfig,
    pub entities: EntityTuning,
    pub boundaries: BoundaryConfig,
    /// Directory sprites are loaded from
    pub asset_root: PathBuf,
    /// Event log CSV file; in-memory only when unset
    pub event_log: Option<PathBuf>,
    /// Config file this was loaded from
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl SandboxConfig {
    /// Load from the config file (if any) and apply environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut config = match explicit {
            Some(path) => Self::load_from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load_from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                log::info!("No config file found, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.config_path = Some(path.to_path_buf());
        log::info!("Loaded sandbox config from {:?}", path);
        Ok(config)
    }

    /// Parse from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Some(x) = env_f32("SANDBOX_GRAVITY_X") {
            self.physics.gravity[0] = x;
            log::info!("Gravity x from env: {}", x);
        }
        if let Some(y) = env_f32("SANDBOX_GRAVITY_Y") {
            self.physics.gravity[1] = y;
            log::info!("Gravity y from env: {}", y);
        }
        if let Ok(root) = std::env::var("SANDBOX_ASSETS") {
            if !root.is_empty() {
                self.asset_root = PathBuf::from(root);
            }
        }
    }

    /// Reject values the sandbox cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.physics.validate()?;

        let camera = &self.camera;
        if !(camera.view_width > 0.0 && camera.view_height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "view size must be positive, got {}x{}",
                camera.view_width, camera.view_height
            )));
        }
        if !(camera.min_zoom > 0.0 && camera.min_zoom <= camera.max_zoom) {
            return Err(ConfigError::Invalid(format!(
                "zoom range [{}, {}] is empty or not positive",
                camera.min_zoom, camera.max_zoom
            )));
        }

        let tuning = &self.entities;
        for (name, body) in [
            ("player", &tuning.player),
            ("ball", &tuning.ball),
            ("box", &tuning.crate_box),
            ("bouncer", &tuning.bouncer),
            ("coin", &tuning.coin),
        ] {
            if !body.is_static && !(body.mass > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} mass must be positive, got {}",
                    name, body.mass
                )));
            }
            if !(body.scale > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} scale must be positive, got {}",
                    name, body.scale
                )));
            }
        }
        Ok(())
    }

    /// Builder: set gravity
    pub fn with_gravity(mut self, x: f32, y: f32) -> Self {
        self.physics.gravity = [x, y];
        self
    }

    /// Builder: set asset root
    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    /// Builder: enable or disable the walls
    pub fn with_boundaries(mut self, enabled: bool) -> Self {
        self.boundaries.enabled = enabled;
        self
    }
}

fn env_f32(key: &str) -> Option<f32> {
    let value = std::env::var(key).ok()?;
    match value.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("Ignoring {}={:?}: not a number", key, value);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_sandbox() {
        let config = SandboxConfig::default();
        assert_eq!(config.physics.gravity, [0.0, 900.0]);
        assert_eq!(config.entities.coin_value, 10);
        assert_eq!(config.entities.bouncer.restitution, 2.0);
        assert!(config.entities.bouncer.is_static);
        assert_eq!(config.camera.pan_speed, 15.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = SandboxConfig::from_toml_str(
            r#"
            asset_root = "art"

            [physics]
            gravity = [0.0, 0.0]

            [entities]
            coin_value = 25

            [entities.box]
            mass = 40.0
            "#,
        )
        .unwrap();

        assert_eq!(config.physics.gravity, [0.0, 0.0]);
        assert_eq!(config.entities.coin_value, 25);
        assert_eq!(config.entities.crate_box.mass, 40.0);
        assert_eq!(config.entities.crate_box.restitution, 0.4);
        assert_eq!(config.entities.crate_box.image, "box.png");
        assert_eq!(config.asset_root, PathBuf::from("art"));
        assert_eq!(config.drag, DragConfig::default());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = SandboxConfig::from_toml_str("physics = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn zero_mass_dynamic_body_is_rejected() {
        let mut config = SandboxConfig::default();
        config.entities.ball.mass = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = SandboxConfig::load_from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
