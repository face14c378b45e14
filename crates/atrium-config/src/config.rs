//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration for the locomotion/interaction core.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Pointer and look settings.
    pub input: InputConfig,
    /// Avatar movement tuning.
    pub movement: MovementConfig,
    /// Held-object carry tuning.
    pub carry: CarryConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Pointer and look configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// Mouse sensitivity multiplier (degrees of look per pointer unit).
    pub mouse_sensitivity: f32,
    /// Invert the vertical look axis.
    pub invert_y: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 2.0,
            invert_y: false,
        }
    }
}

/// Avatar movement, crouch, lean, head-bob, and footstep tuning.
///
/// Units are meters, seconds, and degrees throughout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MovementConfig {
    /// Walking speed in m/s.
    pub walk_speed: f32,
    /// Sprinting speed in m/s.
    pub sprint_speed: f32,
    /// Crouched movement speed in m/s.
    pub crouch_speed: f32,
    /// Smoothing time constant when accelerating toward a movement target.
    pub accel_time: f32,
    /// Smoothing time constant when decelerating toward rest.
    pub decel_time: f32,
    /// Apex height of a jump in meters.
    pub jump_height: f32,
    /// Gravity acceleration (negative = down).
    pub gravity: f32,
    /// Terminal fall velocity (negative = down).
    pub max_fall_speed: f32,
    /// Capsule height while standing.
    pub standing_height: f32,
    /// Capsule height while crouched.
    pub crouch_height: f32,
    /// Smoothing time constant for crouch/stand height transitions.
    pub height_smooth_time: f32,
    /// Eye height below the capsule top while standing.
    pub eye_drop: f32,
    /// Lean tilt angle in degrees while the lean input is held.
    pub lean_angle: f32,
    /// Lean interpolation rate (slerp factor per second).
    pub lean_speed: f32,
    /// Enable camera head bob.
    pub enable_head_bob: bool,
    /// Bob vertical amplitude while walking.
    pub walk_bob_height: f32,
    /// Bob vertical amplitude while sprinting.
    pub sprint_bob_height: f32,
    /// Bob cycles per second while walking.
    pub walk_bob_frequency: f32,
    /// Bob cycles per second while sprinting.
    pub sprint_bob_frequency: f32,
    /// Lateral sway amplitude of the bob cycle.
    pub bob_sway_amount: f32,
    /// Rate at which the camera offset chases the bob target.
    pub bob_smoothness: f32,
    /// Suppress head bob while crouched.
    pub disable_bob_on_crouch: bool,
    /// Base seconds between footsteps while walking.
    pub walk_step_interval: f32,
    /// Base seconds between footsteps while sprinting.
    pub sprint_step_interval: f32,
    /// Base seconds between footsteps while crouched.
    pub crouch_step_interval: f32,
    /// Horizontal speed below which the avatar counts as stationary.
    pub move_threshold: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: 5.0,
            sprint_speed: 9.0,
            crouch_speed: 2.5,
            accel_time: 0.06,
            decel_time: 0.35,
            jump_height: 1.5,
            gravity: -9.81,
            max_fall_speed: -30.0,
            standing_height: 2.0,
            crouch_height: 1.0,
            height_smooth_time: 0.08,
            eye_drop: 0.1,
            lean_angle: 45.0,
            lean_speed: 10.0,
            enable_head_bob: true,
            walk_bob_height: 0.03,
            sprint_bob_height: 0.06,
            walk_bob_frequency: 1.5,
            sprint_bob_frequency: 2.8,
            bob_sway_amount: 0.02,
            bob_smoothness: 10.0,
            disable_bob_on_crouch: true,
            walk_step_interval: 0.5,
            sprint_step_interval: 0.34,
            crouch_step_interval: 0.8,
            move_threshold: 0.1,
        }
    }
}

/// Held-object carry and throw tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CarryConfig {
    /// Distance in front of the camera at which a held body is suspended.
    pub hold_distance: f32,
    /// Proportional gain driving the held body toward its target point.
    pub hold_gain: f32,
    /// Slerp rate toward the held-orientation target (per second).
    pub hold_rotate_speed: f32,
    /// Velocity change imparted along the camera forward axis on throw.
    pub throw_speed: f32,
    /// Maximum pick-up ray distance.
    pub pickup_range: f32,
    /// Degrees of held-body rotation per pointer unit while rotating.
    pub rotate_sensitivity: f32,
    /// Linear damping applied to the body while held.
    pub held_linear_damping: f32,
    /// Angular damping applied to the body while held.
    pub held_angular_damping: f32,
    /// Damping restored on release.
    pub released_damping: f32,
}

impl Default for CarryConfig {
    fn default() -> Self {
        Self {
            hold_distance: 2.2,
            hold_gain: 600.0,
            hold_rotate_speed: 8.0,
            throw_speed: 8.0,
            pickup_range: 4.0,
            rotate_sensitivity: 0.5,
            held_linear_damping: 6.0,
            held_angular_damping: 8.0,
            released_damping: 0.05,
        }
    }
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Show physics collider wireframes.
    pub show_colliders: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            show_colliders: false,
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::Read)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::Parse)?;
            tracing::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            tracing::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::Write)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::Write)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::Read)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::Parse)?;

        if &new_config != self {
            tracing::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Returns the platform config directory for atrium.
    pub fn default_config_dir() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|d| d.join("atrium"))
    }
}
