//! Configuration for the surface navigator
//!
//! All options are constant for a session; changing them means building a
//! new navigator and re-running classification and the distance field.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::common::{NavResult, NavigationError};

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NavigatorConfig {
    /// Vertical clearance the robot needs above a ground voxel (meters)
    #[serde(default = "default_robot_height")]
    pub robot_height: f64,

    /// Footprint radius used to inflate obstacles (meters)
    #[serde(default = "default_robot_radius")]
    pub robot_radius: f64,

    /// Count unobserved voxels as clearance when classifying ground
    #[serde(default)]
    pub treat_unknown_as_free: bool,

    /// Position error below which the goal position counts as reached (meters)
    #[serde(default = "default_goal_reached_threshold")]
    pub goal_reached_threshold: f64,

    /// Controller tick rate (Hz)
    #[serde(default = "default_controller_frequency")]
    pub controller_frequency: f64,

    /// Lookahead radius for local target selection (meters)
    #[serde(default = "default_local_target_radius")]
    pub local_target_radius: f64,

    #[serde(default = "default_twist_linear_gain")]
    pub twist_linear_gain: f64,

    #[serde(default = "default_twist_angular_gain")]
    pub twist_angular_gain: f64,

    /// Tallest vertical step the robot can climb over (meters)
    #[serde(default = "default_max_superable_height")]
    pub max_superable_height: f64,
}

fn default_robot_height() -> f64 {
    0.5
}
fn default_robot_radius() -> f64 {
    0.5
}
fn default_goal_reached_threshold() -> f64 {
    0.2
}
fn default_controller_frequency() -> f64 {
    2.0
}
fn default_local_target_radius() -> f64 {
    0.4
}
fn default_twist_linear_gain() -> f64 {
    0.5
}
fn default_twist_angular_gain() -> f64 {
    1.0
}
fn default_max_superable_height() -> f64 {
    0.2
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            robot_height: default_robot_height(),
            robot_radius: default_robot_radius(),
            treat_unknown_as_free: false,
            goal_reached_threshold: default_goal_reached_threshold(),
            controller_frequency: default_controller_frequency(),
            local_target_radius: default_local_target_radius(),
            twist_linear_gain: default_twist_linear_gain(),
            twist_angular_gain: default_twist_angular_gain(),
            max_superable_height: default_max_superable_height(),
        }
    }
}

impl NavigatorConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> NavResult<Self> {
        let config: NavigatorConfig =
            toml::from_str(content).map_err(|e| NavigationError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> NavResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> NavResult<()> {
        let positive = [
            ("robot_height", self.robot_height),
            ("goal_reached_threshold", self.goal_reached_threshold),
            ("controller_frequency", self.controller_frequency),
            ("local_target_radius", self.local_target_radius),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(NavigationError::InvalidParameter(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        let non_negative = [
            ("robot_radius", self.robot_radius),
            ("twist_linear_gain", self.twist_linear_gain),
            ("twist_angular_gain", self.twist_angular_gain),
            ("max_superable_height", self.max_superable_height),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(NavigationError::InvalidParameter(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Time between controller ticks
    pub fn controller_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.controller_frequency)
    }
}
