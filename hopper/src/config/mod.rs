//! Tunable parameters for the movement controller.
//!
//! Each concern lives in its own file; [`MovementConfig`] aggregates them and is
//! validated once when the controller is built.

mod dashing;
mod ground;
mod health;
mod jumping;
mod sliding;
mod walking;

pub use dashing::DashingConfig;
pub use ground::GroundConfig;
pub use health::HealthConfig;
pub use jumping::JumpingConfig;
pub use sliding::SlidingConfig;
pub use walking::{HeadingFrame, WalkingConfig};

use crate::error::ConfigError;

/// Full controller configuration.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MovementConfig {
    pub walking: WalkingConfig,
    pub jumping: JumpingConfig,
    pub ground: GroundConfig,
    pub dashing: DashingConfig,
    pub sliding: SlidingConfig,
    /// Hit points are optional; without them the character only dies via the kill action.
    pub health: Option<HealthConfig>,
}

impl MovementConfig {
    /// Check every field against the controller's invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.walking.validate()?;
        self.jumping.validate()?;
        self.ground.validate()?;
        self.dashing.validate()?;
        self.sliding.validate()?;
        if let Some(health) = &self.health {
            health.validate()?;
        }
        Ok(())
    }
}

pub(crate) fn require_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

pub(crate) fn require_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}
