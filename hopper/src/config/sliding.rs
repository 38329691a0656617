//! Configuration for the slide ability.

use super::{require_non_negative, require_positive};
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlidingConfig {
    /// Planar distance covered by one slide (meters).
    pub distance: f32,

    /// Slide speed (m/s).
    pub speed: f32,

    /// Cooldown in seconds, counted from the start of the slide.
    pub cooldown: f32,

    /// Momentum reached at the end of a full slide. Consumed by a jump (added to the
    /// jump speed) or a dash (added to the dash distance).
    pub momentum_cap: f32,

    /// How strongly the horizontal move axis steers the slide sideways (0 = no steering).
    pub steering: f32,

    /// A slide blocked by geometry ends after this many times its nominal duration.
    pub max_duration_factor: f32,
}

impl Default for SlidingConfig {
    fn default() -> Self {
        Self {
            distance: 6.0,
            speed: 12.0,
            cooldown: 1.0,
            momentum_cap: 4.0,
            steering: 0.5,
            max_duration_factor: 2.0,
        }
    }
}

impl SlidingConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        require_positive("sliding.distance", self.distance)?;
        require_positive("sliding.speed", self.speed)?;
        require_non_negative("sliding.cooldown", self.cooldown)?;
        require_non_negative("sliding.momentum_cap", self.momentum_cap)?;
        require_non_negative("sliding.steering", self.steering)?;
        require_positive("sliding.max_duration_factor", self.max_duration_factor)
    }
}
