//! Configuration for the dash ability.

use super::require_positive;
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DashingConfig {
    /// Planar distance covered by one dash (meters), before any slide momentum bonus.
    pub distance: f32,

    /// Planar dash speed (m/s).
    pub speed: f32,

    /// Cooldown in whole seconds. Landing while it is pending refills it instantly.
    pub cooldown_seconds: u32,

    /// A dash blocked by geometry ends after this many times its nominal duration.
    pub max_duration_factor: f32,
}

impl Default for DashingConfig {
    fn default() -> Self {
        Self {
            distance: 5.0,
            speed: 25.0,
            cooldown_seconds: 2,
            max_duration_factor: 2.0,
        }
    }
}

impl DashingConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        require_positive("dashing.distance", self.distance)?;
        require_positive("dashing.speed", self.speed)?;
        require_positive("dashing.max_duration_factor", self.max_duration_factor)
    }
}
