//! Configuration for jumping and gravity.

use super::require_positive;
use crate::constants::{
    DEFAULT_GRAVITY_MPS2, DEFAULT_MAX_FALL_SPEED_MPS, DEFAULT_MAX_JUMPS, MAX_JUMPS_LIMIT,
};
use crate::error::ConfigError;

/// Configuration for jumps and the character's own gravity.
///
/// The character does not take part in rigid-body dynamics; gravity here is only
/// integrated into its vertical velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JumpingConfig {
    /// Vertical velocity (m/s) set by a jump.
    pub jump_speed: f32,

    /// Jumps available between landings (2 = double jump).
    pub max_jumps: u8,

    /// Downward acceleration magnitude (m/s²).
    pub gravity: f32,

    /// Terminal fall speed magnitude (m/s).
    pub max_fall_speed: f32,
}

impl Default for JumpingConfig {
    fn default() -> Self {
        Self {
            jump_speed: 8.0,
            max_jumps: DEFAULT_MAX_JUMPS,
            gravity: DEFAULT_GRAVITY_MPS2,
            max_fall_speed: DEFAULT_MAX_FALL_SPEED_MPS,
        }
    }
}

impl JumpingConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        require_positive("jumping.jump_speed", self.jump_speed)?;
        require_positive("jumping.gravity", self.gravity)?;
        require_positive("jumping.max_fall_speed", self.max_fall_speed)?;
        if self.max_jumps == 0 || self.max_jumps > MAX_JUMPS_LIMIT {
            return Err(ConfigError::MaxJumps {
                value: self.max_jumps,
                max: MAX_JUMPS_LIMIT,
            });
        }
        Ok(())
    }
}
