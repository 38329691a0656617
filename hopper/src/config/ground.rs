//! Configuration for the ground check.

use nalgebra::Vector3;

use super::require_positive;
use crate::constants::DEFAULT_GROUND_CHECK_RADIUS;
use crate::error::ConfigError;
use crate::flags::LayerMask;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroundConfig {
    /// Radius of the sphere probed at the feet (meters).
    pub check_radius: f32,

    /// Offset from the character position to its feet anchor.
    pub feet_offset: Vector3<f32>,

    /// Layers treated as ground.
    pub ground_mask: LayerMask,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            check_radius: DEFAULT_GROUND_CHECK_RADIUS,
            feet_offset: Vector3::new(0.0, -1.0, 0.0),
            ground_mask: LayerMask::ground(),
        }
    }
}

impl GroundConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        require_positive("ground.check_radius", self.check_radius)?;
        if self.ground_mask.is_empty() {
            return Err(ConfigError::EmptyGroundMask);
        }
        Ok(())
    }
}
