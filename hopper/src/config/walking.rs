//! Configuration for grounded and air locomotion.

use super::require_positive;
use crate::error::ConfigError;

/// Reference frame used to turn the 2D move axis into a world heading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeadingFrame {
    /// Move axis is relative to the camera yaw supplied with each input frame.
    #[default]
    Camera,
    /// Move axis is relative to the character's own facing.
    Character,
}

/// Configuration for walking.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WalkingConfig {
    /// Planar speed in meters per second.
    pub move_speed: f32,

    /// Approximate time (seconds) for the yaw to catch up with the input heading.
    /// Keep low; large values make the character feel unresponsive.
    pub smooth_rotation_time: f32,

    pub heading_frame: HeadingFrame,
}

impl Default for WalkingConfig {
    fn default() -> Self {
        Self {
            move_speed: 6.0,
            smooth_rotation_time: 0.1,
            heading_frame: HeadingFrame::Camera,
        }
    }
}

impl WalkingConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        require_positive("walking.move_speed", self.move_speed)?;
        require_positive("walking.smooth_rotation_time", self.smooth_rotation_time)
    }
}
