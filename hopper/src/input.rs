//! Per-tick input sampled by the host.
//!
//! Buttons arrive edge-triggered: an action is present in [`InputFrame::actions`] only on
//! the tick its button went from released to pressed. Hosts that can only read held
//! state should run it through an [`EdgeDetector`].

use nalgebra::Vector2;

use crate::define_bitmask_flags;
use crate::flags::BitmaskFlags;

define_bitmask_flags!(InputAction, u8, {
    Jump,
    Dash,
    Slide,
    // Debug soft-reset: respawn at the active checkpoint.
    Kill,
});

pub type ActionSet = BitmaskFlags<u8>;

/// Input sampled by the host for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFrame {
    /// Move stick, `x` = right, `y` = forward. Magnitude is clamped to 1.
    pub move_axis: Vector2<f32>,
    /// Look stick delta, forwarded by the host to the camera rig. The controller itself
    /// only reads the resulting `camera_yaw`.
    pub look_axis: Vector2<f32>,
    /// Yaw of the camera this tick, used when headings are camera-relative.
    pub camera_yaw: f32,
    /// Actions that were pressed this tick.
    pub actions: ActionSet,
}

impl InputFrame {
    pub fn new(move_axis: Vector2<f32>) -> Self {
        Self {
            move_axis,
            ..Self::default()
        }
    }

    pub fn with_action(mut self, action: InputAction) -> Self {
        self.actions.add(action);
        self
    }

    pub fn with_camera_yaw(mut self, yaw: f32) -> Self {
        self.camera_yaw = yaw;
        self
    }

    pub fn pressed(&self, action: InputAction) -> bool {
        self.actions.has(action)
    }

    /// Move axis with magnitude limited to 1.
    pub fn clamped_move(&self) -> Vector2<f32> {
        let norm = self.move_axis.norm();
        if norm > 1.0 {
            self.move_axis / norm
        } else {
            self.move_axis
        }
    }
}

/// Converts held button states into edge-triggered presses.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeDetector {
    held: ActionSet,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the buttons held this tick; returns those that were not held last tick.
    pub fn update(&mut self, held_now: ActionSet) -> ActionSet {
        let pressed = ActionSet::new(held_now.bits & !self.held.bits);
        self.held = held_now;
        pressed
    }
}
