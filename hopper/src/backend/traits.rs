use nalgebra::Vector3;

use crate::flags::LayerMask;
use crate::state::AbilityEvent;

/// Sphere overlap query used for ground detection.
pub trait GroundProbe {
    /// Is a sphere of `radius` at `center` overlapping any collider on a layer in `mask`?
    fn check_sphere(&self, center: Vector3<f32>, radius: f32, mask: LayerMask) -> bool;
}

/// The character's kinematic body.
///
/// The controller asks for a translation each tick; the mover resolves it against the
/// world and reports where the character ended up.
pub trait KinematicMover {
    /// Current world position of the character.
    fn position(&self) -> Vector3<f32>;

    /// Attempt to move by `translation` this tick, respecting world collision when
    /// enabled. Returns the resulting position.
    fn move_character(&mut self, translation: Vector3<f32>, dt: f32) -> Vector3<f32>;

    /// Place the character at `position` without any collision resolution.
    fn teleport(&mut self, position: Vector3<f32>);

    fn set_collision_enabled(&mut self, enabled: bool);

    fn collision_enabled(&self) -> bool;
}

/// Animation / HUD adapter notified of ability changes.
///
/// All methods default to no-ops so consumers only implement what they drive.
pub trait AbilityListener {
    fn on_event(&mut self, _event: AbilityEvent) {}

    /// Called every tick with the grounded flag.
    fn notify_grounded(&mut self, _grounded: bool) {}

    /// Called every tick with the planar speed actually achieved (m/s).
    fn set_speed(&mut self, _speed: f32) {}
}
