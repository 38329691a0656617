/// Minimum move-axis magnitude required to rotate or walk (inclusive).
///
/// Anything below this is treated as analog stick drift: the character holds both
/// position and orientation.
pub const MOVE_DEAD_ZONE: f32 = 0.1;

/// Vertical velocity (m/s) the controller clamps to while grounded.
///
/// Slightly negative so the ground probe stays engaged on the next tick.
pub const GROUNDED_VERTICAL_VELOCITY: f32 = -2.0;

/// Default gravity magnitude in meters per second squared (positive value).
pub const DEFAULT_GRAVITY_MPS2: f32 = 20.0;

/// Default terminal fall speed in meters per second (positive magnitude).
pub const DEFAULT_MAX_FALL_SPEED_MPS: f32 = 50.0;

/// Default radius of the ground check sphere at the character's feet (meters).
pub const DEFAULT_GROUND_CHECK_RADIUS: f32 = 0.4;

/// Default number of jumps available before touching ground again.
pub const DEFAULT_MAX_JUMPS: u8 = 2;

/// Upper bound for `max_jumps`.
pub const MAX_JUMPS_LIMIT: u8 = 5;

/// Planar distance tolerance when comparing traveled distance against a dash/slide length.
pub const TRAVEL_EPS: f32 = 1.0e-4;

/// Length of one dash cooldown step in seconds.
///
/// The dash cooldown is counted in whole seconds, decremented once per elapsed second.
pub const DASH_COOLDOWN_STEP_SECONDS: f32 = 1.0;
