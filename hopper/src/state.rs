use nalgebra::Vector3;

use crate::health::Health;
use crate::timers::{DashCooldown, SlideCooldown};

/// Mutually exclusive ability state. Exactly one holds at any tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AbilityState {
    Grounded,
    #[default]
    Airborne,
    Dashing,
    Sliding,
}

impl AbilityState {
    /// Dashing and sliding drive planar motion themselves; base locomotion is suspended.
    pub fn is_ability(self) -> bool {
        matches!(self, Self::Dashing | Self::Sliding)
    }
}

/// Notifications for animation and HUD consumers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AbilityEvent {
    Jumped { jumps_remaining: u8 },
    DashStarted { distance: f32 },
    DashEnded,
    SlideStarted,
    SlideEnded,
    /// Left the ground without jumping.
    Fell,
    Landed,
    Damaged { hp: u16 },
    Respawned { checkpoint: usize },
}

/// In-flight dash bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DashMotion {
    pub start: Vector3<f32>,
    /// Unit planar direction.
    pub direction: Vector3<f32>,
    /// Total planar distance for this dash, including any slide momentum bonus.
    pub distance: f32,
    pub elapsed: f32,
    /// Touched ground mid-dash; the landing refresh is applied when the dash ends.
    pub landed: bool,
}

/// In-flight slide bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SlideMotion {
    /// Planar path length covered so far (steering can bend the path).
    pub travelled: f32,
    pub elapsed: f32,
}

/// Kinematic and ability state of the player, owned by the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub position: Vector3<f32>,
    pub yaw: f32,
    /// Carried between ticks by the yaw smoothing.
    pub(crate) yaw_velocity: f32,
    pub vertical_velocity: f32,
    pub grounded: bool,
    pub jumps_remaining: u8,
    pub ability: AbilityState,
    pub momentum: f32,
    pub dash_cooldown: DashCooldown,
    pub slide_cooldown: SlideCooldown,
    pub health: Option<Health>,
    pub(crate) dash: Option<DashMotion>,
    pub(crate) slide: Option<SlideMotion>,
}

impl PlayerState {
    pub fn new(position: Vector3<f32>, yaw: f32, max_jumps: u8, health: Option<Health>) -> Self {
        Self {
            position,
            yaw,
            yaw_velocity: 0.0,
            vertical_velocity: 0.0,
            grounded: false,
            jumps_remaining: max_jumps,
            ability: AbilityState::Airborne,
            momentum: 0.0,
            dash_cooldown: DashCooldown::default(),
            slide_cooldown: SlideCooldown::default(),
            health,
            dash: None,
            slide: None,
        }
    }
}
