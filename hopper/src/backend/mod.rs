//! Collaborator seams.
//!
//! The controller never owns physics, rendering or animation. It talks to them
//! through the traits in [`traits`]; [`rapier`] provides a ready-made physics
//! backend over a static Rapier level.

mod noop;
pub mod rapier;
mod traits;

pub use noop::EventLog;
pub use traits::{AbilityListener, GroundProbe, KinematicMover};
