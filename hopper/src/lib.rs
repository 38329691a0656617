pub mod backend;
pub mod checkpoint;
pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod flags;
pub mod health;
pub mod input;
pub mod math;
pub mod state;
pub mod timers;

pub use backend::{AbilityListener, EventLog, GroundProbe, KinematicMover};
pub use checkpoint::{
    Checkpoint, CheckpointCoordinator, RespawnFallback, RespawnSource, RespawnTarget, SpawnPoint,
};
pub use config::{
    DashingConfig, GroundConfig, HeadingFrame, HealthConfig, JumpingConfig, MovementConfig,
    SlidingConfig, WalkingConfig,
};
pub use controller::{MovementController, TickOutput};
pub use error::{CheckpointError, ConfigError};
pub use flags::{BitmaskFlags, FlagBitmask, Layer, LayerMask};
pub use health::Health;
pub use input::{ActionSet, EdgeDetector, InputAction, InputFrame};
pub use state::{AbilityEvent, AbilityState, PlayerState};
pub use timers::{DashCooldown, SlideCooldown};
