use thiserror::Error;

/// Failures resolving or applying a respawn, or addressing a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CheckpointError {
    /// The level has no checkpoints at all.
    #[error("no checkpoints registered")]
    Empty,

    /// No checkpoint is active and the fallback policy rejects defaulting.
    #[error("no checkpoint is active")]
    NoActiveCheckpoint,

    #[error("checkpoint index {index} out of range (len {len})")]
    OutOfRange { index: usize, len: usize },
}

/// A movement configuration value that would break the controller's invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("`{field}` must be finite and > 0, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("`{field}` must be finite and >= 0, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("`max_jumps` must be in 1..={max}, got {value}")]
    MaxJumps { value: u8, max: u8 },

    #[error("`max_hp` must be > 0")]
    ZeroMaxHp,

    #[error("ground mask is empty; the probe would never report ground")]
    EmptyGroundMask,
}
