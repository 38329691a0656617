//! Checkpoints and the respawn coordinator.
//!
//! # Model
//! - Checkpoints are static level markers built once at level load, indexed `0..N` in
//!   discovery order. The set never changes size during a session.
//! - At most one checkpoint is active. Activation is the only mutation.
//! - Respawning teleports the character to the active checkpoint's spawn point with
//!   collision resolution disabled for the duration of the teleport.
//!
//! # No active checkpoint
//! Before the player touches any checkpoint none is active. What happens then is an
//! explicit [`RespawnFallback`] policy rather than an implicit index default.

use nalgebra::Vector3;

use crate::backend::KinematicMover;
use crate::error::CheckpointError;

/// Where, and facing which way, a respawned character appears.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPoint {
    pub position: Vector3<f32>,
    pub yaw: f32,
}

impl SpawnPoint {
    pub fn new(position: Vector3<f32>, yaw: f32) -> Self {
        Self { position, yaw }
    }
}

/// A single level checkpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    index: usize,
    active: bool,
    spawn: SpawnPoint,
    /// Radius of the spherical trigger volume around the spawn point.
    trigger_radius: f32,
}

impl Checkpoint {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn spawn(&self) -> SpawnPoint {
        self.spawn
    }

    pub fn trigger_radius(&self) -> f32 {
        self.trigger_radius
    }

    /// Is `position` inside this checkpoint's trigger volume (boundary inclusive)?
    pub fn contains(&self, position: Vector3<f32>) -> bool {
        (position - self.spawn.position).norm_squared() <= self.trigger_radius * self.trigger_radius
    }
}

/// What to do when a respawn is requested before any checkpoint was activated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RespawnFallback {
    /// Respawn at checkpoint 0, the level start.
    #[default]
    FirstCheckpoint,
    /// Fail with [`CheckpointError::NoActiveCheckpoint`].
    Reject,
}

/// Why a particular checkpoint was chosen for a respawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespawnSource {
    Active,
    /// No checkpoint was active; [`RespawnFallback::FirstCheckpoint`] picked index 0.
    Fallback,
}

/// Resolved respawn destination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RespawnTarget {
    pub index: usize,
    pub spawn: SpawnPoint,
    pub source: RespawnSource,
}

/// Owns the checkpoint set and enforces the single-active invariant.
#[derive(Debug, Clone, Default)]
pub struct CheckpointCoordinator {
    checkpoints: Vec<Checkpoint>,
    fallback: RespawnFallback,
}

impl CheckpointCoordinator {
    /// Default radius for checkpoint trigger volumes (meters).
    pub const DEFAULT_TRIGGER_RADIUS: f32 = 1.5;

    /// Register checkpoints in discovery order; all start inactive.
    pub fn new(spawns: impl IntoIterator<Item = SpawnPoint>) -> Self {
        Self::with_trigger_radius(spawns, Self::DEFAULT_TRIGGER_RADIUS)
    }

    pub fn with_trigger_radius(
        spawns: impl IntoIterator<Item = SpawnPoint>,
        trigger_radius: f32,
    ) -> Self {
        let checkpoints: Vec<Checkpoint> = spawns
            .into_iter()
            .enumerate()
            .map(|(index, spawn)| Checkpoint {
                index,
                active: false,
                spawn,
                trigger_radius: trigger_radius.max(0.0),
            })
            .collect();

        log::debug!("registered {} checkpoints", checkpoints.len());

        Self {
            checkpoints,
            fallback: RespawnFallback::default(),
        }
    }

    pub fn with_fallback(mut self, fallback: RespawnFallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn fallback(&self) -> RespawnFallback {
        self.fallback
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Checkpoint> {
        self.checkpoints.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Checkpoint> {
        self.checkpoints.iter()
    }

    /// First active checkpoint, if any.
    pub fn active(&self) -> Option<&Checkpoint> {
        self.checkpoints.iter().find(|c| c.active)
    }

    /// Activate `index` and deactivate every other checkpoint.
    ///
    /// Called from trigger volumes with the checkpoint's own index. Out-of-range indices
    /// leave the set unchanged.
    pub fn update_active(&mut self, index: usize) -> Result<(), CheckpointError> {
        if index >= self.checkpoints.len() {
            return Err(CheckpointError::OutOfRange {
                index,
                len: self.checkpoints.len(),
            });
        }

        let changed = !self.checkpoints[index].active;
        for checkpoint in &mut self.checkpoints {
            checkpoint.active = checkpoint.index == index;
        }

        if changed {
            log::info!("checkpoint {index} activated");
        }
        Ok(())
    }

    /// Trigger-volume helper: activate the first checkpoint whose volume contains
    /// `position`. Returns its index.
    pub fn touch(&mut self, position: Vector3<f32>) -> Option<usize> {
        let index = self
            .checkpoints
            .iter()
            .find(|c| c.contains(position))
            .map(|c| c.index)?;

        // In range by construction.
        self.update_active(index).ok()?;
        Some(index)
    }

    /// Resolve where a respawn would place the character.
    pub fn resolve_respawn(&self) -> Result<RespawnTarget, CheckpointError> {
        if self.checkpoints.is_empty() {
            return Err(CheckpointError::Empty);
        }

        if let Some(active) = self.active() {
            return Ok(RespawnTarget {
                index: active.index,
                spawn: active.spawn,
                source: RespawnSource::Active,
            });
        }

        match self.fallback {
            RespawnFallback::FirstCheckpoint => {
                log::warn!("no active checkpoint, respawning at checkpoint 0");
                Ok(RespawnTarget {
                    index: 0,
                    spawn: self.checkpoints[0].spawn,
                    source: RespawnSource::Fallback,
                })
            }
            RespawnFallback::Reject => Err(CheckpointError::NoActiveCheckpoint),
        }
    }

    /// Teleport the character behind `mover` to the respawn target.
    ///
    /// Collision resolution is off while the position is written and is re-enabled
    /// before this returns, so the next tick's movement resolves normally.
    pub fn respawn_player<M: KinematicMover + ?Sized>(
        &self,
        mover: &mut M,
    ) -> Result<RespawnTarget, CheckpointError> {
        let target = self.resolve_respawn()?;

        mover.set_collision_enabled(false);
        mover.teleport(target.spawn.position);
        mover.set_collision_enabled(true);

        log::info!(
            "respawned at checkpoint {} ({:?})",
            target.index,
            target.spawn.position
        );
        Ok(target)
    }
}
