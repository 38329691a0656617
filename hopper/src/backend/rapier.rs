//! Rapier-backed ground probe and kinematic mover over a static level.
//!
//! The level is built once from collider definitions and never mutated:
//! - Colliders are inserted in `id` order, so the same level data always yields the same sets.
//! - Query-focused: supports sphere overlap for ground checks and the Rapier
//!   `KinematicCharacterController` for sweep-and-slide movement.
//! - Each collider carries its [`LayerMask`] in `user_data`, so one query serves any mask.

use nalgebra::Vector3;
use rapier3d::{
    control::{CharacterAutostep, CharacterLength, KinematicCharacterController},
    na::{Translation3, UnitQuaternion},
    prelude::*,
};

use super::traits::{GroundProbe, KinematicMover};
use crate::flags::LayerMask;

/// Immutable level collider definition.
#[derive(Clone, Debug)]
pub struct LevelColliderDef {
    /// Insertion key; unique per level.
    pub id: u32,
    pub translation: Vector3<f32>,
    /// Identity for axis-aligned level pieces.
    pub rotation: UnitQuaternion<f32>,
    pub shape: ColliderShapeDef,
    /// Layers this collider belongs to (ground, hazard, ...).
    pub layers: LayerMask,
}

impl LevelColliderDef {
    pub fn new(
        id: u32,
        translation: Vector3<f32>,
        shape: ColliderShapeDef,
        layers: LayerMask,
    ) -> Self {
        Self {
            id,
            translation,
            rotation: UnitQuaternion::identity(),
            shape,
            layers,
        }
    }
}

/// Supported static collider shapes (meters).
#[derive(Clone, Debug)]
pub enum ColliderShapeDef {
    /// Infinite ground plane (half-space) facing the pose's local +Y,
    /// shifted `offset_along_normal` along it.
    Plane { offset_along_normal: f32 },
    Cuboid { half_extents: Vector3<f32> },
    Sphere { radius: f32 },
    CapsuleY { radius: f32, half_height: f32 },
    CylinderY { radius: f32, half_height: f32 },
}

/// Capsule dimensions of the character body.
///
/// `half_height` is the half-length of the cylinder section, so the total height is
/// `2 * half_height + 2 * radius`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapsuleSpec {
    pub radius: f32,
    pub half_height: f32,
}

impl CapsuleSpec {
    /// Distance from the capsule center down to its lowest point.
    pub fn feet_depth(&self) -> f32 {
        self.half_height + self.radius
    }
}

/// In-memory Rapier structures needed for scene queries against a static level.
pub struct RapierLevel {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
}

impl RapierLevel {
    /// Build the level. Input is sorted by `id` before insertion.
    pub fn build(mut defs: Vec<LevelColliderDef>) -> Self {
        defs.sort_by_key(|d| d.id);

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        for def in &defs {
            let iso = Isometry::from_parts(Translation3::from(def.translation), def.rotation);

            let rb = RigidBodyBuilder::fixed().pose(iso).build();
            let rb_handle = bodies.insert(rb);

            colliders.insert_with_parent(collider_from_def(def), rb_handle, &mut bodies);
        }

        // Collision detection only (no dynamics) to populate the broad/narrow phases.
        let mut broad_phase = BroadPhaseBvh::new();
        let mut narrow_phase = NarrowPhase::new();
        let mut collision_pipeline = CollisionPipeline::new();
        let hooks = ();
        let events = ();

        collision_pipeline.step(
            0.0,
            &mut broad_phase,
            &mut narrow_phase,
            &mut bodies,
            &mut colliders,
            &hooks,
            &events,
        );

        log::debug!("built rapier level with {} colliders", colliders.len());

        Self {
            bodies,
            colliders,
            broad_phase,
            narrow_phase,
        }
    }

    /// Borrowed `QueryPipeline` view over the level.
    pub fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }
}

impl GroundProbe for RapierLevel {
    fn check_sphere(&self, center: Vector3<f32>, radius: f32, mask: LayerMask) -> bool {
        if radius <= 0.0 {
            return false;
        }

        let query = self.query_pipeline(QueryFilter::only_fixed());
        let ball = Ball::new(radius);
        let pose = Isometry::translation(center.x, center.y, center.z);

        query
            .intersect_shape(pose, &ball)
            .any(|(_, collider)| collider_layers(collider).intersects(mask))
    }
}

/// Layers stored on a collider by [`RapierLevel::build`].
pub fn collider_layers(collider: &Collider) -> LayerMask {
    LayerMask::new(collider.user_data as u32)
}

fn collider_from_def(def: &LevelColliderDef) -> Collider {
    let builder = match &def.shape {
        // The body pose carries translation and rotation; the half-space stays in local space.
        ColliderShapeDef::Plane {
            offset_along_normal,
        } => ColliderBuilder::halfspace(Vector::y_axis())
            .translation(Vector::new(0.0, *offset_along_normal, 0.0)),

        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }

        ColliderShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius),

        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(*half_height, *radius),

        ColliderShapeDef::CylinderY {
            radius,
            half_height,
        } => ColliderBuilder::cylinder(*half_height, *radius),
    };

    builder.user_data(u128::from(def.layers.bits)).build()
}

/// Capsule character moved through a [`RapierLevel`] by Rapier's KCC.
pub struct RapierCharacter {
    level: RapierLevel,
    capsule: CapsuleSpec,
    position: Vector3<f32>,
    collision_enabled: bool,
    kcc: KinematicCharacterController,
}

impl RapierCharacter {
    pub fn new(level: RapierLevel, capsule: CapsuleSpec, position: Vector3<f32>) -> Self {
        let kcc = KinematicCharacterController {
            autostep: Some(CharacterAutostep {
                include_dynamic_bodies: false,
                max_height: CharacterLength::Relative(0.4),
                ..CharacterAutostep::default()
            }),
            offset: CharacterLength::Relative(0.025),
            // Vertical motion is owned by the controller's gravity integration.
            snap_to_ground: None,
            ..KinematicCharacterController::default()
        };

        Self {
            level,
            capsule,
            position,
            collision_enabled: true,
            kcc,
        }
    }

    pub fn level(&self) -> &RapierLevel {
        &self.level
    }

    pub fn capsule(&self) -> CapsuleSpec {
        self.capsule
    }
}

impl GroundProbe for RapierCharacter {
    fn check_sphere(&self, center: Vector3<f32>, radius: f32, mask: LayerMask) -> bool {
        self.level.check_sphere(center, radius, mask)
    }
}

impl KinematicMover for RapierCharacter {
    fn position(&self) -> Vector3<f32> {
        self.position
    }

    fn move_character(&mut self, translation: Vector3<f32>, dt: f32) -> Vector3<f32> {
        if !self.collision_enabled {
            self.position += translation;
            return self.position;
        }

        let query = self.level.query_pipeline(QueryFilter::only_fixed());
        let shape = Capsule::new_y(self.capsule.half_height, self.capsule.radius);
        let pose = Isometry::translation(self.position.x, self.position.y, self.position.z);

        let correction = self
            .kcc
            .move_shape(dt, &query, &shape, &pose, translation, |_| {});

        self.position += correction.translation;
        self.position
    }

    fn teleport(&mut self, position: Vector3<f32>) {
        self.position = position;
    }

    fn set_collision_enabled(&mut self, enabled: bool) {
        self.collision_enabled = enabled;
    }

    fn collision_enabled(&self) -> bool {
        self.collision_enabled
    }
}
