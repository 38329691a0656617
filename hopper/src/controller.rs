//! Per-tick ability state machine for the player character.
//!
//! One call to [`MovementController::tick`] is one simulation step. Within a tick the
//! order is fixed:
//! 0. cooldown timers advance
//! 1. ground probe and gravity (landing refills jumps and may refresh the dash)
//! 2. kill (respawn ends the tick)
//! 3. dash, 4. jump, 5. slide: edge-triggered, cancelling each other as needed
//! 6. planar motion for the resulting state, plus vertical displacement
//! 7. the mover resolves the displacement; dash/slide progress and the ability
//!    state are settled from where the character actually ended up
//!
//! Cancellation always happens in steps 3-5, before any displacement is computed.

use nalgebra::{Vector2, Vector3};

use crate::backend::{AbilityListener, GroundProbe, KinematicMover};
use crate::checkpoint::{CheckpointCoordinator, RespawnTarget};
use crate::config::{HeadingFrame, MovementConfig};
use crate::constants::{GROUNDED_VERTICAL_VELOCITY, MOVE_DEAD_ZONE, TRAVEL_EPS};
use crate::error::{CheckpointError, ConfigError};
use crate::health::Health;
use crate::input::{InputAction, InputFrame};
use crate::math::{
    forward_from_yaw, planar_distance, right_from_yaw, smooth_damp_angle, to_planar, wrap_angle,
};
use crate::state::{AbilityEvent, AbilityState, DashMotion, PlayerState, SlideMotion};

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutput {
    /// Displacement handed to the kinematic mover.
    pub displacement: Vector3<f32>,
    /// Position reported by the mover after resolving the displacement.
    pub position: Vector3<f32>,
    pub ability: AbilityState,
    pub grounded: bool,
}

/// Drives a character through its collaborators.
///
/// `W` is the physics side (ground probe + kinematic body), `L` the animation/HUD
/// listener (`()` when nothing listens).
pub struct MovementController<W, L = ()> {
    config: MovementConfig,
    state: PlayerState,
    world: W,
    checkpoints: CheckpointCoordinator,
    listener: L,
}

impl<W> MovementController<W, ()>
where
    W: GroundProbe + KinematicMover,
{
    pub fn new(
        config: MovementConfig,
        world: W,
        checkpoints: CheckpointCoordinator,
    ) -> Result<Self, ConfigError> {
        Self::with_listener(config, world, checkpoints, ())
    }
}

impl<W, L> MovementController<W, L>
where
    W: GroundProbe + KinematicMover,
    L: AbilityListener,
{
    /// Validate `config` and start the character at the mover's current position.
    pub fn with_listener(
        config: MovementConfig,
        world: W,
        checkpoints: CheckpointCoordinator,
        listener: L,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let health = config.health.map(|h| Health::new(h.max_hp));
        let state = PlayerState::new(world.position(), 0.0, config.jumping.max_jumps, health);

        Ok(Self {
            config,
            state,
            world,
            checkpoints,
            listener,
        })
    }

    /// Initial facing.
    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.state.yaw = wrap_angle(yaw);
        self
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn checkpoints(&self) -> &CheckpointCoordinator {
        &self.checkpoints
    }

    /// Trigger volumes call `update_active` / `touch` through this.
    pub fn checkpoints_mut(&mut self) -> &mut CheckpointCoordinator {
        &mut self.checkpoints
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    // --- UI-facing values ---

    pub fn ability_state(&self) -> AbilityState {
        self.state.ability
    }

    pub fn is_grounded(&self) -> bool {
        self.state.grounded
    }

    pub fn jumps_remaining(&self) -> u8 {
        self.state.jumps_remaining
    }

    pub fn can_dash(&self) -> bool {
        self.state.dash_cooldown.is_ready()
    }

    pub fn dash_seconds_remaining(&self) -> u32 {
        self.state.dash_cooldown.seconds_remaining()
    }

    pub fn can_slide(&self) -> bool {
        self.state.slide_cooldown.is_ready()
    }

    pub fn is_dashing(&self) -> bool {
        self.state.ability == AbilityState::Dashing
    }

    pub fn momentum(&self) -> f32 {
        self.state.momentum
    }

    pub fn health(&self) -> Option<Health> {
        self.state.health
    }

    /// Opacity for a damage overlay, 0 at full health. Always 0 without hit points.
    pub fn damage_overlay_alpha(&self) -> f32 {
        self.state.health.map_or(0.0, |h| h.damage_alpha())
    }

    // --- Hazard / enemy entry points ---

    /// Clear the dash cooldown immediately (e.g. after dashing through an enemy).
    pub fn reset_dash(&mut self) {
        self.state.dash_cooldown.clear();
    }

    /// Apply damage. Reaching zero refills hit points and respawns the player.
    ///
    /// Returns true if the hit was lethal. Does nothing without configured hit points.
    pub fn take_damage(&mut self, amount: u16) -> bool {
        let Some(health) = self.state.health.as_mut() else {
            return false;
        };
        health.sub(amount);
        let hp = health.current();
        let died = health.is_depleted();
        if died {
            health.refill();
        }

        self.emit(AbilityEvent::Damaged { hp });
        if !died {
            return false;
        }

        log::info!("player died");
        if let Err(err) = self.respawn() {
            log::error!("respawn after death failed: {err}");
        }
        true
    }

    pub fn heal(&mut self, amount: u16) {
        if let Some(health) = self.state.health.as_mut() {
            health.add(amount);
        }
    }

    /// Teleport to the respawn checkpoint and reset all traversal state.
    pub fn respawn(&mut self) -> Result<RespawnTarget, CheckpointError> {
        let target = self.checkpoints.respawn_player(&mut self.world)?;

        let interrupted = [
            self.state.dash.is_some().then_some(AbilityEvent::DashEnded),
            self.state.slide.is_some().then_some(AbilityEvent::SlideEnded),
        ];

        let state = &mut self.state;
        state.position = self.world.position();
        state.yaw = wrap_angle(target.spawn.yaw);
        state.yaw_velocity = 0.0;
        state.vertical_velocity = 0.0;
        state.grounded = false;
        state.ability = AbilityState::Airborne;
        state.momentum = 0.0;
        state.dash = None;
        state.slide = None;
        state.jumps_remaining = self.config.jumping.max_jumps;
        state.dash_cooldown.clear();
        state.slide_cooldown.clear();

        for event in interrupted.into_iter().flatten() {
            self.emit(event);
        }
        self.emit(AbilityEvent::Respawned {
            checkpoint: target.index,
        });
        Ok(target)
    }

    /// Advance the simulation by `dt` seconds.
    pub fn tick(&mut self, dt: f32, input: &InputFrame) -> TickOutput {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let previous = self.state.ability;

        self.state.dash_cooldown.tick(dt);
        self.state.slide_cooldown.tick(dt);

        self.update_ground_and_gravity(dt);

        if input.pressed(InputAction::Kill) {
            match self.respawn() {
                Ok(_) => {
                    self.listener.notify_grounded(self.state.grounded);
                    self.listener.set_speed(0.0);
                    return self.output(Vector3::zeros());
                }
                Err(err) => log::error!("kill respawn failed: {err}"),
            }
        }

        if input.pressed(InputAction::Dash) {
            self.try_dash();
        }
        let jumped = input.pressed(InputAction::Jump) && self.try_jump();
        if input.pressed(InputAction::Slide) {
            self.try_slide();
        }

        let move_axis = input.clamped_move();
        let planar = match self.state.ability {
            AbilityState::Dashing => self.dash_step(dt),
            AbilityState::Sliding => self.slide_step(dt, move_axis),
            AbilityState::Grounded | AbilityState::Airborne => {
                self.locomotion_step(dt, move_axis, input.camera_yaw)
            }
        };

        let displacement = planar + Vector3::new(0.0, self.state.vertical_velocity * dt, 0.0);
        let start = self.state.position;
        let end = self.world.move_character(displacement, dt);
        self.state.position = end;

        self.advance_abilities(dt, start, end);
        self.settle_state(previous, jumped);

        self.listener.notify_grounded(self.state.grounded);
        let speed = if dt > 0.0 {
            planar_distance(start, end) / dt
        } else {
            0.0
        };
        self.listener.set_speed(speed);

        self.output(displacement)
    }

    fn output(&self, displacement: Vector3<f32>) -> TickOutput {
        TickOutput {
            displacement,
            position: self.state.position,
            ability: self.state.ability,
            grounded: self.state.grounded,
        }
    }

    fn emit(&mut self, event: AbilityEvent) {
        log::debug!("{event:?}");
        self.listener.on_event(event);
    }

    fn update_ground_and_gravity(&mut self, dt: f32) {
        let ground = &self.config.ground;
        let feet = self.state.position + ground.feet_offset;
        let grounded = self
            .world
            .check_sphere(feet, ground.check_radius, ground.ground_mask);
        self.state.grounded = grounded;

        if grounded && self.state.vertical_velocity < 0.0 {
            self.state.vertical_velocity = GROUNDED_VERTICAL_VELOCITY;
            self.state.jumps_remaining = self.config.jumping.max_jumps;

            if let Some(dash) = self.state.dash.as_mut() {
                dash.landed = true;
            } else if self.state.dash_cooldown.refresh_on_landing() {
                log::debug!("dash cooldown refreshed by landing");
            }
        } else {
            let jumping = &self.config.jumping;
            self.state.vertical_velocity = (self.state.vertical_velocity - jumping.gravity * dt)
                .max(-jumping.max_fall_speed);
        }
    }

    fn try_dash(&mut self) -> bool {
        if self.state.ability == AbilityState::Dashing || !self.state.dash_cooldown.is_ready() {
            return false;
        }

        let bonus = if self.state.ability == AbilityState::Sliding {
            self.end_slide()
        } else {
            0.0
        };

        let distance = self.config.dashing.distance + bonus;
        self.state.dash = Some(DashMotion {
            start: self.state.position,
            direction: forward_from_yaw(self.state.yaw),
            distance,
            elapsed: 0.0,
            landed: false,
        });
        self.state.vertical_velocity = 0.0;
        self.state.ability = AbilityState::Dashing;
        self.state.jumps_remaining = self.config.jumping.max_jumps;
        self.state
            .dash_cooldown
            .start(self.config.dashing.cooldown_seconds);

        self.emit(AbilityEvent::DashStarted { distance });
        true
    }

    fn try_jump(&mut self) -> bool {
        if self.state.jumps_remaining == 0 {
            return false;
        }

        let bonus = if self.state.ability == AbilityState::Sliding {
            self.end_slide()
        } else {
            0.0
        };

        self.state.vertical_velocity = self.config.jumping.jump_speed + bonus;
        self.state.jumps_remaining -= 1;

        self.emit(AbilityEvent::Jumped {
            jumps_remaining: self.state.jumps_remaining,
        });
        true
    }

    fn try_slide(&mut self) -> bool {
        let state = &self.state;
        if !state.grounded
            || state.vertical_velocity > 0.0
            || state.ability.is_ability()
            || !state.slide_cooldown.is_ready()
        {
            return false;
        }

        self.state.slide = Some(SlideMotion {
            travelled: 0.0,
            elapsed: 0.0,
        });
        self.state.momentum = 0.0;
        self.state.ability = AbilityState::Sliding;
        self.state
            .slide_cooldown
            .start(self.config.sliding.cooldown);

        self.emit(AbilityEvent::SlideStarted);
        true
    }

    /// Stop sliding and hand back the momentum gathered so far.
    fn end_slide(&mut self) -> f32 {
        let momentum = self.state.momentum;
        self.state.slide = None;
        self.state.momentum = 0.0;
        self.state.ability = self.base_state();

        self.emit(AbilityEvent::SlideEnded);
        momentum
    }

    fn end_dash(&mut self) {
        let landed = self.state.dash.take().is_some_and(|dash| dash.landed);
        if landed && self.state.dash_cooldown.refresh_on_landing() {
            log::debug!("dash cooldown refreshed by landing during dash");
        }
        self.state.ability = self.base_state();
        self.emit(AbilityEvent::DashEnded);
    }

    /// Grounded or Airborne, from this tick's probe and vertical velocity.
    fn base_state(&self) -> AbilityState {
        if self.state.grounded && self.state.vertical_velocity <= 0.0 {
            AbilityState::Grounded
        } else {
            AbilityState::Airborne
        }
    }

    fn dash_step(&self, dt: f32) -> Vector3<f32> {
        let Some(dash) = self.state.dash else {
            return Vector3::zeros();
        };

        let travelled = planar_distance(dash.start, self.state.position);
        let remaining = (dash.distance - travelled).max(0.0);
        let step = (self.config.dashing.speed * dt).min(remaining);
        dash.direction * step
    }

    fn slide_step(&self, dt: f32, move_axis: Vector2<f32>) -> Vector3<f32> {
        let Some(slide) = self.state.slide else {
            return Vector3::zeros();
        };

        let sliding = &self.config.sliding;
        let steer = right_from_yaw(self.state.yaw) * (move_axis.x * sliding.steering);
        let direction = (forward_from_yaw(self.state.yaw) + steer)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| forward_from_yaw(self.state.yaw));

        let remaining = (sliding.distance - slide.travelled).max(0.0);
        direction * (sliding.speed * dt).min(remaining)
    }

    fn locomotion_step(
        &mut self,
        dt: f32,
        move_axis: Vector2<f32>,
        camera_yaw: f32,
    ) -> Vector3<f32> {
        self.state.momentum = 0.0;

        // Inclusive dead zone: exactly MOVE_DEAD_ZONE still moves.
        if move_axis.norm() < MOVE_DEAD_ZONE {
            return Vector3::zeros();
        }

        let direction = move_axis.normalize();
        let frame_yaw = match self.config.walking.heading_frame {
            HeadingFrame::Camera => camera_yaw,
            HeadingFrame::Character => self.state.yaw,
        };
        let target_yaw = direction.x.atan2(direction.y) + frame_yaw;

        let yaw = smooth_damp_angle(
            self.state.yaw,
            target_yaw,
            &mut self.state.yaw_velocity,
            self.config.walking.smooth_rotation_time,
            dt,
        );
        self.state.yaw = wrap_angle(yaw);

        // Move along the requested heading, not the smoothed facing.
        forward_from_yaw(target_yaw) * (self.config.walking.move_speed * dt)
    }

    /// Update dash/slide progress from the resolved move and end them when done.
    fn advance_abilities(&mut self, dt: f32, start: Vector3<f32>, end: Vector3<f32>) {
        if let Some(dash) = self.state.dash.as_mut() {
            dash.elapsed += dt;
            let travelled = planar_distance(dash.start, end);
            let time_limit =
                dash.distance / self.config.dashing.speed * self.config.dashing.max_duration_factor;

            if travelled + TRAVEL_EPS >= dash.distance {
                self.end_dash();
            } else if dash.elapsed >= time_limit {
                log::warn!("dash blocked after {travelled:.2}m, ending early");
                self.end_dash();
            }
            return;
        }

        if let Some(slide) = self.state.slide.as_mut() {
            let sliding = &self.config.sliding;
            slide.elapsed += dt;
            slide.travelled += (to_planar(end) - to_planar(start)).norm();
            let travelled = slide.travelled;
            let time_limit = sliding.distance / sliding.speed * sliding.max_duration_factor;
            let timed_out = slide.elapsed >= time_limit;

            self.state.momentum = sliding.momentum_cap * (travelled / sliding.distance).min(1.0);

            if travelled + TRAVEL_EPS >= sliding.distance || timed_out {
                if timed_out && travelled + TRAVEL_EPS < sliding.distance {
                    log::warn!("slide blocked after {travelled:.2}m, ending early");
                }
                // A slide that runs its course leaves no momentum behind.
                self.end_slide();
            }
        }
    }

    fn settle_state(&mut self, previous: AbilityState, jumped: bool) {
        if !self.state.ability.is_ability() {
            self.state.ability = self.base_state();
        }

        let current = self.state.ability;
        if current == previous {
            return;
        }

        match (previous, current) {
            (AbilityState::Airborne | AbilityState::Dashing, AbilityState::Grounded) => {
                self.emit(AbilityEvent::Landed);
            }
            (AbilityState::Grounded | AbilityState::Sliding, AbilityState::Airborne)
                if !jumped =>
            {
                self.emit(AbilityEvent::Fell);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::EventLog;
    use crate::checkpoint::SpawnPoint;
    use crate::config::{DashingConfig, HealthConfig};
    use crate::flags::LayerMask;
    use std::f32::consts::FRAC_PI_2;

    /// Flat floor at `ground_y` (if any) and an optional wall at `x = wall_x`.
    ///
    /// The character's center rests 1m above the floor, matching the default feet offset.
    #[derive(Debug, Clone)]
    struct FlatWorld {
        position: Vector3<f32>,
        ground_y: Option<f32>,
        wall_x: Option<f32>,
        collision: bool,
        teleports: usize,
    }

    impl FlatWorld {
        fn floor(position: Vector3<f32>) -> Self {
            Self {
                position,
                ground_y: Some(0.0),
                wall_x: None,
                collision: true,
                teleports: 0,
            }
        }

        fn void(position: Vector3<f32>) -> Self {
            Self {
                ground_y: None,
                ..Self::floor(position)
            }
        }
    }

    impl GroundProbe for FlatWorld {
        fn check_sphere(&self, center: Vector3<f32>, radius: f32, mask: LayerMask) -> bool {
            if !mask.intersects(LayerMask::ground()) {
                return false;
            }
            self.ground_y.is_some_and(|g| center.y - radius <= g)
        }
    }

    impl KinematicMover for FlatWorld {
        fn position(&self) -> Vector3<f32> {
            self.position
        }

        fn move_character(&mut self, translation: Vector3<f32>, _dt: f32) -> Vector3<f32> {
            let mut next = self.position + translation;
            if self.collision {
                if let Some(g) = self.ground_y {
                    next.y = next.y.max(g + 1.0);
                }
                if let Some(wall) = self.wall_x {
                    next.x = next.x.min(wall);
                }
            }
            self.position = next;
            next
        }

        fn teleport(&mut self, position: Vector3<f32>) {
            assert!(!self.collision, "teleport must run with collision disabled");
            self.teleports += 1;
            self.position = position;
        }

        fn set_collision_enabled(&mut self, enabled: bool) {
            self.collision = enabled;
        }

        fn collision_enabled(&self) -> bool {
            self.collision
        }
    }

    const STANDING: Vector3<f32> = Vector3::new(0.0, 1.0, 0.0);

    fn checkpoints() -> CheckpointCoordinator {
        CheckpointCoordinator::new([
            SpawnPoint::new(Vector3::new(0.0, 1.0, 0.0), 0.0),
            SpawnPoint::new(Vector3::new(20.0, 3.0, 0.0), FRAC_PI_2),
            SpawnPoint::new(Vector3::new(40.0, 5.0, 10.0), 1.0),
        ])
    }

    fn controller(
        config: MovementConfig,
        world: FlatWorld,
    ) -> MovementController<FlatWorld, EventLog> {
        MovementController::with_listener(config, world, checkpoints(), EventLog::default())
            .unwrap()
    }

    fn idle() -> InputFrame {
        InputFrame::default()
    }

    fn press(action: InputAction) -> InputFrame {
        InputFrame::default().with_action(action)
    }

    /// Tick with no input until the character reports grounded.
    fn settle(ctrl: &mut MovementController<FlatWorld, EventLog>) {
        for _ in 0..10 {
            ctrl.tick(1.0 / 60.0, &idle());
        }
        assert_eq!(ctrl.ability_state(), AbilityState::Grounded);
        ctrl.listener_mut().drain();
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = MovementConfig::default();
        config.jumping.max_jumps = 0;
        let result = MovementController::new(config, FlatWorld::floor(STANDING), checkpoints());
        assert!(matches!(result, Err(ConfigError::MaxJumps { .. })));
    }

    #[test]
    fn standing_character_is_grounded_and_clamped() {
        let mut ctrl = controller(MovementConfig::default(), FlatWorld::floor(STANDING));
        settle(&mut ctrl);
        assert!(ctrl.is_grounded());
        assert_eq!(ctrl.state().vertical_velocity, GROUNDED_VERTICAL_VELOCITY);
        assert_eq!(ctrl.state().position, STANDING);
    }

    #[test]
    fn falling_without_ground_integrates_gravity() {
        let config = MovementConfig::default();
        let mut ctrl = controller(config.clone(), FlatWorld::void(Vector3::new(0.0, 100.0, 0.0)));
        ctrl.tick(0.1, &idle());
        ctrl.tick(0.1, &idle());
        let expected = -config.jumping.gravity * 0.2;
        assert!((ctrl.state().vertical_velocity - expected).abs() < 1.0e-5);
        assert_eq!(ctrl.ability_state(), AbilityState::Airborne);

        for _ in 0..1000 {
            ctrl.tick(0.1, &idle());
        }
        assert_eq!(ctrl.state().vertical_velocity, -config.jumping.max_fall_speed);
    }

    #[test]
    fn double_jump_then_no_op() {
        let config = MovementConfig::default();
        assert_eq!(config.jumping.max_jumps, 2);
        let mut ctrl = controller(config.clone(), FlatWorld::floor(STANDING));
        settle(&mut ctrl);

        let dt = 1.0 / 60.0;
        ctrl.tick(dt, &press(InputAction::Jump));
        assert_eq!(ctrl.jumps_remaining(), 1);
        assert_eq!(ctrl.state().vertical_velocity, config.jumping.jump_speed);
        assert_eq!(ctrl.ability_state(), AbilityState::Airborne);

        ctrl.tick(dt, &press(InputAction::Jump));
        assert_eq!(ctrl.jumps_remaining(), 0);
        assert_eq!(ctrl.state().vertical_velocity, config.jumping.jump_speed);

        let before = ctrl.state().vertical_velocity;
        ctrl.tick(dt, &press(InputAction::Jump));
        assert_eq!(ctrl.jumps_remaining(), 0);
        let gravity_only = before - config.jumping.gravity * dt;
        assert!((ctrl.state().vertical_velocity - gravity_only).abs() < 1.0e-5);

        let jumps = ctrl
            .listener_mut()
            .drain()
            .into_iter()
            .filter(|e| matches!(e, AbilityEvent::Jumped { .. }))
            .count();
        assert_eq!(jumps, 2);
    }

    #[test]
    fn landing_refills_jumps_in_the_same_tick() {
        let mut ctrl = controller(MovementConfig::default(), FlatWorld::floor(STANDING));
        settle(&mut ctrl);
        ctrl.tick(1.0 / 60.0, &press(InputAction::Jump));
        ctrl.tick(1.0 / 60.0, &press(InputAction::Jump));
        assert_eq!(ctrl.jumps_remaining(), 0);

        let mut landed = false;
        for _ in 0..600 {
            let out = ctrl.tick(1.0 / 60.0, &idle());
            if out.ability == AbilityState::Grounded {
                landed = true;
                assert_eq!(ctrl.jumps_remaining(), 2);
                break;
            }
            assert_eq!(ctrl.jumps_remaining(), 0);
        }
        assert!(landed);
        assert!(ctrl.listener().events.contains(&AbilityEvent::Landed));
    }

    #[test]
    fn jumps_stay_in_range_under_random_input() {
        let mut config = MovementConfig::default();
        config.jumping.max_jumps = 3;
        config.dashing.cooldown_seconds = 1;
        let mut ctrl = controller(config, FlatWorld::floor(STANDING));

        // Deterministic pseudo-random input (LCG).
        let mut seed: u32 = 0x1234_5678;
        let mut next = || {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            seed >> 16
        };

        for _ in 0..5_000 {
            let bits = next();
            let mut frame = InputFrame::new(Vector2::new(
                (bits % 7) as f32 / 3.0 - 1.0,
                (bits % 5) as f32 / 2.0 - 1.0,
            ));
            if bits & 0x10 != 0 {
                frame = frame.with_action(InputAction::Jump);
            }
            if bits & 0x60 == 0x60 {
                frame = frame.with_action(InputAction::Dash);
            }
            if bits & 0x180 == 0x180 {
                frame = frame.with_action(InputAction::Slide);
            }
            let dt = [1.0 / 30.0, 1.0 / 60.0, 1.0 / 240.0][(bits % 3) as usize];
            ctrl.tick(dt, &frame);

            assert!(ctrl.jumps_remaining() <= 3);
            assert!(ctrl.state().momentum >= 0.0);
            assert!(ctrl.state().slide_cooldown.remaining() >= 0.0);
            assert_eq!(
                ctrl.state().dash.is_some(),
                ctrl.ability_state() == AbilityState::Dashing
            );
            assert_eq!(
                ctrl.state().slide.is_some(),
                ctrl.ability_state() == AbilityState::Sliding
            );
        }
    }

    #[test]
    fn walking_respects_dead_zone() {
        let mut ctrl = controller(MovementConfig::default(), FlatWorld::floor(STANDING));
        settle(&mut ctrl);

        let yaw = ctrl.state().yaw;
        let out = ctrl.tick(0.1, &InputFrame::new(Vector2::new(0.05, 0.05)));
        assert_eq!(to_planar(out.displacement), Vector2::zeros());
        assert_eq!(ctrl.state().yaw, yaw);

        // Exactly on the threshold still moves.
        let out = ctrl.tick(0.1, &InputFrame::new(Vector2::new(0.0, MOVE_DEAD_ZONE)));
        assert!(to_planar(out.displacement).norm() > 0.0);
    }

    #[test]
    fn walking_is_camera_relative_at_full_speed() {
        let config = MovementConfig::default();
        let mut ctrl = controller(config.clone(), FlatWorld::floor(STANDING));
        settle(&mut ctrl);

        // Stick forward with the camera looking down +X: move along +X.
        let frame = InputFrame::new(Vector2::new(0.0, 0.5)).with_camera_yaw(FRAC_PI_2);
        let out = ctrl.tick(0.1, &frame);
        let expected = config.walking.move_speed * 0.1;
        assert!((out.displacement.x - expected).abs() < 1.0e-5);
        assert!(out.displacement.z.abs() < 1.0e-5);

        // Facing turns toward +X over time.
        for _ in 0..60 {
            ctrl.tick(1.0 / 60.0, &frame);
        }
        assert!((ctrl.state().yaw - FRAC_PI_2).abs() < 1.0e-2);
    }

    #[test]
    fn character_relative_heading_turns_with_the_character() {
        let mut config = MovementConfig::default();
        config.walking.heading_frame = HeadingFrame::Character;
        let mut ctrl = controller(config, FlatWorld::floor(STANDING)).with_yaw(FRAC_PI_2);
        settle(&mut ctrl);

        // Forward input moves along the character's own facing, ignoring the camera.
        let frame = InputFrame::new(Vector2::new(0.0, 1.0)).with_camera_yaw(3.0);
        let out = ctrl.tick(0.1, &frame);
        assert!(out.displacement.x > 0.0);
        assert!(out.displacement.z.abs() < 1.0e-5);
    }

    #[test]
    fn dash_completes_after_five_ticks() {
        let config = MovementConfig {
            dashing: DashingConfig {
                distance: 5.0,
                speed: 10.0,
                ..DashingConfig::default()
            },
            ..MovementConfig::default()
        };
        let mut ctrl = controller(config, FlatWorld::void(Vector3::new(0.0, 50.0, 0.0)));
        let start = ctrl.state().position;

        ctrl.tick(0.1, &press(InputAction::Dash));
        assert!(ctrl.is_dashing());
        let mut ticks = 1;
        while ctrl.is_dashing() {
            ctrl.tick(0.1, &idle());
            ticks += 1;
            assert!(ticks <= 10, "dash never ended");
        }
        assert_eq!(ticks, 5);
        assert!((planar_distance(start, ctrl.state().position) - 5.0).abs() < 1.0e-4);
    }

    fn dash_travel(dt: f32) -> f32 {
        let mut ctrl = controller(
            MovementConfig::default(),
            FlatWorld::void(Vector3::new(0.0, 100.0, 0.0)),
        )
        .with_yaw(0.7);
        let start = ctrl.state().position;
        ctrl.tick(dt, &press(InputAction::Dash));
        while ctrl.is_dashing() {
            ctrl.tick(dt, &idle());
        }
        planar_distance(start, ctrl.state().position)
    }

    #[test]
    fn dash_distance_is_independent_of_tick_rate() {
        let coarse = dash_travel(1.0 / 30.0);
        let fine = dash_travel(1.0 / 240.0);
        let expected = MovementConfig::default().dashing.distance;
        assert!((coarse - expected).abs() < 1.0e-3, "coarse: {coarse}");
        assert!((fine - expected).abs() < 1.0e-3, "fine: {fine}");
    }

    #[test]
    fn dash_zeroes_vertical_velocity_and_refills_jumps() {
        let mut ctrl = controller(MovementConfig::default(), FlatWorld::floor(STANDING));
        settle(&mut ctrl);
        ctrl.tick(1.0 / 60.0, &press(InputAction::Jump));
        ctrl.tick(1.0 / 60.0, &press(InputAction::Jump));
        assert_eq!(ctrl.jumps_remaining(), 0);

        ctrl.tick(1.0 / 60.0, &press(InputAction::Dash));
        assert!(ctrl.is_dashing());
        assert_eq!(ctrl.state().vertical_velocity, 0.0);
        assert_eq!(ctrl.jumps_remaining(), 2);
        assert!(!ctrl.can_dash());
    }

    #[test]
    fn dash_cooldown_elapses_by_time() {
        let mut config = MovementConfig::default();
        config.dashing.cooldown_seconds = 2;
        let mut ctrl = controller(config, FlatWorld::void(Vector3::new(0.0, 1.0e4, 0.0)));

        ctrl.tick(0.1, &press(InputAction::Dash));
        assert!(!ctrl.can_dash());
        assert_eq!(ctrl.dash_seconds_remaining(), 2);

        // 1.9s of further ticks: one whole second drained.
        for _ in 0..19 {
            ctrl.tick(0.1, &idle());
        }
        assert_eq!(ctrl.dash_seconds_remaining(), 1);
        assert!(!ctrl.can_dash());

        for _ in 0..2 {
            ctrl.tick(0.1, &idle());
        }
        assert!(ctrl.can_dash());
        assert_eq!(ctrl.dash_seconds_remaining(), 0);
    }

    #[test]
    fn landing_refreshes_dash_cooldown() {
        let mut config = MovementConfig::default();
        config.dashing.cooldown_seconds = 30;
        let mut ctrl = controller(config, FlatWorld::floor(Vector3::new(0.0, 10.0, 0.0)));

        ctrl.tick(1.0 / 60.0, &press(InputAction::Dash));
        assert!(!ctrl.can_dash());

        let mut elapsed = 0.0;
        while ctrl.ability_state() != AbilityState::Grounded {
            ctrl.tick(1.0 / 60.0, &idle());
            elapsed += 1.0 / 60.0;
            assert!(elapsed < 10.0, "never landed");
        }
        assert!(ctrl.can_dash());
        assert_eq!(ctrl.dash_seconds_remaining(), 0);
    }

    #[test]
    fn dash_blocked_by_wall_still_ends() {
        let mut world = FlatWorld::void(Vector3::new(0.0, 100.0, 0.0));
        world.wall_x = Some(1.0);
        let config = MovementConfig::default();
        let mut ctrl = controller(config.clone(), world).with_yaw(FRAC_PI_2);

        ctrl.tick(1.0 / 60.0, &press(InputAction::Dash));
        let mut ticks = 0;
        while ctrl.is_dashing() {
            ctrl.tick(1.0 / 60.0, &idle());
            ticks += 1;
            assert!(ticks < 600, "dash locked the character");
        }
        let nominal = config.dashing.distance / config.dashing.speed;
        assert!(ticks as f32 / 60.0 <= nominal * config.dashing.max_duration_factor + 0.05);
        assert!((ctrl.state().position.x - 1.0).abs() < 1.0e-5);
    }

    #[test]
    fn landing_mid_dash_refreshes_when_dash_ends() {
        let mut config = MovementConfig::default();
        config.dashing.cooldown_seconds = 30;
        config.dashing.speed = 5.0;
        let mut ctrl = controller(config, FlatWorld::void(STANDING));
        let dt = 1.0 / 60.0;

        ctrl.tick(dt, &press(InputAction::Dash));
        for _ in 0..3 {
            ctrl.tick(dt, &idle());
        }

        // Skim a platform for a few ticks, then dash off its edge.
        ctrl.world_mut().ground_y = Some(0.0);
        let mut touched = false;
        for _ in 0..5 {
            touched |= ctrl.tick(dt, &idle()).grounded;
        }
        ctrl.world_mut().ground_y = None;
        assert!(touched);
        assert!(ctrl.is_dashing());
        assert!(!ctrl.can_dash());

        while ctrl.is_dashing() {
            ctrl.tick(dt, &idle());
        }
        assert!(!ctrl.is_grounded());
        assert!(ctrl.can_dash());
        assert_eq!(ctrl.dash_seconds_remaining(), 0);
    }

    #[test]
    fn dash_without_landing_keeps_cooldown() {
        let mut config = MovementConfig::default();
        config.dashing.cooldown_seconds = 30;
        let mut ctrl = controller(config, FlatWorld::void(Vector3::new(0.0, 100.0, 0.0)));

        ctrl.tick(1.0 / 60.0, &press(InputAction::Dash));
        while ctrl.is_dashing() {
            ctrl.tick(1.0 / 60.0, &idle());
        }
        assert!(!ctrl.can_dash());
        assert_eq!(ctrl.dash_seconds_remaining(), 30);
    }

    #[test]
    fn slide_blocked_by_wall_still_ends() {
        let mut world = FlatWorld::floor(STANDING);
        world.wall_x = Some(1.0);
        let config = MovementConfig::default();
        let mut ctrl = controller(config.clone(), world).with_yaw(FRAC_PI_2);
        settle(&mut ctrl);

        ctrl.tick(1.0 / 60.0, &press(InputAction::Slide));
        assert_eq!(ctrl.ability_state(), AbilityState::Sliding);
        let mut ticks = 0;
        while ctrl.ability_state() == AbilityState::Sliding {
            ctrl.tick(1.0 / 60.0, &idle());
            ticks += 1;
            assert!(ticks < 600, "slide locked the character");
        }

        let nominal = config.sliding.distance / config.sliding.speed;
        assert!(ticks as f32 / 60.0 <= nominal * config.sliding.max_duration_factor + 0.05);
        assert_eq!(ctrl.ability_state(), AbilityState::Grounded);
        assert_eq!(ctrl.momentum(), 0.0);
        assert!(ctrl.state().slide.is_none());
        assert!((ctrl.state().position.x - 1.0).abs() < 1.0e-5);
        assert!(ctrl.listener().events.contains(&AbilityEvent::SlideEnded));
    }

    #[test]
    fn slide_requires_ground_and_ends_at_distance() {
        let config = MovementConfig::default();
        let mut ctrl = controller(config.clone(), FlatWorld::void(Vector3::new(0.0, 50.0, 0.0)));
        ctrl.tick(0.1, &press(InputAction::Slide));
        assert_eq!(ctrl.ability_state(), AbilityState::Airborne);

        let mut ctrl = controller(config.clone(), FlatWorld::floor(STANDING));
        settle(&mut ctrl);
        let start = ctrl.state().position;
        ctrl.tick(0.1, &press(InputAction::Slide));
        assert_eq!(ctrl.ability_state(), AbilityState::Sliding);
        assert!(!ctrl.can_slide());

        let mut last_momentum = ctrl.momentum();
        assert!(last_momentum > 0.0);
        while ctrl.ability_state() == AbilityState::Sliding {
            ctrl.tick(0.1, &idle());
            if ctrl.ability_state() == AbilityState::Sliding {
                assert!(ctrl.momentum() >= last_momentum);
                assert!(ctrl.momentum() <= config.sliding.momentum_cap);
                last_momentum = ctrl.momentum();
            }
        }
        assert_eq!(ctrl.ability_state(), AbilityState::Grounded);
        assert_eq!(ctrl.momentum(), 0.0);
        let travelled = planar_distance(start, ctrl.state().position);
        assert!((travelled - config.sliding.distance).abs() < 1.0e-3);
        assert!(ctrl.listener().events.contains(&AbilityEvent::SlideEnded));
    }

    #[test]
    fn slide_steering_bends_the_path() {
        let mut ctrl = controller(MovementConfig::default(), FlatWorld::floor(STANDING));
        settle(&mut ctrl);
        ctrl.tick(0.1, &press(InputAction::Slide));
        ctrl.tick(0.1, &InputFrame::new(Vector2::new(1.0, 0.0)));
        // Facing +Z with +X on the right.
        assert!(ctrl.state().position.x > 0.0);
        assert!(ctrl.state().position.z > 0.0);
    }

    #[test]
    fn jump_while_sliding_folds_momentum_into_jump() {
        let config = MovementConfig::default();
        let mut ctrl = controller(config.clone(), FlatWorld::floor(STANDING));
        settle(&mut ctrl);

        ctrl.tick(0.1, &press(InputAction::Slide));
        ctrl.tick(0.1, &idle());
        let momentum = ctrl.momentum();
        assert!(momentum > 0.0);
        assert_eq!(ctrl.ability_state(), AbilityState::Sliding);

        ctrl.tick(0.1, &press(InputAction::Jump));
        assert_eq!(ctrl.ability_state(), AbilityState::Airborne);
        assert!(
            (ctrl.state().vertical_velocity - (config.jumping.jump_speed + momentum)).abs()
                < 1.0e-5
        );
        assert_eq!(ctrl.momentum(), 0.0);
        assert!(ctrl.state().slide.is_none());

        let events = ctrl.listener_mut().drain();
        assert!(events.contains(&AbilityEvent::SlideEnded));
        assert!(!events.contains(&AbilityEvent::Fell));
    }

    #[test]
    fn dash_while_sliding_adds_momentum_to_distance() {
        let config = MovementConfig::default();
        let mut ctrl = controller(config.clone(), FlatWorld::floor(STANDING));
        settle(&mut ctrl);

        ctrl.tick(0.1, &press(InputAction::Slide));
        ctrl.tick(0.1, &idle());
        let momentum = ctrl.momentum();
        assert!(momentum > 0.0);

        // Dash and slide both pressed: dash wins.
        let frame = press(InputAction::Dash).with_action(InputAction::Slide);
        ctrl.tick(0.1, &frame);
        assert!(ctrl.is_dashing());
        assert_eq!(ctrl.momentum(), 0.0);
        let dash = ctrl.state().dash.unwrap();
        assert!((dash.distance - (config.dashing.distance + momentum)).abs() < 1.0e-5);

        let start = dash.start;
        while ctrl.is_dashing() {
            ctrl.tick(0.1, &idle());
        }
        let travelled = planar_distance(start, ctrl.state().position);
        assert!((travelled - (config.dashing.distance + momentum)).abs() < 1.0e-3);

        let events = ctrl.listener_mut().drain();
        let slide_end = events.iter().position(|e| *e == AbilityEvent::SlideEnded);
        let dash_start = events
            .iter()
            .position(|e| matches!(e, AbilityEvent::DashStarted { .. }));
        assert!(slide_end.unwrap() < dash_start.unwrap());
    }

    #[test]
    fn kill_respawns_at_active_checkpoint() {
        let mut ctrl = controller(
            MovementConfig::default(),
            FlatWorld::void(Vector3::new(-5.0, -50.0, 3.0)),
        );
        ctrl.checkpoints_mut().update_active(2).unwrap();
        for _ in 0..10 {
            ctrl.tick(0.1, &idle());
        }
        assert!(ctrl.state().vertical_velocity < 0.0);

        let out = ctrl.tick(0.1, &press(InputAction::Kill));
        let spawn = ctrl.checkpoints().get(2).unwrap().spawn();
        assert_eq!(out.position, spawn.position);
        assert_eq!(out.displacement, Vector3::zeros());
        assert_eq!(ctrl.state().position, spawn.position);
        assert!((ctrl.state().yaw - spawn.yaw).abs() < 1.0e-6);
        assert!(ctrl.state().vertical_velocity >= 0.0);
        assert!(ctrl.world().collision_enabled());
        assert_eq!(ctrl.world().teleports, 1);
        assert!(
            ctrl.listener()
                .events
                .contains(&AbilityEvent::Respawned { checkpoint: 2 })
        );
    }

    #[test]
    fn respawn_cancels_abilities() {
        let mut ctrl = controller(MovementConfig::default(), FlatWorld::floor(STANDING));
        settle(&mut ctrl);
        ctrl.tick(0.1, &press(InputAction::Slide));
        ctrl.tick(0.1, &idle());
        assert_eq!(ctrl.ability_state(), AbilityState::Sliding);

        ctrl.listener_mut().drain();

        ctrl.respawn().unwrap();
        assert_eq!(ctrl.ability_state(), AbilityState::Airborne);
        assert_eq!(ctrl.momentum(), 0.0);
        assert!(ctrl.state().slide.is_none());
        assert!(ctrl.can_slide());
        assert!(ctrl.can_dash());
        assert_eq!(
            ctrl.listener_mut().drain(),
            vec![
                AbilityEvent::SlideEnded,
                AbilityEvent::Respawned { checkpoint: 0 }
            ]
        );
    }

    #[test]
    fn kill_mid_dash_ends_the_dash() {
        let mut ctrl = controller(
            MovementConfig::default(),
            FlatWorld::void(Vector3::new(0.0, 100.0, 0.0)),
        );
        ctrl.tick(1.0 / 60.0, &press(InputAction::Dash));
        assert!(ctrl.is_dashing());
        ctrl.listener_mut().drain();

        ctrl.tick(1.0 / 60.0, &press(InputAction::Kill));
        assert!(!ctrl.is_dashing());
        assert!(ctrl.state().dash.is_none());
        assert_eq!(
            ctrl.listener_mut().drain(),
            vec![
                AbilityEvent::DashEnded,
                AbilityEvent::Respawned { checkpoint: 0 }
            ]
        );
    }

    #[test]
    fn kill_with_no_checkpoints_keeps_simulating() {
        let mut ctrl = MovementController::new(
            MovementConfig::default(),
            FlatWorld::void(Vector3::new(0.0, 10.0, 0.0)),
            CheckpointCoordinator::new(std::iter::empty()),
        )
        .unwrap();

        assert_eq!(ctrl.respawn(), Err(CheckpointError::Empty));
        let out = ctrl.tick(0.1, &press(InputAction::Kill));
        assert!(out.position.y < 10.0);
        assert_eq!(ctrl.world().teleports, 0);
    }

    #[test]
    fn lethal_damage_refills_hp_and_respawns() {
        let config = MovementConfig {
            health: Some(HealthConfig { max_hp: 3 }),
            ..MovementConfig::default()
        };
        let mut ctrl = controller(config, FlatWorld::floor(Vector3::new(7.0, 1.0, 7.0)));
        ctrl.checkpoints_mut().update_active(1).unwrap();

        assert!(!ctrl.take_damage(1));
        assert_eq!(ctrl.health().unwrap().current(), 2);
        assert!((ctrl.damage_overlay_alpha() - 1.0 / 3.0).abs() < 1.0e-6);

        assert!(ctrl.take_damage(5));
        assert_eq!(ctrl.health().unwrap().current(), 3);
        assert_eq!(ctrl.damage_overlay_alpha(), 0.0);
        assert_eq!(
            ctrl.state().position,
            ctrl.checkpoints().get(1).unwrap().spawn().position
        );
        assert!(
            ctrl.listener()
                .events
                .contains(&AbilityEvent::Damaged { hp: 0 })
        );
    }

    #[test]
    fn damage_without_hit_points_is_ignored() {
        let mut ctrl = controller(MovementConfig::default(), FlatWorld::floor(STANDING));
        assert!(!ctrl.take_damage(100));
        assert!(ctrl.health().is_none());
        assert_eq!(ctrl.damage_overlay_alpha(), 0.0);
        assert!(ctrl.listener().events.is_empty());
    }

    #[test]
    fn reset_dash_allows_immediate_redash() {
        let mut config = MovementConfig::default();
        config.dashing.cooldown_seconds = 10;
        let mut ctrl = controller(config, FlatWorld::void(Vector3::new(0.0, 100.0, 0.0)));

        ctrl.tick(0.1, &press(InputAction::Dash));
        while ctrl.is_dashing() {
            ctrl.tick(0.1, &idle());
        }
        assert!(!ctrl.can_dash());

        ctrl.reset_dash();
        assert!(ctrl.can_dash());
        ctrl.tick(0.1, &press(InputAction::Dash));
        assert!(ctrl.is_dashing());
    }

    #[test]
    fn walking_off_a_ledge_emits_fell() {
        let mut ctrl = controller(MovementConfig::default(), FlatWorld::floor(STANDING));
        settle(&mut ctrl);

        ctrl.world_mut().ground_y = None;
        ctrl.tick(1.0 / 60.0, &idle());
        assert_eq!(ctrl.ability_state(), AbilityState::Airborne);
        assert_eq!(ctrl.listener_mut().drain(), vec![AbilityEvent::Fell]);
    }

    #[test]
    fn listener_receives_speed_and_grounded() {
        let config = MovementConfig::default();
        let mut ctrl = controller(config.clone(), FlatWorld::floor(STANDING));
        settle(&mut ctrl);
        ctrl.tick(0.1, &InputFrame::new(Vector2::new(0.0, 1.0)));
        assert!(ctrl.listener().grounded);
        assert!((ctrl.listener().speed - config.walking.move_speed).abs() < 1.0e-3);
    }

    #[test]
    fn negative_dt_is_treated_as_zero() {
        let mut ctrl = controller(MovementConfig::default(), FlatWorld::floor(STANDING));
        settle(&mut ctrl);
        let before = ctrl.state().position;
        let out = ctrl.tick(-1.0, &InputFrame::new(Vector2::new(0.0, 1.0)));
        assert_eq!(out.position, before);
    }
}
