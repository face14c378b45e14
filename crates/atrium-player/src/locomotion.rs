//! First-person locomotion: look, crouch, momentum, jump, lean, head bob,
//! and footstep cadence over the kinematic avatar capsule.

use atrium_config::{InputConfig, MovementConfig};
use atrium_input::{Action, ActionState};
use atrium_physics::{AvatarBody, PhysicsWorld};
use glam::{Quat, Vec2, Vec3};

use crate::camera::CameraPose;
use crate::look::LookSuppression;
use crate::smoothing::{smooth_damp, smooth_damp_vec3};

/// Downward velocity applied while grounded so the capsule stays seated
/// on ramps and steps instead of ticking between airborne and grounded.
const GROUND_STICK_VELOCITY: f32 = -2.0;

/// Realized-speed factor bounds for footstep cadence. Keeps the interval
/// finite when creeping and prevents runaway cadence at high speed.
const STEP_FACTOR_MIN: f32 = 0.05;
const STEP_FACTOR_MAX: f32 = 2.0;

/// Movement style for the current footstep, so the audio layer can pick
/// a matching clip set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gait {
    Walk,
    Sprint,
    Crouch,
}

/// Events emitted by [`LocomotionController::update`], drained each frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocomotionEvent {
    /// A footstep landed at the cadence for the given gait.
    Footstep(Gait),
    /// The avatar left the ground from a jump input.
    Jumped,
    /// The avatar touched down after being airborne.
    Landed,
}

/// Per-frame driver of the avatar capsule and the derived camera pose.
pub struct LocomotionController {
    movement: MovementConfig,
    /// Gate for menu integration. While false the controller holds the
    /// avatar still and sheds any smoothed momentum.
    pub enabled: bool,
    look: LookSuppression,
    mouse_sensitivity: f32,
    invert_y: bool,

    yaw: f32,
    pitch: f32,
    vertical_velocity: f32,
    horizontal_velocity: Vec3,
    horizontal_damp_velocity: Vec3,
    height_damp_velocity: f32,
    eye_height: f32,
    eye_damp_velocity: f32,
    grounded: bool,
    was_grounded: bool,

    lean_rotation: Quat,
    bob_timer: f32,
    bob_offset: Vec3,
    bob_damp_velocity: Vec3,
    footstep_timer: f32,
    was_moving: bool,
    last_position: Option<Vec3>,

    warned_missing_body: bool,
    events: Vec<LocomotionEvent>,
}

impl LocomotionController {
    pub fn new(movement: MovementConfig, input: &InputConfig, look: LookSuppression) -> Self {
        let eye_height = movement.standing_height - movement.eye_drop;
        Self {
            movement,
            enabled: true,
            look,
            mouse_sensitivity: input.mouse_sensitivity,
            invert_y: input.invert_y,
            yaw: 0.0,
            pitch: 0.0,
            vertical_velocity: 0.0,
            horizontal_velocity: Vec3::ZERO,
            horizontal_damp_velocity: Vec3::ZERO,
            height_damp_velocity: 0.0,
            eye_height,
            eye_damp_velocity: 0.0,
            grounded: false,
            was_grounded: false,
            lean_rotation: Quat::IDENTITY,
            bob_timer: 0.0,
            bob_offset: Vec3::ZERO,
            bob_damp_velocity: Vec3::ZERO,
            footstep_timer: 0.0,
            was_moving: false,
            last_position: None,
            warned_missing_body: false,
            events: Vec::new(),
        }
    }

    /// Yaw in degrees, unclamped accumulation.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Pitch in degrees, positive looks up, clamped to [-89, 89].
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn grounded(&self) -> bool {
        self.grounded
    }

    pub fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    pub fn set_mouse_sensitivity(&mut self, sensitivity: f32) {
        self.mouse_sensitivity = sensitivity;
    }

    /// Runs one frame of locomotion in fixed order: look, crouch height,
    /// horizontal/vertical integration, capsule move plus ground
    /// correction, lean, head bob, footsteps. Returns the events raised
    /// this frame.
    pub fn update(
        &mut self,
        world: &mut PhysicsWorld,
        avatar: &mut AvatarBody,
        actions: &ActionState,
        mouse_delta: Vec2,
        dt: f32,
    ) -> &[LocomotionEvent] {
        self.events.clear();

        if world.rigid_body_set.get(avatar.body_handle()).is_none() {
            if !self.warned_missing_body {
                tracing::warn!("avatar body missing from physics world, locomotion idle");
                self.warned_missing_body = true;
            }
            return &self.events;
        }
        self.warned_missing_body = false;

        if !self.enabled {
            // Shed momentum so movement does not resume with stale speed.
            self.horizontal_velocity = Vec3::ZERO;
            self.horizontal_damp_velocity = Vec3::ZERO;
            self.last_position = Some(avatar.position(world));
            return &self.events;
        }

        self.apply_look(mouse_delta);
        self.update_height(world, avatar, actions, dt);
        self.integrate_and_move(world, avatar, actions, dt);
        self.update_lean(actions, dt);
        self.update_head_bob(actions, dt);
        self.update_footsteps(world, avatar, actions, dt);

        self.last_position = Some(avatar.position(world));
        &self.events
    }

    /// Camera pose for this frame: eye point above the feet plus the bob
    /// offset in body space, oriented by yaw, lean, and pitch.
    pub fn camera_pose(&self, world: &PhysicsWorld, avatar: &AvatarBody) -> CameraPose {
        let body_rotation = Quat::from_rotation_y(-self.yaw.to_radians());
        let center = avatar.position(world);
        let eye = Vec3::new(center.x, avatar.feet_y(world) + self.eye_height, center.z);
        CameraPose {
            position: eye + body_rotation * self.bob_offset,
            rotation: body_rotation
                * self.lean_rotation
                * Quat::from_rotation_x(self.pitch.to_radians()),
        }
    }

    fn apply_look(&mut self, mouse_delta: Vec2) {
        if self.look.is_suppressed() {
            return;
        }
        let dy = if self.invert_y {
            -mouse_delta.y
        } else {
            mouse_delta.y
        };
        self.yaw += mouse_delta.x * self.mouse_sensitivity;
        self.pitch = (self.pitch - dy * self.mouse_sensitivity).clamp(-89.0, 89.0);
    }

    fn update_height(
        &mut self,
        world: &mut PhysicsWorld,
        avatar: &mut AvatarBody,
        actions: &ActionState,
        dt: f32,
    ) {
        let cfg = &self.movement;
        let want_crouch = actions.is_active(Action::Crouch);
        let current = avatar.height();

        let mut target = if want_crouch {
            cfg.crouch_height
        } else {
            cfg.standing_height
        };
        if !want_crouch
            && current < cfg.standing_height
            && avatar.stand_clearance_blocked(world, cfg.standing_height)
        {
            // Ceiling overhead: hold the current height until it clears.
            target = current;
        }

        let next = smooth_damp(
            current,
            target,
            &mut self.height_damp_velocity,
            cfg.height_smooth_time,
            dt,
        )
        .clamp(cfg.crouch_height, cfg.standing_height);
        avatar.set_height(world, next);

        let eye_target = next - cfg.eye_drop;
        self.eye_height = smooth_damp(
            self.eye_height,
            eye_target,
            &mut self.eye_damp_velocity,
            cfg.height_smooth_time,
            dt,
        );
    }

    fn integrate_and_move(
        &mut self,
        world: &mut PhysicsWorld,
        avatar: &mut AvatarBody,
        actions: &ActionState,
        dt: f32,
    ) {
        let cfg = &self.movement;

        let mut input = Vec3::ZERO;
        if actions.is_active(Action::MoveForward) {
            input.z += 1.0;
        }
        if actions.is_active(Action::MoveBack) {
            input.z -= 1.0;
        }
        if actions.is_active(Action::MoveRight) {
            input.x += 1.0;
        }
        if actions.is_active(Action::MoveLeft) {
            input.x -= 1.0;
        }
        let input = input.clamp_length_max(1.0);

        let sprinting = actions.is_active(Action::Sprint);
        let crouching = actions.is_active(Action::Crouch);
        let target_speed = if crouching {
            cfg.crouch_speed
        } else if sprinting {
            cfg.sprint_speed
        } else {
            cfg.walk_speed
        };

        let moving_input = input.length_squared() > 1e-4;
        let desired = if moving_input {
            let local = input.normalize();
            let body_rotation = Quat::from_rotation_y(-self.yaw.to_radians());
            body_rotation * Vec3::new(local.x, 0.0, -local.z) * target_speed
        } else {
            Vec3::ZERO
        };

        let smooth_time = if moving_input {
            cfg.accel_time
        } else {
            cfg.decel_time
        };
        self.horizontal_velocity = smooth_damp_vec3(
            self.horizontal_velocity,
            desired,
            &mut self.horizontal_damp_velocity,
            smooth_time,
            dt,
        );

        if self.grounded && self.vertical_velocity < 0.0 {
            self.vertical_velocity = GROUND_STICK_VELOCITY;
        }
        if actions.just_activated(Action::Jump) && self.grounded {
            self.vertical_velocity = (2.0 * cfg.jump_height * -cfg.gravity).sqrt();
            self.events.push(LocomotionEvent::Jumped);
            self.was_grounded = false;
        }
        self.vertical_velocity =
            (self.vertical_velocity + cfg.gravity * dt).max(cfg.max_fall_speed);

        let velocity = self.horizontal_velocity + Vec3::Y * self.vertical_velocity;
        let outcome = avatar.move_by(world, velocity * dt, dt);
        self.grounded = outcome.grounded;

        avatar.resolve_ground_penetration(world);

        if !self.was_grounded && self.grounded {
            self.events.push(LocomotionEvent::Landed);
        }
        self.was_grounded = self.grounded;
    }

    fn update_lean(&mut self, actions: &ActionState, dt: f32) {
        let target_angle = if actions.is_active(Action::Lean) {
            self.movement.lean_angle
        } else {
            0.0
        };
        // Forward bow, so negative rotation about local X (positive is up).
        let target = Quat::from_rotation_x(-target_angle.to_radians());
        let t = (dt * self.movement.lean_speed).min(1.0);
        self.lean_rotation = self.lean_rotation.slerp(target, t);
    }

    fn update_head_bob(&mut self, actions: &ActionState, dt: f32) {
        let cfg = &self.movement;
        if !cfg.enable_head_bob {
            return;
        }
        let return_time = 1.0 / cfg.bob_smoothness.max(1e-4);

        let crouching = actions.is_active(Action::Crouch);
        let horizontal_speed = self
            .horizontal_velocity
            .with_y(0.0)
            .length();
        let moving = self.grounded && horizontal_speed > cfg.move_threshold;

        if (cfg.disable_bob_on_crouch && crouching) || !moving {
            self.bob_offset = smooth_damp_vec3(
                self.bob_offset,
                Vec3::ZERO,
                &mut self.bob_damp_velocity,
                return_time,
                dt,
            );
            self.bob_timer = 0.0;
            return;
        }

        let sprinting = actions.is_active(Action::Sprint);
        let (frequency, amplitude, reference_speed) = if sprinting {
            (cfg.sprint_bob_frequency, cfg.sprint_bob_height, cfg.sprint_speed)
        } else {
            (cfg.walk_bob_frequency, cfg.walk_bob_height, cfg.walk_speed)
        };
        let speed_factor = (horizontal_speed / reference_speed.max(0.01)).clamp(0.0, 1.0);

        self.bob_timer += dt * frequency * (0.5 + 0.5 * speed_factor);
        let phase = self.bob_timer * std::f32::consts::TAU;
        let target = Vec3::new(
            phase.cos() * cfg.bob_sway_amount * (0.2 + 0.8 * speed_factor),
            phase.sin() * amplitude * (0.5 + 0.5 * speed_factor),
            0.0,
        );
        self.bob_offset = smooth_damp_vec3(
            self.bob_offset,
            target,
            &mut self.bob_damp_velocity,
            return_time,
            dt,
        );
    }

    fn update_footsteps(
        &mut self,
        world: &PhysicsWorld,
        avatar: &AvatarBody,
        actions: &ActionState,
        dt: f32,
    ) {
        let cfg = &self.movement;
        let position = avatar.position(world);
        let delta = position - self.last_position.unwrap_or(position);
        let realized_speed = delta.with_y(0.0).length() / dt.max(1e-6);
        let moving = self.grounded && realized_speed > cfg.move_threshold;

        let sprinting = actions.is_active(Action::Sprint);
        let crouching = actions.is_active(Action::Crouch);
        let (gait, base_interval, reference_speed) = if sprinting {
            (Gait::Sprint, cfg.sprint_step_interval, cfg.sprint_speed)
        } else if crouching {
            (Gait::Crouch, cfg.crouch_step_interval, cfg.crouch_speed)
        } else {
            (Gait::Walk, cfg.walk_step_interval, cfg.walk_speed)
        };

        // Half-interval warm start so the first step is not a full
        // interval late.
        if !self.was_moving && moving {
            self.footstep_timer = base_interval * 0.5;
        }
        if !moving {
            self.footstep_timer = 0.0;
            self.was_moving = false;
            return;
        }

        let speed_factor = (realized_speed / reference_speed.max(0.01))
            .clamp(STEP_FACTOR_MIN, STEP_FACTOR_MAX);
        let interval = base_interval / speed_factor;

        self.footstep_timer -= dt;
        if self.footstep_timer <= 0.0 {
            self.events.push(LocomotionEvent::Footstep(gait));
            self.footstep_timer = interval;
        }
        self.was_moving = true;
    }
}
