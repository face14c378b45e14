//! Pick up, carry, rotate, and throw dynamic bodies.
//!
//! The controller never owns the held body; it keeps a handle into the
//! physics world and treats an externally removed body as an implicit
//! release. Position tracking is a proportional velocity drive toward a
//! camera-relative hold point, run at the fixed physics rate so it stays
//! stable under variable frame rates.

use atrium_config::CarryConfig;
use atrium_input::{Action, ActionState};
use atrium_physics::{to_quat, to_rotation, to_vec3, to_vector, PhysicsWorld};
use glam::{Quat, Vec2, Vec3};
use rapier3d::prelude::RigidBodyHandle;

use crate::camera::CameraPose;
use crate::look::LookSuppression;

/// State for the body currently in hand. At most one exists per controller.
struct HeldObject {
    body: RigidBodyHandle,
    /// Grab point in the body's local frame, recorded at pick-up.
    grab_offset: Vec3,
    /// Orientation the body is steered toward when not manually rotated.
    held_rotation: Quat,
    /// Orientation snapshot the manual-rotate deltas compose on top of.
    initial_rotation: Quat,
    rotating: bool,
    rotate_yaw: f32,
    rotate_pitch: f32,
}

/// Frame and physics-rate driver for carrying objects.
pub struct CarryController {
    config: CarryConfig,
    /// Gate for menu integration; while false all carry input is ignored.
    pub enabled: bool,
    look: LookSuppression,
    held: Option<HeldObject>,
}

impl CarryController {
    pub fn new(config: CarryConfig, look: LookSuppression) -> Self {
        Self {
            config,
            enabled: true,
            look,
            held: None,
        }
    }

    /// Handle of the body currently held, if any.
    pub fn held_body(&self) -> Option<RigidBodyHandle> {
        self.held.as_ref().map(|h| h.body)
    }

    pub fn is_rotating(&self) -> bool {
        self.held.as_ref().is_some_and(|h| h.rotating)
    }

    /// Per-frame input handling: pick up / release / throw edges and the
    /// manual-rotate hold. `avatar_body` is excluded from pick-up rays.
    pub fn update(
        &mut self,
        world: &mut PhysicsWorld,
        camera: &CameraPose,
        actions: &ActionState,
        mouse_delta: Vec2,
        avatar_body: RigidBodyHandle,
    ) {
        if !self.enabled {
            return;
        }
        self.release_if_stale(world);

        if actions.just_activated(Action::PickUp) {
            if self.held.is_some() {
                self.release(world, camera, false);
            } else {
                self.try_pick_up(world, camera, avatar_body);
            }
        }
        if self.held.is_some() && actions.just_activated(Action::Throw) {
            self.release(world, camera, true);
        }
        if self.held.is_some() {
            if actions.just_activated(Action::RotateHeld) {
                self.start_rotate(world);
            }
            if actions.is_active(Action::RotateHeld) {
                self.update_rotate(world, mouse_delta);
            }
            if actions.just_deactivated(Action::RotateHeld) {
                self.stop_rotate();
            }
        }
    }

    /// Fixed-rate drive of the held body toward the camera-relative hold
    /// point, plus orientation steering while not manually rotating.
    pub fn fixed_step(&mut self, world: &mut PhysicsWorld, camera: &CameraPose) {
        self.release_if_stale(world);
        let Some(held) = &self.held else {
            return;
        };
        let dt = world.timestep();
        let Some(body) = world.rigid_body_set.get_mut(held.body) else {
            return;
        };

        let target = camera.position
            + camera.forward() * self.config.hold_distance
            + camera.rotation * held.grab_offset;
        let to_target = target - to_vec3(body.translation());
        body.set_linvel(to_vector(to_target * self.config.hold_gain * dt), true);

        if !held.rotating {
            let current = to_quat(body.rotation());
            let t = (self.config.hold_rotate_speed * dt).min(1.0);
            let next = current.slerp(held.held_rotation, t);
            body.set_rotation(to_rotation(next), true);
        }
    }

    fn try_pick_up(
        &mut self,
        world: &mut PhysicsWorld,
        camera: &CameraPose,
        avatar_body: RigidBodyHandle,
    ) {
        let Some(hit) = world.cast_ray_pickable(
            camera.position,
            camera.forward(),
            self.config.pickup_range,
            Some(avatar_body),
        ) else {
            return;
        };
        let Some(body_handle) = hit.body else {
            return;
        };
        let Some(body) = world.rigid_body_set.get_mut(body_handle) else {
            return;
        };
        if !body.is_dynamic() {
            return;
        }

        let rotation = to_quat(body.rotation());
        let position = to_vec3(body.translation());
        body.set_linear_damping(self.config.held_linear_damping);
        body.set_angular_damping(self.config.held_angular_damping);

        tracing::debug!(?body_handle, point = ?hit.point, "picked up body");
        self.held = Some(HeldObject {
            body: body_handle,
            grab_offset: rotation.inverse() * (hit.point - position),
            held_rotation: rotation,
            initial_rotation: rotation,
            rotating: false,
            rotate_yaw: 0.0,
            rotate_pitch: 0.0,
        });
    }

    fn release(&mut self, world: &mut PhysicsWorld, camera: &CameraPose, with_throw: bool) {
        let Some(held) = self.held.take() else {
            return;
        };
        if let Some(body) = world.rigid_body_set.get_mut(held.body) {
            body.set_linear_damping(self.config.released_damping);
            body.set_angular_damping(self.config.released_damping);
            if with_throw {
                body.set_linvel(to_vector(Vec3::ZERO), true);
                let impulse = camera.forward() * self.config.throw_speed * body.mass();
                body.apply_impulse(to_vector(impulse), true);
            }
        }
        tracing::debug!(body = ?held.body, with_throw, "released body");
        self.look.suppress(false);
    }

    fn start_rotate(&mut self, world: &PhysicsWorld) {
        let Some(held) = &mut self.held else {
            return;
        };
        held.rotating = true;
        held.rotate_yaw = 0.0;
        held.rotate_pitch = 0.0;
        if let Some(body) = world.rigid_body_set.get(held.body) {
            held.initial_rotation = to_quat(body.rotation());
        }
        self.look.suppress(true);
    }

    fn update_rotate(&mut self, world: &mut PhysicsWorld, mouse_delta: Vec2) {
        let Some(held) = &mut self.held else {
            return;
        };
        if !held.rotating {
            return;
        }
        held.rotate_yaw += mouse_delta.x * self.config.rotate_sensitivity;
        held.rotate_pitch = (held.rotate_pitch - mouse_delta.y * self.config.rotate_sensitivity)
            .clamp(-89.0, 89.0);

        let spin = Quat::from_rotation_y(held.rotate_yaw.to_radians())
            * Quat::from_rotation_x(held.rotate_pitch.to_radians());
        let result = spin * held.initial_rotation;
        if let Some(body) = world.rigid_body_set.get_mut(held.body) {
            body.set_rotation(to_rotation(result), true);
        }
        held.held_rotation = result;
    }

    fn stop_rotate(&mut self) {
        if let Some(held) = &mut self.held {
            held.rotating = false;
        }
        self.look.suppress(false);
    }

    /// A body removed from the world out from under us counts as a release.
    fn release_if_stale(&mut self, world: &PhysicsWorld) {
        let Some(held) = &self.held else {
            return;
        };
        if world.rigid_body_set.get(held.body).is_none() {
            tracing::warn!(body = ?held.body, "held body vanished, dropping hold");
            self.held = None;
            self.look.suppress(false);
        }
    }
}
