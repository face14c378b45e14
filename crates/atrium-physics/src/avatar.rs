//! Kinematic capsule body for the player avatar.
//!
//! The avatar is a position-based kinematic capsule moved through
//! [`KinematicCharacterController`], so it slides along walls and
//! snaps to the ground instead of tunnelling through geometry.

use glam::Vec3;
use rapier3d::control::{CharacterLength, KinematicCharacterController};
use rapier3d::na;
use rapier3d::parry::query::intersection_test;
use rapier3d::prelude::*;

use crate::{to_vec3, to_vector, PhysicsWorld, AVATAR_GROUP};

/// Smallest capsule the avatar can shrink to. Below this the capsule
/// degenerates into a sphere and the controller misbehaves.
const MIN_CYLINDER_HALF_HEIGHT: f32 = 0.05;

/// Gap kept between the clearance-test capsule and the feet so the
/// floor the avatar stands on never registers as an obstruction.
const CLEARANCE_SKIN: f32 = 0.02;

/// Result of one collide-and-slide move.
#[derive(Debug, Clone, Copy)]
pub struct MoveOutcome {
    /// Translation actually applied after collision resolution.
    pub translation: Vec3,
    /// Whether the controller found ground under the capsule.
    pub grounded: bool,
}

/// The player's physical presence in the world.
pub struct AvatarBody {
    body_handle: RigidBodyHandle,
    collider_handle: ColliderHandle,
    controller: KinematicCharacterController,
    radius: f32,
    height: f32,
}

impl AvatarBody {
    /// Spawns the avatar capsule at `position` (capsule center).
    pub fn spawn(world: &mut PhysicsWorld, position: Vec3, height: f32, radius: f32) -> Self {
        let body = RigidBodyBuilder::kinematic_position_based()
            .translation(to_vector(position))
            .build();
        let body_handle = world.rigid_body_set.insert(body);

        let half_height = (height / 2.0 - radius).max(MIN_CYLINDER_HALF_HEIGHT);
        let collider = ColliderBuilder::capsule_y(half_height, radius)
            .collision_groups(InteractionGroups::new(AVATAR_GROUP, Group::ALL))
            .friction(0.0)
            .build();
        let collider_handle =
            world
                .collider_set
                .insert_with_parent(collider, body_handle, &mut world.rigid_body_set);

        let controller = KinematicCharacterController {
            offset: CharacterLength::Absolute(0.01),
            snap_to_ground: Some(CharacterLength::Absolute(0.2)),
            ..Default::default()
        };

        tracing::debug!(height, radius, ?position, "spawned avatar capsule");

        Self {
            body_handle,
            collider_handle,
            controller,
            radius,
            height,
        }
    }

    pub fn body_handle(&self) -> RigidBodyHandle {
        self.body_handle
    }

    pub fn collider_handle(&self) -> ColliderHandle {
        self.collider_handle
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Capsule center in world space.
    pub fn position(&self, world: &PhysicsWorld) -> Vec3 {
        world
            .rigid_body_set
            .get(self.body_handle)
            .map(|body| to_vec3(body.translation()))
            .unwrap_or(Vec3::ZERO)
    }

    pub fn set_position(&self, world: &mut PhysicsWorld, position: Vec3) {
        if let Some(body) = world.rigid_body_set.get_mut(self.body_handle) {
            body.set_translation(to_vector(position), true);
        }
    }

    /// World-space y of the bottom of the capsule.
    pub fn feet_y(&self, world: &PhysicsWorld) -> f32 {
        self.position(world).y - self.height / 2.0
    }

    /// Moves the capsule by `delta`, sliding along whatever it hits.
    pub fn move_by(&self, world: &mut PhysicsWorld, delta: Vec3, dt: f32) -> MoveOutcome {
        let Some(shape) = world
            .collider_set
            .get(self.collider_handle)
            .map(|c| c.shared_shape().clone())
        else {
            return MoveOutcome {
                translation: Vec3::ZERO,
                grounded: false,
            };
        };
        let Some(body_pos) = world
            .rigid_body_set
            .get(self.body_handle)
            .map(|b| *b.position())
        else {
            return MoveOutcome {
                translation: Vec3::ZERO,
                grounded: false,
            };
        };

        let filter = QueryFilter::new()
            .exclude_rigid_body(self.body_handle)
            .exclude_sensors();
        let query_pipeline = world.broad_phase.as_query_pipeline(
            world.narrow_phase.query_dispatcher(),
            &world.rigid_body_set,
            &world.collider_set,
            filter,
        );

        let corrected = self.controller.move_shape(
            dt,
            &query_pipeline,
            &*shape,
            &body_pos,
            to_vector(delta),
            |_| {},
        );

        let applied = to_vec3(&corrected.translation);
        if let Some(body) = world.rigid_body_set.get_mut(self.body_handle) {
            let next = *body.translation() + corrected.translation;
            body.set_translation(next, true);
        }

        MoveOutcome {
            translation: applied,
            grounded: corrected.grounded,
        }
    }

    /// Resizes the capsule, keeping the feet at the same world y.
    pub fn set_height(&mut self, world: &mut PhysicsWorld, new_height: f32) {
        if (new_height - self.height).abs() < f32::EPSILON {
            return;
        }
        let feet_shift = (new_height - self.height) / 2.0;
        let half_height = (new_height / 2.0 - self.radius).max(MIN_CYLINDER_HALF_HEIGHT);
        if let Some(collider) = world.collider_set.get_mut(self.collider_handle) {
            collider.set_shape(SharedShape::capsule_y(half_height, self.radius));
        }
        if let Some(body) = world.rigid_body_set.get_mut(self.body_handle) {
            let mut translation = *body.translation();
            translation.y += feet_shift;
            body.set_translation(translation, true);
        }
        self.height = new_height;
    }

    /// True if anything overlaps the space a `stand_height` capsule
    /// would occupy above the current feet position. The test capsule
    /// is slightly thinner than the avatar so wall contacts the
    /// controller already tolerates do not block standing up.
    pub fn stand_clearance_blocked(&self, world: &PhysicsWorld, stand_height: f32) -> bool {
        let feet = self.feet_y(world);
        let position = self.position(world);
        let test_radius = self.radius * 0.9;
        let half = (stand_height / 2.0 - test_radius).max(MIN_CYLINDER_HALF_HEIGHT);
        let shape = Capsule::new_y(half, test_radius);
        let center_y = feet + CLEARANCE_SKIN + stand_height / 2.0;
        let shape_pos = Isometry::translation(position.x, center_y, position.z);

        for (handle, collider) in world.collider_set.iter() {
            if handle == self.collider_handle || collider.is_sensor() {
                continue;
            }
            let overlaps = intersection_test(
                &shape_pos,
                &shape,
                collider.position(),
                collider.shape(),
            )
            .unwrap_or(false);
            if overlaps {
                return true;
            }
        }
        false
    }

    /// Distance from the capsule center straight down to the first
    /// surface below, if one is within reach.
    pub fn ground_probe(&self, world: &PhysicsWorld) -> Option<f32> {
        let origin = self.position(world);
        let filter = QueryFilter::new()
            .exclude_rigid_body(self.body_handle)
            .exclude_sensors();
        let query_pipeline = world.broad_phase.as_query_pipeline(
            world.narrow_phase.query_dispatcher(),
            &world.rigid_body_set,
            &world.collider_set,
            filter,
        );
        let ray = Ray::new(
            na::Point3::new(origin.x, origin.y, origin.z),
            to_vector(Vec3::NEG_Y),
        );
        query_pipeline
            .cast_ray(&ray, self.height + 0.1, true)
            .map(|(_, toi)| toi)
    }

    /// Lifts the capsule out of the ground if the feet ended up below
    /// the surface directly underneath, e.g. after a teleport.
    pub fn resolve_ground_penetration(&self, world: &mut PhysicsWorld) {
        let Some(toi) = self.ground_probe(world) else {
            return;
        };
        let half = self.height / 2.0;
        if toi < half {
            let lift = half - toi;
            if lift > 1e-3 {
                tracing::debug!(lift, "lifting avatar out of ground penetration");
                if let Some(body) = world.rigid_body_set.get_mut(self.body_handle) {
                    let mut translation = *body.translation();
                    translation.y += lift;
                    body.set_translation(translation, true);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::STATIC_GROUP;

    fn add_floor(world: &mut PhysicsWorld) {
        let floor = RigidBodyBuilder::fixed()
            .translation(Vector::new(0.0, -0.5, 0.0))
            .build();
        let handle = world.rigid_body_set.insert(floor);
        world.collider_set.insert_with_parent(
            ColliderBuilder::cuboid(50.0, 0.5, 50.0)
                .collision_groups(InteractionGroups::new(STATIC_GROUP, Group::ALL))
                .build(),
            handle,
            &mut world.rigid_body_set,
        );
    }

    fn add_wall(world: &mut PhysicsWorld, z: f32) {
        let wall = RigidBodyBuilder::fixed()
            .translation(Vector::new(0.0, 2.0, z))
            .build();
        let handle = world.rigid_body_set.insert(wall);
        world.collider_set.insert_with_parent(
            ColliderBuilder::cuboid(10.0, 2.0, 0.1)
                .collision_groups(InteractionGroups::new(STATIC_GROUP, Group::ALL))
                .build(),
            handle,
            &mut world.rigid_body_set,
        );
    }

    #[test]
    fn test_spawn_places_capsule() {
        let mut world = PhysicsWorld::new();
        let avatar = AvatarBody::spawn(&mut world, Vec3::new(1.0, 1.0, 2.0), 2.0, 0.3);
        assert_eq!(avatar.height(), 2.0);
        assert_eq!(avatar.radius(), 0.3);
        let pos = avatar.position(&world);
        assert!((pos - Vec3::new(1.0, 1.0, 2.0)).length() < 1e-5);
        assert!((avatar.feet_y(&world) - 0.0).abs() < 1e-5);
    }

    #[test]
    fn test_move_slides_along_wall() {
        let mut world = PhysicsWorld::new();
        add_floor(&mut world);
        add_wall(&mut world, -1.0);
        let avatar = AvatarBody::spawn(&mut world, Vec3::new(0.0, 1.0, 0.0), 2.0, 0.3);
        world.step();

        // Push hard into the wall for a second of frames.
        let dt = world.timestep();
        for _ in 0..60 {
            avatar.move_by(&mut world, Vec3::new(0.0, 0.0, -0.1), dt);
        }
        let pos = avatar.position(&world);
        // Wall face is at z=-0.9; the capsule surface stops at it.
        assert!(pos.z > -0.9, "avatar passed through the wall: {pos:?}");
    }

    #[test]
    fn test_move_reports_grounded_on_floor() {
        let mut world = PhysicsWorld::new();
        add_floor(&mut world);
        let avatar = AvatarBody::spawn(&mut world, Vec3::new(0.0, 1.0, 0.0), 2.0, 0.3);
        world.step();

        let dt = world.timestep();
        let outcome = avatar.move_by(&mut world, Vec3::new(0.05, -0.05, 0.0), dt);
        assert!(outcome.grounded);
    }

    #[test]
    fn test_airborne_move_is_not_grounded() {
        let mut world = PhysicsWorld::new();
        add_floor(&mut world);
        let avatar = AvatarBody::spawn(&mut world, Vec3::new(0.0, 10.0, 0.0), 2.0, 0.3);
        world.step();

        let dt = world.timestep();
        let outcome = avatar.move_by(&mut world, Vec3::new(0.0, 0.1, 0.0), dt);
        assert!(!outcome.grounded);
    }

    #[test]
    fn test_set_height_keeps_feet_planted() {
        let mut world = PhysicsWorld::new();
        add_floor(&mut world);
        let mut avatar = AvatarBody::spawn(&mut world, Vec3::new(0.0, 1.0, 0.0), 2.0, 0.3);
        let feet_before = avatar.feet_y(&world);

        avatar.set_height(&mut world, 1.0);
        assert!((avatar.feet_y(&world) - feet_before).abs() < 1e-5);
        assert_eq!(avatar.height(), 1.0);

        avatar.set_height(&mut world, 2.0);
        assert!((avatar.feet_y(&world) - feet_before).abs() < 1e-5);
    }

    #[test]
    fn test_clearance_blocked_under_low_ceiling() {
        let mut world = PhysicsWorld::new();
        add_floor(&mut world);
        // Ceiling slab 1.5m above the floor.
        let ceiling = RigidBodyBuilder::fixed()
            .translation(Vector::new(0.0, 1.6, 0.0))
            .build();
        let handle = world.rigid_body_set.insert(ceiling);
        world.collider_set.insert_with_parent(
            ColliderBuilder::cuboid(5.0, 0.1, 5.0)
                .collision_groups(InteractionGroups::new(STATIC_GROUP, Group::ALL))
                .build(),
            handle,
            &mut world.rigid_body_set,
        );

        let avatar = AvatarBody::spawn(&mut world, Vec3::new(0.0, 0.5, 0.0), 1.0, 0.3);
        assert!(avatar.stand_clearance_blocked(&world, 2.0));
        // The crouched capsule itself fits fine.
        assert!(!avatar.stand_clearance_blocked(&world, 1.0));
    }

    #[test]
    fn test_clearance_free_in_open_space() {
        let mut world = PhysicsWorld::new();
        add_floor(&mut world);
        let avatar = AvatarBody::spawn(&mut world, Vec3::new(0.0, 0.5, 0.0), 1.0, 0.3);
        assert!(!avatar.stand_clearance_blocked(&world, 2.0));
    }

    #[test]
    fn test_ground_penetration_is_resolved() {
        let mut world = PhysicsWorld::new();
        add_floor(&mut world);
        let avatar = AvatarBody::spawn(&mut world, Vec3::new(0.0, 0.6, 0.0), 2.0, 0.3);
        world.step();

        avatar.resolve_ground_penetration(&mut world);
        // Feet should sit at the floor surface (y=0), so center y = 1.
        assert!((avatar.position(&world).y - 1.0).abs() < 1e-2);
    }
}
