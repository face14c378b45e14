//! Physics integration: rigid bodies, the avatar capsule, raycasting, and
//! physics world stepping.
//!
//! Wraps the Rapier 3D physics engine behind a single [`PhysicsWorld`] that
//! owns all simulation state. The core never implements collision response
//! itself: the avatar moves through Rapier's kinematic character controller,
//! and held props are ordinary dynamic bodies the carry controller drives by
//! velocity.

pub mod avatar;

use glam::{Quat, Vec3};
use rapier3d::na;
use rapier3d::prelude::*;

pub use avatar::{AvatarBody, MoveOutcome};

/// Collision group for the avatar capsule.
pub const AVATAR_GROUP: Group = Group::GROUP_1;
/// Collision group for bodies the carry controller may pick up.
pub const PICKABLE_GROUP: Group = Group::GROUP_2;
/// Collision group for static scene geometry.
pub const STATIC_GROUP: Group = Group::GROUP_3;

/// Convert a glam vector to Rapier's nalgebra vector.
#[must_use]
pub fn to_vector(v: Vec3) -> Vector<f32> {
    Vector::new(v.x, v.y, v.z)
}

/// Convert a Rapier vector to glam.
#[must_use]
pub fn to_vec3(v: &Vector<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// Convert a glam quaternion to Rapier's unit quaternion.
#[must_use]
pub fn to_rotation(q: Quat) -> Rotation<f32> {
    Rotation::from_quaternion(na::Quaternion::new(q.w, q.x, q.y, q.z))
}

/// Convert a Rapier unit quaternion to glam.
#[must_use]
pub fn to_quat(r: &Rotation<f32>) -> Quat {
    Quat::from_xyzw(r.i, r.j, r.k, r.w)
}

/// A successful ray hit against the pickable layer.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    /// The collider the ray struck.
    pub collider: ColliderHandle,
    /// The rigid body the collider is attached to, if any.
    pub body: Option<RigidBodyHandle>,
    /// World-space hit point.
    pub point: Vec3,
    /// Distance along the ray to the hit.
    pub toi: f32,
}

/// Central physics simulation state owning all Rapier sets and pipelines.
pub struct PhysicsWorld {
    /// World-space gravity vector.
    pub gravity: Vector<f32>,
    /// Timestep and solver configuration.
    pub integration_parameters: IntegrationParameters,
    /// The main simulation pipeline.
    pub physics_pipeline: PhysicsPipeline,
    /// Tracks sleeping/awake body islands.
    pub island_manager: IslandManager,
    /// Broad-phase collision detection (also provides the query pipeline).
    pub broad_phase: BroadPhaseBvh,
    /// Narrow-phase collision detection (contact manifolds).
    pub narrow_phase: NarrowPhase,
    /// All rigid bodies in the simulation.
    pub rigid_body_set: RigidBodySet,
    /// All colliders in the simulation.
    pub collider_set: ColliderSet,
    /// Impulse-based joints.
    pub impulse_joint_set: ImpulseJointSet,
    /// Multibody joints.
    pub multibody_joint_set: MultibodyJointSet,
    /// Continuous collision detection solver.
    pub ccd_solver: CCDSolver,
}

impl PhysicsWorld {
    /// Creates a new physics world with default gravity `(0, -9.81, 0)` and
    /// a timestep of `1/60` seconds matching the fixed physics tick.
    #[must_use]
    pub fn new() -> Self {
        let integration_parameters = IntegrationParameters {
            dt: 1.0 / 60.0,
            ..Default::default()
        };

        Self {
            gravity: Vector::new(0.0, -9.81, 0.0),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }

    /// Advances the simulation by one fixed timestep.
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            &(),
            &(),
        );
    }

    /// The fixed physics timestep in seconds.
    #[must_use]
    pub fn timestep(&self) -> f32 {
        self.integration_parameters.dt
    }

    /// Casts a ray against the pickable layer and returns the closest hit.
    ///
    /// Only colliders whose membership includes [`PICKABLE_GROUP`] are
    /// considered; `exclude` (typically the avatar body) never matches.
    #[must_use]
    pub fn cast_ray_pickable(
        &self,
        origin: Vec3,
        dir: Vec3,
        max_distance: f32,
        exclude: Option<RigidBodyHandle>,
    ) -> Option<RayHit> {
        let mut filter = QueryFilter::new().groups(InteractionGroups::new(
            Group::ALL,
            PICKABLE_GROUP,
        ));
        if let Some(body) = exclude {
            filter = filter.exclude_rigid_body(body);
        }

        let query_pipeline = self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.rigid_body_set,
            &self.collider_set,
            filter,
        );

        let ray = Ray::new(
            na::Point3::new(origin.x, origin.y, origin.z),
            to_vector(dir),
        );
        let (collider, toi) = query_pipeline.cast_ray(&ray, max_distance, true)?;
        let point = ray.point_at(toi);
        let body = self.collider_set.get(collider).and_then(Collider::parent);
        Some(RayHit {
            collider,
            body,
            point: Vec3::new(point.x, point.y, point.z),
            toi,
        })
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}
