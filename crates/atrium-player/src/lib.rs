//! First-person player: locomotion, camera pose, and physical object carry.
//!
//! [`LocomotionController`] owns the avatar's movement state (yaw/pitch,
//! capsule height, velocities) and drives the kinematic capsule through
//! `atrium-physics`. [`CarryController`] picks up, carries, rotates, and
//! throws dynamic bodies using the camera pose the locomotion side derives.
//! The two are linked only through [`CameraPose`] and [`LookSuppression`].

pub mod camera;
pub mod carry;
pub mod locomotion;
pub mod look;
pub mod smoothing;

pub use camera::CameraPose;
pub use carry::CarryController;
pub use locomotion::{Gait, LocomotionController, LocomotionEvent};
pub use look::LookSuppression;
