//! Derived camera pose shared with downstream consumers.

use glam::{Quat, Vec3};

/// World-space camera position and orientation for one frame.
///
/// Recomputed every frame by the locomotion controller from avatar state
/// plus bob and lean offsets; never stored across frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl CameraPose {
    /// Direction the camera is looking, unit length.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}
