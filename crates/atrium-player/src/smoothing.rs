//! Critically-damped smoothing toward a moving target.
//!
//! Spring-damper approximation with a cubic rational falloff. Unlike plain
//! exponential lerp it carries a velocity term across calls, so it tracks a
//! moving target without lag spikes, and it never overshoots.

use glam::Vec3;

/// Smallest smooth time accepted; smaller values snap to the target.
pub const MIN_SMOOTH_TIME: f32 = 1e-4;

/// Advances `current` toward `target` over `dt` seconds.
///
/// `velocity` is caller-owned state that must persist between calls for the
/// same smoothed quantity. `smooth_time` is roughly the time to cover 63%
/// of the remaining distance when starting from rest.
pub fn smooth_damp(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    dt: f32,
) -> f32 {
    let smooth_time = smooth_time.max(MIN_SMOOTH_TIME);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let mut output = target + (change + temp) * decay;

    // Clamp overshoot past the target.
    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = (output - target) / dt;
    }
    output
}

/// Component-wise [`smooth_damp`] for vectors.
pub fn smooth_damp_vec3(
    current: Vec3,
    target: Vec3,
    velocity: &mut Vec3,
    smooth_time: f32,
    dt: f32,
) -> Vec3 {
    Vec3::new(
        smooth_damp(current.x, target.x, &mut velocity.x, smooth_time, dt),
        smooth_damp(current.y, target.y, &mut velocity.y, smooth_time, dt),
        smooth_damp(current.z, target.z, &mut velocity.z, smooth_time, dt),
    )
}
