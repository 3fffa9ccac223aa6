//! Time-constant blend law shared by the material and lighting interpolators.
//!
//! Every tick moves a value toward its target by `min(1, dt / tau)` of the
//! remaining distance. The factor is recomputed from each frame's delta, so
//! convergence follows elapsed time rather than frame count, and the result is
//! always a convex combination of the old value and the target.

use glam::Vec3;

/// Fraction of the remaining distance covered by one tick.
///
/// Zero, negative and NaN deltas yield 0 (no change). Deltas at or beyond the
/// time constant yield 1 (snap to target).
pub fn blend_factor(delta_seconds: f32, time_constant: f32) -> f32 {
    if delta_seconds.is_nan() || delta_seconds <= 0.0 {
        return 0.0;
    }
    if time_constant.is_nan() || time_constant <= 0.0 {
        return 1.0;
    }
    (delta_seconds / time_constant).min(1.0)
}

/// A value that can be moved part of the way toward a target.
pub trait Blend: Copy {
    /// Linear step toward `target`; `factor` is expected in `[0, 1]`.
    fn blend_toward(self, target: Self, factor: f32) -> Self;
}

impl Blend for f32 {
    fn blend_toward(self, target: f32, factor: f32) -> f32 {
        if factor <= 0.0 {
            return self;
        }
        if factor >= 1.0 {
            return target;
        }
        let value = self + (target - self) * factor;
        // Rounding must never carry the value past either end
        value.clamp(self.min(target), self.max(target))
    }
}

impl Blend for Vec3 {
    fn blend_toward(self, target: Vec3, factor: f32) -> Vec3 {
        Vec3::new(
            self.x.blend_toward(target.x, factor),
            self.y.blend_toward(target.y, factor),
            self.z.blend_toward(target.z, factor),
        )
    }
}
