//! Ambient and directional light interpolation toward the mood target.

use glam::Vec3;
use roomviz_ipc::Capabilities;

use crate::blend::{blend_factor, Blend};
use crate::presets::LightingTarget;
use crate::scene::{LightRig, ShadowSettings};

/// Current values of the scene's light rig
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingState {
    pub ambient_intensity: f32,
    pub directional_intensity: f32,
    pub directional_position: Vec3,
    pub color: Vec3,
}

impl LightingState {
    pub fn at(target: &LightingTarget) -> Self {
        Self {
            ambient_intensity: target.ambient_intensity,
            directional_intensity: target.directional_intensity,
            directional_position: target.directional_position,
            color: target.color,
        }
    }

    fn step(self, target: &LightingTarget, factor: f32) -> Self {
        Self {
            ambient_intensity: self
                .ambient_intensity
                .blend_toward(target.ambient_intensity, factor),
            directional_intensity: self
                .directional_intensity
                .blend_toward(target.directional_intensity, factor),
            directional_position: self
                .directional_position
                .blend_toward(target.directional_position, factor),
            // Per-channel in display space
            color: self.color.blend_toward(target.color, factor),
        }
    }

    fn is_valid(&self) -> bool {
        self.ambient_intensity.is_finite()
            && self.ambient_intensity >= 0.0
            && self.directional_intensity.is_finite()
            && self.directional_intensity >= 0.0
            && self.directional_position.is_finite()
            && self.color.is_finite()
    }
}

impl ShadowSettings {
    /// Shadow settings for a device.
    ///
    /// The configured size is capped by what the device supports. Mobile
    /// devices get no shadow casting and half the resolution.
    pub fn for_device(capabilities: &Capabilities, configured_size: u32) -> Self {
        let size = configured_size.min(capabilities.max_shadow_map_size);
        if capabilities.is_mobile {
            Self {
                enabled: false,
                map_size: size / 2,
            }
        } else {
            Self {
                enabled: capabilities.graphics_supported,
                map_size: size,
            }
        }
    }
}

/// Blends the single light rig of the active scene toward the mood target.
#[derive(Debug)]
pub struct LightingInterpolator {
    time_constant: f32,
    target: LightingTarget,
    state: LightingState,
    shadows: ShadowSettings,
    shadows_dirty: bool,
}

impl LightingInterpolator {
    /// Starts on the target so the first frame is already lit correctly.
    pub fn new(target: LightingTarget, time_constant: f32, shadows: ShadowSettings) -> Self {
        Self {
            time_constant,
            target,
            state: LightingState::at(&target),
            shadows,
            shadows_dirty: true,
        }
    }

    pub fn target(&self) -> &LightingTarget {
        &self.target
    }

    pub fn state(&self) -> &LightingState {
        &self.state
    }

    pub fn set_target(&mut self, target: LightingTarget) {
        self.target = target;
    }

    pub fn tick(&mut self, delta_seconds: f32) {
        let factor = blend_factor(delta_seconds, self.time_constant);
        if factor == 0.0 {
            return;
        }
        self.state = self.state.step(&self.target, factor);
        debug_assert!(
            self.state.is_valid(),
            "lighting state left its range: {:?}",
            self.state
        );
    }

    /// Write the current values into the rig.
    ///
    /// Shadow settings are written on the first call and again only after
    /// [`Self::invalidate_shadows`].
    pub fn write(&mut self, rig: &mut dyn LightRig) {
        rig.set_ambient_intensity(self.state.ambient_intensity);
        rig.set_directional_intensity(self.state.directional_intensity);
        rig.set_directional_position(self.state.directional_position);
        rig.set_light_color(self.state.color);
        if self.shadows_dirty {
            rig.set_shadows(self.shadows);
            self.shadows_dirty = false;
        }
    }

    /// Request the shadow settings be written again, e.g. after new lights were spawned.
    pub fn invalidate_shadows(&mut self) {
        self.shadows_dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::testing::RecordedRig;
    use roomviz_ipc::LightingMood;

    fn desktop() -> Capabilities {
        Capabilities {
            graphics_supported: true,
            is_mobile: false,
            max_shadow_map_size: 4096,
            preferred_pixel_ratio_range: (1.0, 2.0),
        }
    }

    fn mobile() -> Capabilities {
        Capabilities {
            graphics_supported: true,
            is_mobile: true,
            max_shadow_map_size: 4096,
            preferred_pixel_ratio_range: (1.0, 1.5),
        }
    }

    fn interpolator(mood: LightingMood) -> LightingInterpolator {
        LightingInterpolator::new(
            LightingTarget::resolve(mood),
            0.8,
            ShadowSettings::for_device(&desktop(), 2048),
        )
    }

    #[test]
    fn test_starts_on_target() {
        let interp = interpolator(LightingMood::Evening);
        assert_eq!(
            *interp.state(),
            LightingState::at(&LightingTarget::resolve(LightingMood::Evening))
        );
    }

    #[test]
    fn test_zero_delta_changes_nothing() {
        let mut interp = interpolator(LightingMood::Morning);
        interp.set_target(LightingTarget::resolve(LightingMood::Night));
        let before = *interp.state();
        interp.tick(0.0);
        assert_eq!(*interp.state(), before);
    }

    #[test]
    fn test_huge_delta_snaps() {
        let mut interp = interpolator(LightingMood::Morning);
        let night = LightingTarget::resolve(LightingMood::Night);
        interp.set_target(night);
        interp.tick(1.0e6);
        assert_eq!(*interp.state(), LightingState::at(&night));
    }

    #[test]
    fn test_converges_after_five_time_constants() {
        let mut interp = interpolator(LightingMood::Morning);
        interp.set_target(LightingTarget::resolve(LightingMood::Night));
        let mut elapsed = 0.0;
        while elapsed < 4.0 {
            interp.tick(0.02);
            elapsed += 0.02;
        }
        let state = interp.state();
        assert!((state.ambient_intensity - 0.3).abs() < 0.01 * 0.5);
        assert!((state.directional_intensity - 0.4).abs() < 0.01 * 0.6);
        let position_gap = (state.directional_position - Vec3::new(2.0, 6.0, 4.0)).length();
        let initial_gap = (Vec3::new(5.0, 8.0, 3.0) - Vec3::new(2.0, 6.0, 4.0)).length();
        assert!(position_gap < 0.01 * initial_gap);
    }

    #[test]
    fn test_reversal_stays_within_both_targets() {
        let night = LightingTarget::resolve(LightingMood::Night);
        let morning = LightingTarget::resolve(LightingMood::Morning);
        let mut interp = interpolator(LightingMood::Evening);

        interp.set_target(night);
        interp.tick(0.1);
        interp.set_target(morning);

        let lo = night.ambient_intensity.min(0.5);
        let hi = morning.ambient_intensity.max(0.5);
        for _ in 0..300 {
            interp.tick(1.0 / 60.0);
            let state = interp.state();
            assert!(state.ambient_intensity >= lo && state.ambient_intensity <= hi);
            assert!(state.directional_intensity >= 0.4 && state.directional_intensity <= 1.0);
        }
    }

    #[test]
    fn test_write_sets_rig_and_shadows_once() {
        let mut interp = interpolator(LightingMood::Morning);
        let mut rig = RecordedRig::default();
        interp.write(&mut rig);
        interp.tick(0.016);
        interp.write(&mut rig);

        assert_eq!(rig.ambient_intensity, 0.8);
        assert_eq!(rig.directional_position, Vec3::new(5.0, 8.0, 3.0));
        assert_eq!(rig.shadow_writes, 1);
        assert_eq!(
            rig.shadows,
            Some(ShadowSettings {
                enabled: true,
                map_size: 2048
            })
        );

        interp.invalidate_shadows();
        interp.write(&mut rig);
        assert_eq!(rig.shadow_writes, 2);
    }

    #[test]
    fn test_mobile_shadows_disabled_and_halved() {
        let shadows = ShadowSettings::for_device(&mobile(), 2048);
        assert!(!shadows.enabled);
        assert_eq!(shadows.map_size, 1024);
    }

    #[test]
    fn test_shadow_size_capped_by_device() {
        let mut caps = desktop();
        caps.max_shadow_map_size = 1024;
        let shadows = ShadowSettings::for_device(&caps, 2048);
        assert!(shadows.enabled);
        assert_eq!(shadows.map_size, 1024);
    }
}
