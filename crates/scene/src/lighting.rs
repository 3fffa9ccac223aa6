//! Ambient and directional lights driven by the viewer's lighting mood

use bevy::light::{DirectionalLightShadowMap, GlobalAmbientLight};
use bevy::prelude::*;
use staging::{LightRig, ShadowSettings};

use crate::viewer::{Viewer, drive_viewer};

/// Directional illuminance (lux) for a mood intensity of 1.0
pub const DIRECTIONAL_LUX_PER_UNIT: f32 = 10_000.0;

/// Ambient brightness for a mood intensity of 1.0
pub const AMBIENT_BRIGHTNESS_PER_UNIT: f32 = 500.0;

/// Marker component for the sun directional light
#[derive(Component)]
pub struct SunLight;

/// Plugin for mood-driven scene lighting
pub struct LightingPlugin;

impl Plugin for LightingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_lighting)
            .add_systems(Update, apply_viewer_lighting.after(drive_viewer));
    }
}

/// Spawn the sun and set the ambient light. The viewer fills in real
/// values on its first frame.
fn setup_lighting(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(5.0, 5.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
        SunLight,
    ));

    // Global ambient light is a resource, not an entity
    commands.insert_resource(GlobalAmbientLight {
        color: Color::WHITE,
        brightness: 0.0,
        ..default()
    });

    info!("Scene lighting initialized");
}

/// Writes the interpolated light values each frame
fn apply_viewer_lighting(
    viewer: Option<ResMut<Viewer>>,
    mut sun_query: Query<(&mut DirectionalLight, &mut Transform), With<SunLight>>,
    mut ambient_light: ResMut<GlobalAmbientLight>,
    mut shadow_map: ResMut<DirectionalLightShadowMap>,
) {
    let Some(mut viewer) = viewer else {
        return;
    };

    for (mut light, mut transform) in sun_query.iter_mut() {
        let mut rig = BevyLightRig {
            sun: &mut *light,
            sun_transform: &mut *transform,
            ambient: &mut *ambient_light,
            shadow_map: &mut *shadow_map,
        };
        viewer.write_lights(&mut rig);
    }
}

/// [`LightRig`] over the sun entity and the ambient resources
struct BevyLightRig<'a> {
    sun: &'a mut DirectionalLight,
    sun_transform: &'a mut Transform,
    ambient: &'a mut GlobalAmbientLight,
    shadow_map: &'a mut DirectionalLightShadowMap,
}

impl LightRig for BevyLightRig<'_> {
    fn set_ambient_intensity(&mut self, intensity: f32) {
        self.ambient.brightness = intensity * AMBIENT_BRIGHTNESS_PER_UNIT;
    }

    fn set_directional_intensity(&mut self, intensity: f32) {
        self.sun.illuminance = intensity * DIRECTIONAL_LUX_PER_UNIT;
    }

    fn set_directional_position(&mut self, position: staging::glam::Vec3) {
        let position = Vec3::from_array(position.to_array());
        // The sun shines from its position toward the room origin
        *self.sun_transform = Transform::from_translation(position).looking_at(Vec3::ZERO, Vec3::Y);
    }

    fn set_light_color(&mut self, color: staging::glam::Vec3) {
        // Ambient stays white; the mood tints the sun only
        self.sun.color = Color::srgb(color.x, color.y, color.z);
    }

    fn set_shadows(&mut self, shadows: ShadowSettings) {
        self.sun.shadows_enabled = shadows.enabled;
        // Kept even when disabled so the device-derived size is in place
        self.shadow_map.size = shadows.map_size.max(1) as usize;
        info!(
            "Shadows {} ({}px)",
            if shadows.enabled { "on" } else { "off" },
            shadows.map_size
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_shadows_keep_device_map_size() {
        let mut sun = DirectionalLight {
            shadows_enabled: true,
            ..default()
        };
        let mut transform = Transform::default();
        let mut ambient = GlobalAmbientLight::default();
        let mut shadow_map = DirectionalLightShadowMap::default();

        let mut rig = BevyLightRig {
            sun: &mut sun,
            sun_transform: &mut transform,
            ambient: &mut ambient,
            shadow_map: &mut shadow_map,
        };
        rig.set_shadows(ShadowSettings {
            enabled: false,
            map_size: 1024,
        });

        assert!(!sun.shadows_enabled);
        assert_eq!(shadow_map.size, 1024);
    }

    #[test]
    fn test_intensities_are_scaled_to_bevy_units() {
        let mut sun = DirectionalLight::default();
        let mut transform = Transform::default();
        let mut ambient = GlobalAmbientLight::default();
        let mut shadow_map = DirectionalLightShadowMap::default();

        let mut rig = BevyLightRig {
            sun: &mut sun,
            sun_transform: &mut transform,
            ambient: &mut ambient,
            shadow_map: &mut shadow_map,
        };
        rig.set_ambient_intensity(0.6);
        rig.set_directional_intensity(0.8);
        rig.set_directional_position(staging::glam::Vec3::new(5.0, 5.0, 5.0));

        assert!((ambient.brightness - 0.6 * AMBIENT_BRIGHTNESS_PER_UNIT).abs() < 1e-3);
        assert!((sun.illuminance - 0.8 * DIRECTIONAL_LUX_PER_UNIT).abs() < 1e-2);
        assert_eq!(transform.translation, Vec3::new(5.0, 5.0, 5.0));
    }
}
