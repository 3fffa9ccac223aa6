//! Seams to the rendering engine's live scene.
//!
//! The controller never owns engine objects. Hosts expose the loaded room
//! through [`SceneHandle`] and the light rig through [`LightRig`]; both are
//! borrowed only for the duration of a write.

use glam::Vec3;

/// Stable index of a renderable surface within the active room.
///
/// Assigned by the host in discovery order and valid until the room is torn
/// down. Used as an index into the interpolator's state array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub usize);

impl MeshId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Material properties of a single mesh surface the controller may write.
pub trait MeshSurface {
    fn set_color(&mut self, color: Vec3);
    fn set_roughness(&mut self, roughness: f32);
    fn set_metalness(&mut self, metalness: f32);
}

/// Enumerates the renderable surfaces of the active room.
pub trait SceneHandle {
    fn for_each_mesh(&mut self, visitor: &mut dyn FnMut(MeshId, &mut dyn MeshSurface));
}

/// Shadow configuration derived from device capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowSettings {
    pub enabled: bool,
    pub map_size: u32,
}

/// Ambient and directional lights of the active scene.
pub trait LightRig {
    fn set_ambient_intensity(&mut self, intensity: f32);
    fn set_directional_intensity(&mut self, intensity: f32);
    fn set_directional_position(&mut self, position: Vec3);
    fn set_light_color(&mut self, color: Vec3);
    fn set_shadows(&mut self, shadows: ShadowSettings);
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory scene and light rig used by unit tests.

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct RecordedSurface {
        pub color: Vec3,
        pub roughness: f32,
        pub metalness: f32,
    }

    impl MeshSurface for RecordedSurface {
        fn set_color(&mut self, color: Vec3) {
            self.color = color;
        }

        fn set_roughness(&mut self, roughness: f32) {
            self.roughness = roughness;
        }

        fn set_metalness(&mut self, metalness: f32) {
            self.metalness = metalness;
        }
    }

    #[derive(Debug, Default)]
    pub struct RecordedScene {
        pub surfaces: Vec<RecordedSurface>,
    }

    impl RecordedScene {
        pub fn with_meshes(count: usize) -> Self {
            Self {
                surfaces: vec![RecordedSurface::default(); count],
            }
        }
    }

    impl SceneHandle for RecordedScene {
        fn for_each_mesh(&mut self, visitor: &mut dyn FnMut(MeshId, &mut dyn MeshSurface)) {
            for (index, surface) in self.surfaces.iter_mut().enumerate() {
                visitor(MeshId(index), surface);
            }
        }
    }

    #[derive(Debug, Default)]
    pub struct RecordedRig {
        pub ambient_intensity: f32,
        pub directional_intensity: f32,
        pub directional_position: Vec3,
        pub color: Vec3,
        pub shadows: Option<ShadowSettings>,
        pub shadow_writes: usize,
    }

    impl LightRig for RecordedRig {
        fn set_ambient_intensity(&mut self, intensity: f32) {
            self.ambient_intensity = intensity;
        }

        fn set_directional_intensity(&mut self, intensity: f32) {
            self.directional_intensity = intensity;
        }

        fn set_directional_position(&mut self, position: Vec3) {
            self.directional_position = position;
        }

        fn set_light_color(&mut self, color: Vec3) {
            self.color = color;
        }

        fn set_shadows(&mut self, shadows: ShadowSettings) {
            self.shadows = Some(shadows);
            self.shadow_writes += 1;
        }
    }
}
