//! Per-mesh material interpolation toward the style and theme target.

use glam::Vec3;
use tracing::debug;

use crate::blend::{blend_factor, Blend};
use crate::presets::MaterialTarget;
use crate::scene::{MeshId, SceneHandle};

/// Current blended material values of one mesh surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialState {
    pub color: Vec3,
    pub roughness: f32,
    pub metalness: f32,
}

impl MaterialState {
    /// State already sitting on the target
    pub fn at(target: &MaterialTarget) -> Self {
        Self {
            color: target.base_color,
            roughness: target.roughness,
            metalness: target.metalness,
        }
    }

    fn step(self, target: &MaterialTarget, factor: f32) -> Self {
        Self {
            color: self.color.blend_toward(target.base_color, factor),
            roughness: self.roughness.blend_toward(target.roughness, factor),
            metalness: self.metalness.blend_toward(target.metalness, factor),
        }
    }

    fn is_valid(&self) -> bool {
        self.color.is_finite()
            && (0.0..=1.0).contains(&self.roughness)
            && (0.0..=1.0).contains(&self.metalness)
    }
}

/// Blends every observed mesh of the active room toward one shared target.
///
/// States live in an array parallel to the host's mesh indices. A slot is
/// filled the first time its mesh is observed and cleared only when the room
/// is torn down.
#[derive(Debug)]
pub struct MaterialInterpolator {
    time_constant: f32,
    target: MaterialTarget,
    states: Vec<Option<MaterialState>>,
}

impl MaterialInterpolator {
    pub fn new(target: MaterialTarget, time_constant: f32) -> Self {
        Self {
            time_constant,
            target,
            states: Vec::new(),
        }
    }

    pub fn target(&self) -> &MaterialTarget {
        &self.target
    }

    /// Retarget without touching current values; blends continue from where they are.
    pub fn set_target(&mut self, target: MaterialTarget) {
        self.target = target;
    }

    pub fn state(&self, mesh: MeshId) -> Option<&MaterialState> {
        self.states.get(mesh.index()).and_then(Option::as_ref)
    }

    /// Number of meshes with a state
    pub fn tracked(&self) -> usize {
        self.states.iter().filter(|state| state.is_some()).count()
    }

    /// Start tracking a mesh. New meshes start on the target so nothing pops.
    ///
    /// Returns `true` if the mesh was not tracked before.
    pub fn observe(&mut self, mesh: MeshId) -> bool {
        let index = mesh.index();
        if index >= self.states.len() {
            self.states.resize(index + 1, None);
        }
        let slot = &mut self.states[index];
        if slot.is_some() {
            return false;
        }
        *slot = Some(MaterialState::at(&self.target));
        true
    }

    /// Advance every tracked mesh by one frame.
    pub fn tick(&mut self, delta_seconds: f32) {
        let factor = blend_factor(delta_seconds, self.time_constant);
        if factor == 0.0 {
            return;
        }
        let target = self.target;
        for state in self.states.iter_mut().flatten() {
            *state = state.step(&target, factor);
            debug_assert!(state.is_valid(), "material state left its range: {state:?}");
        }
    }

    /// Observe any new meshes and write current values into the scene.
    pub fn write(&mut self, scene: &mut dyn SceneHandle) {
        let mut discovered = 0usize;
        scene.for_each_mesh(&mut |mesh, surface| {
            if self.observe(mesh) {
                discovered += 1;
            }
            if let Some(state) = self.state(mesh) {
                surface.set_color(state.color);
                surface.set_roughness(state.roughness);
                surface.set_metalness(state.metalness);
            }
        });
        if discovered > 0 {
            debug!("Tracking {} new room surfaces ({} total)", discovered, self.tracked());
        }
    }

    /// Drop all mesh states; called when the room is torn down.
    pub fn clear(&mut self) {
        self.states.clear();
    }
}
