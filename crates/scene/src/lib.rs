//! Bevy scene for the room preview viewer
//!
//! Binds the engine-agnostic `staging` controller to a live Bevy world:
//! the loaded room model, its per-mesh materials, the mood lighting and an
//! orbit camera.

use bevy::prelude::*;

mod camera;
mod commands;
mod lighting;
mod loader;
mod room;
mod viewer;

pub use camera::{CameraControllerPlugin, MainCamera, OrbitCamera};
pub use commands::{PresetCommand, PresetCommandPlugin};
pub use lighting::{LightingPlugin, SunLight};
pub use loader::BevySceneLoader;
pub use room::{RoomPlugin, RoomRoot, RoomSurface, RoomSurfaces};
pub use viewer::{
    InitialRoom, LoaderRuntime, Viewer, ViewerPlugin, ViewerUnavailable, WINDOW_TITLE, window_title,
};

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(CameraControllerPlugin);
        app.add_plugins(LightingPlugin);
        app.add_plugins(RoomPlugin);
        app.add_plugins(ViewerPlugin);
        app.add_plugins(PresetCommandPlugin);
    }
}
