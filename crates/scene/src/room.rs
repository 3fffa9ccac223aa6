//! The displayed room model and its per-mesh materials
//!
//! A loaded room is spawned as a [`SceneRoot`] under a [`RoomRoot`] entity.
//! As the scene instantiates, every mesh below the root gets its own copy of
//! its material and a [`RoomSurface`] index, so the viewer can drive each
//! surface independently.

use bevy::prelude::*;
use roomviz_ipc::RoomType;
use staging::{MeshId, MeshSurface, SceneHandle};

use crate::viewer::Viewer;

/// Root entity of the displayed room
#[derive(Component, Debug)]
pub struct RoomRoot {
    pub room: RoomType,
}

/// A mesh of the displayed room with its own material
#[derive(Component, Debug, Clone, Copy)]
pub struct RoomSurface {
    pub index: usize,
}

/// Materials of the displayed room, indexed by [`RoomSurface::index`]
#[derive(Resource, Default)]
pub struct RoomSurfaces {
    materials: Vec<Handle<StandardMaterial>>,
}

impl RoomSurfaces {
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    fn clear(&mut self) {
        self.materials.clear();
    }

    fn push(&mut self, material: Handle<StandardMaterial>) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }
}

/// Plugin for the room model
pub struct RoomPlugin;

impl Plugin for RoomPlugin {
    fn build(&self, app: &mut App) {
        // Scene instances spawn after Update; tag and write them before
        // they are first extracted for rendering
        app.init_resource::<RoomSurfaces>().add_systems(
            PostUpdate,
            (tag_room_surfaces, apply_viewer_materials).chain(),
        );
    }
}

/// Replace the displayed room with a freshly loaded scene
pub fn show_room(
    commands: &mut Commands,
    surfaces: &mut RoomSurfaces,
    current: impl IntoIterator<Item = Entity>,
    room: RoomType,
    scene: Handle<Scene>,
) {
    for entity in current {
        commands.entity(entity).despawn();
    }
    surfaces.clear();

    commands.spawn((
        SceneRoot(scene),
        Transform::default(),
        RoomRoot { room },
        Name::new(format!("Room: {}", room)),
    ));
    info!("Showing {}", room);
}

/// Give each newly spawned room mesh its own material
fn tag_room_surfaces(
    mut commands: Commands,
    mut surfaces: ResMut<RoomSurfaces>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mesh_query: Query<(Entity, &MeshMaterial3d<StandardMaterial>), Without<RoomSurface>>,
    parent_query: Query<&ChildOf>,
    root_query: Query<(), With<RoomRoot>>,
) {
    for (entity, material) in mesh_query.iter() {
        let in_room = parent_query
            .iter_ancestors(entity)
            .any(|ancestor| root_query.contains(ancestor));
        if !in_room {
            continue;
        }

        // glTF meshes share materials; clone so surfaces blend independently
        let Some(source) = materials.get(&material.0).cloned() else {
            continue;
        };
        let own = materials.add(source);
        let index = surfaces.push(own.clone());

        commands
            .entity(entity)
            .insert((MeshMaterial3d(own), RoomSurface { index }));
    }
}

/// Writes the interpolated material values each frame
fn apply_viewer_materials(
    viewer: Option<ResMut<Viewer>>,
    surfaces: Res<RoomSurfaces>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(mut viewer) = viewer else {
        return;
    };
    if surfaces.is_empty() {
        return;
    }

    let mut room = RoomMaterials {
        surfaces: &surfaces,
        materials: &mut materials,
    };
    viewer.write_scene(&mut room);
}

/// [`SceneHandle`] over the displayed room's material copies
struct RoomMaterials<'a> {
    surfaces: &'a RoomSurfaces,
    materials: &'a mut Assets<StandardMaterial>,
}

impl SceneHandle for RoomMaterials<'_> {
    fn for_each_mesh(&mut self, visitor: &mut dyn FnMut(MeshId, &mut dyn MeshSurface)) {
        for (index, handle) in self.surfaces.materials.iter().enumerate() {
            if let Some(material) = self.materials.get_mut(handle) {
                visitor(MeshId(index), &mut StandardSurface(material));
            }
        }
    }
}

struct StandardSurface<'a>(&'a mut StandardMaterial);

impl MeshSurface for StandardSurface<'_> {
    fn set_color(&mut self, color: staging::glam::Vec3) {
        self.0.base_color = Color::srgb(color.x, color.y, color.z);
    }

    fn set_roughness(&mut self, roughness: f32) {
        self.0.perceptual_roughness = roughness;
    }

    fn set_metalness(&mut self, metalness: f32) {
        self.0.metallic = metalness;
    }
}
