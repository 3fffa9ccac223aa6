//! Orbit camera for inspecting the room
//!
//! Controls:
//! - Left mouse drag: Orbit around target
//! - Right mouse drag: Pan
//! - Scroll wheel: Dolly (zoom)

use bevy::input::mouse::{MouseButton, MouseMotion, MouseWheel};
use bevy::prelude::*;

/// Vertical field of view in degrees
pub const CAMERA_FOV_DEGREES: f32 = 75.0;

/// Where the camera starts, looking at the origin
pub const CAMERA_START: Vec3 = Vec3::new(5.0, 3.0, 5.0);

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Camera orbit controller state
#[derive(Component, Debug, Clone)]
pub struct OrbitCamera {
    /// Point the camera orbits around
    pub target: Vec3,
    /// Distance from target
    pub distance: f32,
    /// Horizontal angle (yaw) in radians
    pub yaw: f32,
    /// Elevation above the floor plane in radians
    pub pitch: f32,
    /// Orbit sensitivity (radians per pixel)
    pub orbit_sensitivity: f32,
    /// Pan sensitivity (units per pixel, scaled by distance)
    pub pan_sensitivity: f32,
    /// Zoom sensitivity (distance units per scroll line)
    pub zoom_sensitivity: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Highest elevation, just short of looking straight down
    pub max_pitch: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        let mut orbit = Self {
            target: Vec3::ZERO,
            distance: 0.0,
            yaw: 0.0,
            pitch: 0.0,
            orbit_sensitivity: 0.005,
            pan_sensitivity: 0.001,
            zoom_sensitivity: 1.0,
            min_distance: 3.0,
            max_distance: 15.0,
            max_pitch: 1.5,
        };
        orbit.look_from(CAMERA_START);
        orbit
    }
}

impl OrbitCamera {
    /// Calculate camera position from orbit parameters
    pub fn calculate_position(&self) -> Vec3 {
        let horizontal_distance = self.distance * self.pitch.cos();
        let y = self.distance * self.pitch.sin();
        let x = horizontal_distance * self.yaw.sin();
        let z = horizontal_distance * self.yaw.cos();

        self.target + Vec3::new(x, y, z)
    }

    /// Place the camera at `position`, keeping the current target
    pub fn look_from(&mut self, position: Vec3) {
        let offset = position - self.target;
        self.distance = offset
            .length()
            .clamp(self.min_distance, self.max_distance);
        self.yaw = offset.x.atan2(offset.z);
        self.pitch = (offset.y / offset.length().max(f32::EPSILON))
            .asin()
            .clamp(0.0, self.max_pitch);
    }

    /// Rotate by a mouse drag in pixels
    pub fn orbit(&mut self, delta: Vec2) {
        self.yaw -= delta.x * self.orbit_sensitivity;
        // Never below the floor
        self.pitch = (self.pitch + delta.y * self.orbit_sensitivity).clamp(0.0, self.max_pitch);
    }

    /// Zoom by scroll lines, scaled by the current distance
    pub fn zoom(&mut self, lines: f32) {
        let zoom_amount = lines * self.zoom_sensitivity * (self.distance * 0.1);
        self.distance = (self.distance - zoom_amount).clamp(self.min_distance, self.max_distance);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Plugin for the orbit camera
pub struct CameraControllerPlugin;

impl Plugin for CameraControllerPlugin {
    fn build(&self, app: &mut App) {
        // orbit and pan both read MouseMotion, so they must run sequentially
        app.add_systems(Startup, spawn_camera).add_systems(
            Update,
            (
                camera_orbit_system,
                camera_pan_system.after(camera_orbit_system),
                camera_zoom_system,
                update_camera_transform
                    .after(camera_orbit_system)
                    .after(camera_pan_system)
                    .after(camera_zoom_system),
            ),
        );
    }
}

fn spawn_camera(mut commands: Commands) {
    // Reinhard needs no tonemapping LUTs
    let orbit_camera = OrbitCamera::default();
    let camera_position = orbit_camera.calculate_position();
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: CAMERA_FOV_DEGREES.to_radians(),
            near: 0.1,
            far: 1000.0,
            ..default()
        }),
        Transform::from_translation(camera_position).looking_at(orbit_camera.target, Vec3::Y),
        bevy::core_pipeline::tonemapping::Tonemapping::Reinhard,
        MainCamera,
        orbit_camera,
    ));
}

fn camera_orbit_system(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut motion_events: MessageReader<MouseMotion>,
    mut camera_query: Query<&mut OrbitCamera>,
) {
    if !mouse_button.pressed(MouseButton::Left) {
        motion_events.clear();
        return;
    }

    let mut delta = Vec2::ZERO;
    for event in motion_events.read() {
        delta += event.delta;
    }

    if delta == Vec2::ZERO {
        return;
    }

    for mut orbit in camera_query.iter_mut() {
        orbit.orbit(delta);
    }
}

fn camera_pan_system(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut motion_events: MessageReader<MouseMotion>,
    mut camera_query: Query<(&mut OrbitCamera, &Transform)>,
) {
    if !mouse_button.pressed(MouseButton::Right) {
        motion_events.clear();
        return;
    }

    let mut delta = Vec2::ZERO;
    for event in motion_events.read() {
        delta += event.delta;
    }

    if delta == Vec2::ZERO {
        return;
    }

    for (mut orbit, transform) in camera_query.iter_mut() {
        let right = transform.rotation * Vec3::X;
        let up = transform.rotation * Vec3::Y;

        let pan_scale = orbit.pan_sensitivity * orbit.distance;

        // Negative to feel like dragging the scene
        let pan_offset = (-right * delta.x + up * delta.y) * pan_scale;
        orbit.target += pan_offset;
    }
}

fn camera_zoom_system(
    mut scroll_events: MessageReader<MouseWheel>,
    mut camera_query: Query<&mut OrbitCamera>,
) {
    let mut scroll_delta = 0.0;
    for event in scroll_events.read() {
        scroll_delta += event.y;
    }

    if scroll_delta == 0.0 {
        return;
    }

    for mut orbit in camera_query.iter_mut() {
        orbit.zoom(scroll_delta);
    }
}

fn update_camera_transform(
    mut camera_query: Query<(&OrbitCamera, &mut Transform), (With<MainCamera>, Changed<OrbitCamera>)>,
) {
    for (orbit, mut transform) in camera_query.iter_mut() {
        let position = orbit.calculate_position();
        *transform = Transform::from_translation(position).looking_at(orbit.target, Vec3::Y);
    }
}
