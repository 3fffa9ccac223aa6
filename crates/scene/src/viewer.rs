//! Bevy host for the preview controller
//!
//! At startup the graphics device is probed once, presets are restored and
//! the controller is created. Every frame the controller is advanced and
//! its report applied: a loaded room replaces the displayed one, status
//! changes go to the log and the window title, and the adaptive pixel
//! ratio is applied to the primary window.

use std::ops::{Deref, DerefMut};
use std::time::Instant;

use bevy::prelude::*;
use bevy::render::renderer::{RenderAdapterInfo, RenderDevice};
use bevy::window::PrimaryWindow;
use roomviz_config::ViewerConfig;
use roomviz_ipc::{LoadStatus, Preset, PresetSelection, RoomType};
use staging::{
    FilePreferences, GraphicsContextInfo, InMemoryPreferences, PreferenceBackend,
    PreviewController, ProbeError, detect,
};

use crate::loader::BevySceneLoader;
use crate::room::{RoomRoot, RoomSurfaces, show_room};

/// Base window title
pub const WINDOW_TITLE: &str = "Room Preview";

/// Tokio runtime the room loads run on
#[derive(Resource)]
pub struct LoaderRuntime(tokio::runtime::Runtime);

impl LoaderRuntime {
    pub fn new() -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("roomviz-loader")
            .enable_all()
            .build()?;
        Ok(Self(runtime))
    }

    pub fn handle(&self) -> &tokio::runtime::Handle {
        self.0.handle()
    }
}

/// Room requested on the command line, applied after presets are restored
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct InitialRoom(pub Option<RoomType>);

/// The running preview controller
#[derive(Resource)]
pub struct Viewer(PreviewController<BevySceneLoader>);

impl Deref for Viewer {
    type Target = PreviewController<BevySceneLoader>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Viewer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Present instead of [`Viewer`] when the device cannot show the room
#[derive(Resource, Debug, Clone)]
pub struct ViewerUnavailable {
    pub reason: String,
}

/// Plugin creating and driving the [`Viewer`]
pub struct ViewerPlugin;

impl Plugin for ViewerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InitialRoom>()
            .add_systems(Startup, start_viewer)
            .add_systems(Update, drive_viewer);
    }
}

/// Describe the adapter Bevy rendered with
fn probe_graphics(
    adapter: Option<&RenderAdapterInfo>,
    device: Option<&RenderDevice>,
    window: Option<&Window>,
) -> Result<GraphicsContextInfo, ProbeError> {
    let (Some(adapter), Some(device)) = (adapter, device) else {
        return Err(ProbeError::NoAdapter);
    };

    Ok(GraphicsContextInfo {
        backend: format!("{:?}", adapter.backend).to_lowercase(),
        adapter_name: adapter.name.clone(),
        platform: std::env::consts::OS.to_string(),
        mobile_device: cfg!(any(target_os = "android", target_os = "ios")),
        max_texture_dimension_2d: device.limits().max_texture_dimension_2d,
        native_pixel_ratio: window.map_or(1.0, |window| window.resolution.base_scale_factor()),
    })
}

fn preference_backend(config: &ViewerConfig) -> Box<dyn PreferenceBackend> {
    match &config.preferences.path {
        Some(path) => {
            info!("Presets are kept in {}", path.display());
            Box::new(FilePreferences::new(path.clone()))
        }
        None => {
            info!("No preference file configured, presets are not persisted");
            Box::new(InMemoryPreferences::new())
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn start_viewer(
    mut commands: Commands,
    config: Option<Res<ViewerConfig>>,
    runtime: Option<Res<LoaderRuntime>>,
    initial_room: Res<InitialRoom>,
    asset_server: Res<AssetServer>,
    adapter: Option<Res<RenderAdapterInfo>>,
    device: Option<Res<RenderDevice>>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let config = config.map(|config| (*config).clone()).unwrap_or_default();
    let window = windows.single().ok();

    let capabilities = detect(&|| probe_graphics(adapter.as_deref(), device.as_deref(), window));

    let Some(runtime) = runtime else {
        error!("No loader runtime; room models cannot be loaded");
        commands.insert_resource(ViewerUnavailable {
            reason: "no loader runtime".to_string(),
        });
        return;
    };

    let loader = BevySceneLoader::new(asset_server.clone(), config.models_dir.clone());
    let controller = PreviewController::new(
        &config,
        capabilities,
        preference_backend(&config),
        loader,
        runtime.handle().clone(),
    );

    match controller {
        Ok(mut controller) => {
            if let Some(room) = initial_room.0 {
                controller.select_room(room, Instant::now());
            }
            if let Ok(mut window) = windows.single_mut() {
                window.title = window_title(&controller.status(), controller.selection());
            }
            commands.insert_resource(Viewer(controller));
        }
        Err(e) => {
            error!("3D preview unavailable: {}", e);
            if let Ok(mut window) = windows.single_mut() {
                window.title = format!("{} - 3D preview unavailable", WINDOW_TITLE);
            }
            commands.insert_resource(ViewerUnavailable {
                reason: e.to_string(),
            });
        }
    }
}

/// Advance the controller one frame and apply its report
pub(crate) fn drive_viewer(
    mut commands: Commands,
    viewer: Option<ResMut<Viewer>>,
    time: Res<Time>,
    mut surfaces: ResMut<RoomSurfaces>,
    roots: Query<Entity, With<RoomRoot>>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let Some(mut viewer) = viewer else {
        return;
    };

    let report = viewer.frame(time.delta_secs(), Instant::now());

    if let Some((room, scene)) = report.scene {
        show_room(&mut commands, &mut surfaces, roots.iter(), room, scene);
    }

    for e in &report.errors {
        error!("{}", e);
    }

    let Ok(mut window) = windows.single_mut() else {
        return;
    };
    if let Some(status) = &report.status {
        debug!("Load status: {:?}", status);
    }
    // Presets change without a status change, so compare every frame
    let title = window_title(&viewer.status(), viewer.selection());
    if window.title != title {
        window.title = title;
    }
    if let Some(ratio) = report.pixel_ratio {
        window.resolution.set_scale_factor_override(Some(ratio));
    }
}

/// Window title for a load status
pub fn window_title(status: &LoadStatus, selection: PresetSelection) -> String {
    let presets = format!(
        "{} / {} / {}",
        selection.style_preset.label(),
        selection.color_theme.label(),
        selection.lighting_mood.label()
    );
    match status {
        LoadStatus::Idle => WINDOW_TITLE.to_string(),
        LoadStatus::Loading { room, attempt: 0 } => {
            format!("{} - Loading {}...", WINDOW_TITLE, room.label())
        }
        LoadStatus::Loading { room, attempt } => format!(
            "{} - Loading {} (retry {})...",
            WINDOW_TITLE,
            room.label(),
            attempt
        ),
        LoadStatus::Ready { room } => {
            format!("{} - {} ({})", WINDOW_TITLE, room.label(), presets)
        }
        LoadStatus::RetryScheduled { room, delay_ms, .. } => format!(
            "{} - {} failed, retrying in {:.1}s",
            WINDOW_TITLE,
            room.label(),
            *delay_ms as f32 / 1000.0
        ),
        LoadStatus::Exhausted { room, .. } => format!(
            "{} - Could not load {}",
            WINDOW_TITLE,
            room.label()
        ),
    }
}
