//! Room preview viewer - interactive 3D room with preset transitions
//!
//! Usage: `roomviz [room]` where `room` is `living-room`, `bedroom` or
//! `office`. Without one the last saved room is shown.

use bevy::prelude::*;
use bevy::window::WindowResolution;
use roomviz_config::ViewerConfig;
use roomviz_ipc::{IpcError, RoomType};
use roomviz_scene::{InitialRoom, LoaderRuntime, ScenePlugin, WINDOW_TITLE};

mod input;

/// Room named by the first argument. An unknown name yields the default
/// room together with the parse error.
fn initial_room(arg: Option<&str>) -> (Option<RoomType>, Option<IpcError>) {
    match arg.map(str::parse::<RoomType>) {
        None => (None, None),
        Some(Ok(room)) => (Some(room), None),
        Some(Err(e)) => (Some(RoomType::default()), Some(e)),
    }
}

fn main() {
    let config = ViewerConfig::from_env();

    let display = &config.display;
    let window_config = Window {
        title: WINDOW_TITLE.into(),
        resolution: WindowResolution::new(display.width, display.height),
        present_mode: bevy::window::PresentMode::AutoVsync,
        ..default()
    };

    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(window_config),
                ..default()
            })
            .set(bevy::log::LogPlugin {
                level: bevy::log::Level::INFO,
                ..default()
            }),
    );

    // Logging is up from here on
    let args: Vec<String> = std::env::args().collect();
    let (room, rejected) = initial_room(args.get(1).map(String::as_str));
    if let Some(e) = rejected {
        warn!("{}; showing {}", e, RoomType::default());
    }

    let runtime = match LoaderRuntime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start loader runtime: {}", e);
            std::process::exit(1);
        }
    };

    info!("Models are read from {}", config.models_dir.display());

    app.insert_resource(config)
        .insert_resource(runtime)
        .insert_resource(InitialRoom(room));

    app.add_plugins(ScenePlugin)
        .add_plugins(input::InputPlugin)
        .run();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_room_argument() {
        assert!(matches!(initial_room(None), (None, None)));
        assert!(matches!(
            initial_room(Some("office")),
            (Some(RoomType::Office), None)
        ));
        assert!(matches!(
            initial_room(Some("garage")),
            (Some(RoomType::LivingRoom), Some(_))
        ));
    }
}
