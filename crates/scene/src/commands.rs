//! Preset commands from the UI layer
//!
//! Anything that wants to change the presets writes a [`PresetCommand`];
//! the viewer applies them in order before advancing the frame.

use std::time::Instant;

use bevy::prelude::*;
use roomviz_ipc::UiToViewer;

use crate::viewer::{Viewer, drive_viewer};

/// A command for the viewer, as sent by the UI
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetCommand(pub UiToViewer);

/// Plugin wiring [`PresetCommand`] messages to the viewer
pub struct PresetCommandPlugin;

impl Plugin for PresetCommandPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<PresetCommand>()
            .add_systems(Update, apply_preset_commands.before(drive_viewer));
    }
}

fn apply_preset_commands(
    mut preset_commands: MessageReader<PresetCommand>,
    viewer: Option<ResMut<Viewer>>,
) {
    let Some(mut viewer) = viewer else {
        preset_commands.clear();
        return;
    };

    let now = Instant::now();
    for PresetCommand(command) in preset_commands.read() {
        debug!("Applying {:?}", command);
        viewer.apply(*command, now);
    }
}
