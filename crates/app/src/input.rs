//! Keyboard preset hotkeys
//!
//! - 1 / 2 / 3: Living room, bedroom, office
//! - Q / W / E: Modern, boho, minimalist style
//! - A / S / D: Warm, cool, neutral colors
//! - Z / X / C: Morning, evening, night lighting
//! - Ctrl+S: Save presets now

use bevy::input::InputSystems;
use bevy::prelude::*;
use roomviz_ipc::{ColorTheme, LightingMood, RoomType, StylePreset, UiToViewer};
use roomviz_scene::PresetCommand;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreUpdate, handle_preset_hotkeys.after(InputSystems));
        info!("Input plugin initialized");
    }
}

/// Command bound to a key pressed without modifiers
fn preset_for_key(key: KeyCode) -> Option<UiToViewer> {
    let command = match key {
        KeyCode::Digit1 => UiToViewer::SelectRoom(RoomType::LivingRoom),
        KeyCode::Digit2 => UiToViewer::SelectRoom(RoomType::Bedroom),
        KeyCode::Digit3 => UiToViewer::SelectRoom(RoomType::Office),
        KeyCode::KeyQ => UiToViewer::SelectStyle(StylePreset::Modern),
        KeyCode::KeyW => UiToViewer::SelectStyle(StylePreset::Boho),
        KeyCode::KeyE => UiToViewer::SelectStyle(StylePreset::Minimalist),
        KeyCode::KeyA => UiToViewer::SelectColorTheme(ColorTheme::Warm),
        KeyCode::KeyS => UiToViewer::SelectColorTheme(ColorTheme::Cool),
        KeyCode::KeyD => UiToViewer::SelectColorTheme(ColorTheme::Neutral),
        KeyCode::KeyZ => UiToViewer::SelectLightingMood(LightingMood::Morning),
        KeyCode::KeyX => UiToViewer::SelectLightingMood(LightingMood::Evening),
        KeyCode::KeyC => UiToViewer::SelectLightingMood(LightingMood::Night),
        _ => return None,
    };
    Some(command)
}

fn handle_preset_hotkeys(
    key_input: Res<ButtonInput<KeyCode>>,
    mut preset_commands: MessageWriter<PresetCommand>,
) {
    let ctrl = key_input.pressed(KeyCode::ControlLeft) || key_input.pressed(KeyCode::ControlRight);

    // Ctrl+S saves instead of picking the cool theme
    if ctrl {
        if key_input.just_pressed(KeyCode::KeyS) {
            info!("Saving presets (Ctrl+S)");
            preset_commands.write(PresetCommand(UiToViewer::SavePreferences));
        }
        return;
    }

    for key in key_input.get_just_pressed() {
        if let Some(command) = preset_for_key(*key) {
            preset_commands.write(PresetCommand(command));
        }
    }
}
