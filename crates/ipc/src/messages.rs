//! Commands from the UI layer and load status reported back to it.

use serde::{Deserialize, Serialize};

use crate::types::{ColorTheme, LightingMood, RoomType, StylePreset};

/// Messages from the UI to the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UiToViewer {
    /// Switch the displayed room; starts a model load
    SelectRoom(RoomType),
    /// Switch the furnishing style
    SelectStyle(StylePreset),
    /// Switch the color palette
    SelectColorTheme(ColorTheme),
    /// Switch the time-of-day lighting
    SelectLightingMood(LightingMood),
    /// Persist the current presets without waiting for the debounce
    SavePreferences,
}

/// Progress of the current room model load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum LoadStatus {
    /// No room requested yet
    Idle,
    /// A load request is in flight; `attempt` is 0 for the first try
    Loading { room: RoomType, attempt: u32 },
    /// The room model is in the scene
    Ready { room: RoomType },
    /// The last load failed and a retry is scheduled
    RetryScheduled {
        room: RoomType,
        attempt: u32,
        delay_ms: u64,
        error: String,
    },
    /// All retries failed; waits for a different room selection
    Exhausted { room: RoomType, error: String },
}
