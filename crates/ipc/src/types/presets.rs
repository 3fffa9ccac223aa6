//! Discrete presets the user picks between.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::IpcError;

/// Common surface of the four preset enums.
pub trait Preset: Copy + Eq + fmt::Debug + 'static {
    /// Name used in error messages
    const KIND: &'static str;
    /// Every value, in display order
    const ALL: &'static [Self];

    /// Stable kebab-case identifier, also used on disk
    fn id(self) -> &'static str;

    /// Human-readable label
    fn label(self) -> &'static str;

    /// Look up a preset by its identifier
    fn from_id(id: &str) -> Result<Self, IpcError> {
        Self::ALL
            .iter()
            .copied()
            .find(|preset| preset.id() == id)
            .ok_or_else(|| IpcError::UnknownPreset {
                kind: Self::KIND,
                value: id.to_string(),
            })
    }
}

/// Room layout whose model is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoomType {
    #[default]
    LivingRoom,
    Bedroom,
    Office,
}

impl RoomType {
    /// File name of the room's glTF binary
    pub fn model_file(self) -> String {
        format!("{}.glb", self.id())
    }
}

impl Preset for RoomType {
    const KIND: &'static str = "room";
    const ALL: &'static [Self] = &[Self::LivingRoom, Self::Bedroom, Self::Office];

    fn id(self) -> &'static str {
        match self {
            Self::LivingRoom => "living-room",
            Self::Bedroom => "bedroom",
            Self::Office => "office",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::LivingRoom => "Living Room",
            Self::Bedroom => "Bedroom",
            Self::Office => "Office",
        }
    }
}

/// Furnishing style, drives surface roughness and metalness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StylePreset {
    #[default]
    Modern,
    Boho,
    Minimalist,
}

impl Preset for StylePreset {
    const KIND: &'static str = "style";
    const ALL: &'static [Self] = &[Self::Modern, Self::Boho, Self::Minimalist];

    fn id(self) -> &'static str {
        match self {
            Self::Modern => "modern",
            Self::Boho => "boho",
            Self::Minimalist => "minimalist",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Modern => "Modern",
            Self::Boho => "Boho",
            Self::Minimalist => "Minimalist",
        }
    }
}

/// Color palette applied to room surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorTheme {
    #[default]
    Warm,
    Cool,
    Neutral,
}

impl Preset for ColorTheme {
    const KIND: &'static str = "color theme";
    const ALL: &'static [Self] = &[Self::Warm, Self::Cool, Self::Neutral];

    fn id(self) -> &'static str {
        match self {
            Self::Warm => "warm",
            Self::Cool => "cool",
            Self::Neutral => "neutral",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Warm => "Warm",
            Self::Cool => "Cool",
            Self::Neutral => "Neutral",
        }
    }
}

/// Time-of-day lighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LightingMood {
    #[default]
    Morning,
    Evening,
    Night,
}

impl Preset for LightingMood {
    const KIND: &'static str = "lighting mood";
    const ALL: &'static [Self] = &[Self::Morning, Self::Evening, Self::Night];

    fn id(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Evening => "evening",
            Self::Night => "night",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Evening => "Evening",
            Self::Night => "Night",
        }
    }
}

macro_rules! impl_preset_traits {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.id())
                }
            }

            impl FromStr for $ty {
                type Err = IpcError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Self::from_id(s)
                }
            }
        )*
    };
}

impl_preset_traits!(RoomType, StylePreset, ColorTheme, LightingMood);

/// The four current presets, always fully defined.
///
/// Defaults are living room, modern, warm, morning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetSelection {
    pub room_type: RoomType,
    pub style_preset: StylePreset,
    pub color_theme: ColorTheme,
    pub lighting_mood: LightingMood,
}

impl PresetSelection {
    pub fn with_room(self, room_type: RoomType) -> Self {
        Self { room_type, ..self }
    }

    pub fn with_style(self, style_preset: StylePreset) -> Self {
        Self {
            style_preset,
            ..self
        }
    }

    pub fn with_color_theme(self, color_theme: ColorTheme) -> Self {
        Self {
            color_theme,
            ..self
        }
    }

    pub fn with_lighting_mood(self, lighting_mood: LightingMood) -> Self {
        Self {
            lighting_mood,
            ..self
        }
    }
}
