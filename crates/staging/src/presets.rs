//! Static tables from presets to numeric render targets.

use glam::Vec3;
use roomviz_ipc::{ColorTheme, LightingMood, StylePreset};

/// `0xRRGGBB` to display-space RGB in `[0, 1]`
pub const fn rgb_hex(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

/// Colors a theme contributes to the room
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemePalette {
    pub primary: Vec3,
    pub secondary: Vec3,
    pub accent: Vec3,
}

impl ThemePalette {
    pub const fn for_theme(theme: ColorTheme) -> Self {
        match theme {
            ColorTheme::Warm => Self {
                primary: rgb_hex(0xD4A574),
                secondary: rgb_hex(0x8B4513),
                accent: rgb_hex(0xCD853F),
            },
            ColorTheme::Cool => Self {
                primary: rgb_hex(0x4A90A4),
                secondary: rgb_hex(0x2C5F75),
                accent: rgb_hex(0x7FB3D5),
            },
            ColorTheme::Neutral => Self {
                primary: rgb_hex(0xA8A8A8),
                secondary: rgb_hex(0x5A5A5A),
                accent: rgb_hex(0xD3D3D3),
            },
        }
    }
}

/// Surface response of a style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceFinish {
    pub roughness: f32,
    pub metalness: f32,
}

impl SurfaceFinish {
    pub const fn for_style(style: StylePreset) -> Self {
        match style {
            StylePreset::Modern => Self {
                roughness: 0.2,
                metalness: 0.5,
            },
            StylePreset::Boho => Self {
                roughness: 0.8,
                metalness: 0.1,
            },
            StylePreset::Minimalist => Self {
                roughness: 0.4,
                metalness: 0.2,
            },
        }
    }
}

/// Resolved material values every room surface blends toward
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialTarget {
    pub base_color: Vec3,
    pub roughness: f32,
    pub metalness: f32,
}

impl MaterialTarget {
    /// Finish from the style, base color from the theme's primary color
    pub const fn resolve(style: StylePreset, theme: ColorTheme) -> Self {
        let finish = SurfaceFinish::for_style(style);
        Self {
            base_color: ThemePalette::for_theme(theme).primary,
            roughness: finish.roughness,
            metalness: finish.metalness,
        }
    }
}

/// Resolved light rig values for a mood
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingTarget {
    pub ambient_intensity: f32,
    pub directional_intensity: f32,
    pub directional_position: Vec3,
    pub color: Vec3,
}

impl LightingTarget {
    pub const fn resolve(mood: LightingMood) -> Self {
        match mood {
            LightingMood::Morning => Self {
                ambient_intensity: 0.8,
                directional_intensity: 1.0,
                directional_position: Vec3::new(5.0, 8.0, 3.0),
                color: rgb_hex(0xFFF5E1),
            },
            LightingMood::Evening => Self {
                ambient_intensity: 0.5,
                directional_intensity: 0.7,
                directional_position: Vec3::new(3.0, 5.0, 5.0),
                color: rgb_hex(0xFFB366),
            },
            LightingMood::Night => Self {
                ambient_intensity: 0.3,
                directional_intensity: 0.4,
                directional_position: Vec3::new(2.0, 6.0, 4.0),
                color: rgb_hex(0xB0C4DE),
            },
        }
    }
}
