//! Shared configuration for the room preview viewer
//!
//! This crate is the single source of truth for window dimensions, transition
//! timing, asset retry policy and preference persistence settings shared by
//! the controller core and the Bevy front end.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;

/// Default window width in pixels
pub const DEFAULT_WIDTH: u32 = 1920;

/// Default window height in pixels
pub const DEFAULT_HEIGHT: u32 = 1080;

/// Time constant for material blends, in seconds
pub const MATERIAL_TIME_CONSTANT: f32 = 0.5;

/// Time constant for lighting blends, in seconds
pub const LIGHTING_TIME_CONSTANT: f32 = 0.8;

/// Automatic retries after the first failed load of a room
pub const MAX_RETRIES: u32 = 3;

/// Backoff before the first retry; doubles with every attempt
pub const RETRY_BASE_DELAY_MS: u64 = 1000;

/// Delay between the last preset change and the persisted save
pub const SAVE_DEBOUNCE_MS: u64 = 500;

/// Version tag written into the persisted preference document
pub const STORAGE_VERSION: &str = "1.0";

/// Frame rate the adaptive quality governor aims for
pub const DEFAULT_TARGET_FPS: f32 = 30.0;

/// Directional shadow map resolution on desktop-class devices
pub const SHADOW_MAP_BASE_SIZE: u32 = 2048;

/// Directory holding `<room>.glb` models, relative to the asset root
pub const DEFAULT_MODELS_DIR: &str = "models";

/// File the preference document is written to when none is configured
pub const DEFAULT_PREFERENCES_FILE: &str = "roomviz-preferences.json";

/// Environment variable overriding [`ViewerConfig::models_dir`]
pub const ENV_MODELS_DIR: &str = "ROOMVIZ_MODELS_DIR";

/// Environment variable overriding the preference file; `memory` disables persistence
pub const ENV_PREFERENCES: &str = "ROOMVIZ_PREFERENCES";

/// Environment variable overriding [`ViewerConfig::target_fps`]
pub const ENV_TARGET_FPS: &str = "ROOMVIZ_TARGET_FPS";

/// Initial window size
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Window width in logical pixels
    pub width: u32,
    /// Window height in logical pixels
    pub height: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// Blend time constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionConfig {
    /// Seconds for material color/roughness/metalness blends
    pub material_time_constant: f32,
    /// Seconds for ambient/directional light blends
    pub lighting_time_constant: f32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            material_time_constant: MATERIAL_TIME_CONSTANT,
            lighting_time_constant: LIGHTING_TIME_CONSTANT,
        }
    }
}

/// Bounded exponential backoff for room model loads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries allowed after the initial attempt
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            base_delay_ms: RETRY_BASE_DELAY_MS,
        }
    }
}

impl RetryConfig {
    /// Backoff to wait after a failure that happened at `attempt_count`.
    ///
    /// `base * 2^attempt_count`, saturating instead of overflowing.
    pub fn backoff(&self, attempt_count: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt_count).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

/// Where and how presets are persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferencesConfig {
    /// Preference document path; `None` keeps preferences in memory only
    pub path: Option<PathBuf>,
    /// Debounce between the last change and the write, in milliseconds
    pub debounce_ms: u64,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from(DEFAULT_PREFERENCES_FILE)),
            debounce_ms: SAVE_DEBOUNCE_MS,
        }
    }
}

impl PreferencesConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Top-level viewer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
pub struct ViewerConfig {
    pub display: DisplayConfig,
    pub transitions: TransitionConfig,
    pub retry: RetryConfig,
    pub preferences: PreferencesConfig,
    /// Directory of room models, relative to the asset root
    pub models_dir: PathBuf,
    /// Frame rate below which rendering quality is reduced
    pub target_fps: f32,
    /// Shadow map resolution before capability adjustments
    pub shadow_map_size: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            transitions: TransitionConfig::default(),
            retry: RetryConfig::default(),
            preferences: PreferencesConfig::default(),
            models_dir: PathBuf::from(DEFAULT_MODELS_DIR),
            target_fps: DEFAULT_TARGET_FPS,
            shadow_map_size: SHADOW_MAP_BASE_SIZE,
        }
    }
}

impl ViewerConfig {
    /// Defaults with overrides from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides from an arbitrary key lookup.
    ///
    /// Values that fail to parse leave the default in place.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_MODELS_DIR).filter(|dir| !dir.is_empty()) {
            config.models_dir = PathBuf::from(dir);
        }

        match lookup(ENV_PREFERENCES).as_deref() {
            Some("memory") => config.preferences.path = None,
            Some(path) if !path.is_empty() => config.preferences.path = Some(PathBuf::from(path)),
            _ => {}
        }

        if let Some(fps) = lookup(ENV_TARGET_FPS)
            .and_then(|value| value.parse::<f32>().ok())
            .filter(|fps| fps.is_finite() && *fps > 0.0)
        {
            config.target_fps = fps;
        }

        config
    }
}
