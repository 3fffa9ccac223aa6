//! Persisted preference document and the backends that hold it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use roomviz_config::STORAGE_VERSION;
use roomviz_ipc::{ColorTheme, LightingMood, PresetSelection, RoomType, StylePreset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("preference storage I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("preference document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("preference document version {found} is not supported")]
    Version { found: String },
}

/// Raw key-value storage for the preference document.
pub trait PreferenceBackend: Send + Sync {
    /// The stored document, or `None` if nothing was saved yet
    fn read(&self) -> Result<Option<String>, PreferenceError>;

    fn write(&self, document: &str) -> Result<(), PreferenceError>;
}

/// On-disk shape of the saved presets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPreferences {
    pub version: String,
    pub room_type: RoomType,
    pub style_preset: StylePreset,
    pub color_theme: ColorTheme,
    pub lighting_mood: LightingMood,
    /// Milliseconds since the Unix epoch
    pub last_updated: u64,
}

impl StoredPreferences {
    pub fn new(selection: &PresetSelection, last_updated: u64) -> Self {
        Self {
            version: STORAGE_VERSION.to_string(),
            room_type: selection.room_type,
            style_preset: selection.style_preset,
            color_theme: selection.color_theme,
            lighting_mood: selection.lighting_mood,
            last_updated,
        }
    }

    pub fn selection(&self) -> PresetSelection {
        PresetSelection {
            room_type: self.room_type,
            style_preset: self.style_preset,
            color_theme: self.color_theme,
            lighting_mood: self.lighting_mood,
        }
    }

    /// Parse and version-check a stored document
    pub fn decode(document: &str) -> Result<Self, PreferenceError> {
        let stored: Self = serde_json::from_str(document)?;
        if stored.version != STORAGE_VERSION {
            return Err(PreferenceError::Version {
                found: stored.version,
            });
        }
        Ok(stored)
    }

    pub fn encode(&self) -> Result<String, PreferenceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Result of reading persisted presets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistedSelection {
    Found(PresetSelection),
    NotFound,
    /// Present but unusable; carries the reason
    Corrupt(String),
}

/// Read the persisted selection. Never fails; problems become `Corrupt`.
pub fn load_selection(backend: &dyn PreferenceBackend) -> PersistedSelection {
    let document = match backend.read() {
        Ok(Some(document)) => document,
        Ok(None) => return PersistedSelection::NotFound,
        Err(e) => return PersistedSelection::Corrupt(e.to_string()),
    };
    match StoredPreferences::decode(&document) {
        Ok(stored) => PersistedSelection::Found(stored.selection()),
        Err(e) => PersistedSelection::Corrupt(e.to_string()),
    }
}

/// Write the selection with the current wall-clock time
pub fn save_selection(
    backend: &dyn PreferenceBackend,
    selection: &PresetSelection,
) -> Result<(), PreferenceError> {
    let document = StoredPreferences::new(selection, unix_millis()).encode()?;
    backend.write(&document)
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Preference document stored as a JSON file
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
}

impl FilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceBackend for FilePreferences {
    fn read(&self) -> Result<Option<String>, PreferenceError> {
        match fs::read_to_string(&self.path) {
            Ok(document) => Ok(Some(document)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, document: &str) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        // Staged write, renamed over the target
        let staged = self.path.with_extension("json.tmp");
        fs::write(&staged, document)?;
        fs::rename(&staged, &self.path)?;
        Ok(())
    }
}

/// Preference document kept in memory for hosts without storage
#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    document: Mutex<Option<String>>,
}

impl InMemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing document
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: Mutex::new(Some(document.into())),
        }
    }

    pub fn document(&self) -> Option<String> {
        self.document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl PreferenceBackend for InMemoryPreferences {
    fn read(&self) -> Result<Option<String>, PreferenceError> {
        Ok(self.document())
    }

    fn write(&self, document: &str) -> Result<(), PreferenceError> {
        *self
            .document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(document.to_string());
        Ok(())
    }
}
