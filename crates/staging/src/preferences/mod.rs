//! Current presets and their persistence.
//!
//! [`PreferenceStore`] is the single owner of the [`PresetSelection`]. Every
//! setter reschedules a debounced save; the host drives the debounce by
//! calling [`PreferenceStore::flush_due`] once per frame.

mod storage;

pub use storage::*;

use std::time::{Duration, Instant};

use roomviz_ipc::{ColorTheme, LightingMood, PresetSelection, RoomType, StylePreset};
use tracing::{debug, info, warn};

use crate::error::StagingError;

pub struct PreferenceStore {
    selection: PresetSelection,
    backend: Box<dyn PreferenceBackend>,
    debounce: Duration,
    save_at: Option<Instant>,
    recovered: Option<StagingError>,
}

impl PreferenceStore {
    /// Restore the persisted selection, falling back to defaults.
    ///
    /// Missing and corrupt documents both yield [`PresetSelection::default`];
    /// a corrupt one is logged and kept as [`Self::recovered_from`].
    pub fn restore(backend: Box<dyn PreferenceBackend>, debounce: Duration) -> Self {
        let (selection, recovered) = match load_selection(backend.as_ref()) {
            PersistedSelection::Found(selection) => {
                info!("Restored presets: {:?}", selection);
                (selection, None)
            }
            PersistedSelection::NotFound => {
                info!("No saved presets, using defaults");
                (PresetSelection::default(), None)
            }
            PersistedSelection::Corrupt(reason) => {
                let error = StagingError::CorruptPersistedState(reason);
                warn!("{}; using defaults", error);
                (PresetSelection::default(), Some(error))
            }
        };

        Self {
            selection,
            backend,
            debounce,
            save_at: None,
            recovered,
        }
    }

    pub fn selection(&self) -> PresetSelection {
        self.selection
    }

    /// The error recovered from while restoring, if any
    pub fn recovered_from(&self) -> Option<&StagingError> {
        self.recovered.as_ref()
    }

    /// When the pending save will be written
    pub fn save_deadline(&self) -> Option<Instant> {
        self.save_at
    }

    pub fn set_room_type(&mut self, room_type: RoomType, now: Instant) -> bool {
        self.update(self.selection.with_room(room_type), now)
    }

    pub fn set_style_preset(&mut self, style_preset: StylePreset, now: Instant) -> bool {
        self.update(self.selection.with_style(style_preset), now)
    }

    pub fn set_color_theme(&mut self, color_theme: ColorTheme, now: Instant) -> bool {
        self.update(self.selection.with_color_theme(color_theme), now)
    }

    pub fn set_lighting_mood(&mut self, lighting_mood: LightingMood, now: Instant) -> bool {
        self.update(self.selection.with_lighting_mood(lighting_mood), now)
    }

    /// Write the pending save if its deadline has passed.
    ///
    /// Returns whether a save was attempted. A failed save is not retried
    /// until the next change.
    pub fn flush_due(&mut self, now: Instant) -> Result<bool, PreferenceError> {
        match self.save_at {
            Some(deadline) if now >= deadline => {
                self.save_now()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Write immediately, cancelling any pending debounced save.
    pub fn save_now(&mut self) -> Result<(), PreferenceError> {
        self.save_at = None;
        save_selection(self.backend.as_ref(), &self.selection)?;
        debug!("Saved presets: {:?}", self.selection);
        Ok(())
    }

    fn update(&mut self, next: PresetSelection, now: Instant) -> bool {
        if next == self.selection {
            return false;
        }
        self.selection = next;
        self.save_at = Some(now + self.debounce);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Shares one in-memory document between the store and the test
    struct Shared(Arc<InMemoryPreferences>);

    impl PreferenceBackend for Shared {
        fn read(&self) -> Result<Option<String>, PreferenceError> {
            self.0.read()
        }

        fn write(&self, document: &str) -> Result<(), PreferenceError> {
            self.0.write(document)
        }
    }

    struct Unwritable;

    impl PreferenceBackend for Unwritable {
        fn read(&self) -> Result<Option<String>, PreferenceError> {
            Ok(None)
        }

        fn write(&self, _document: &str) -> Result<(), PreferenceError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
        }
    }

    const DEBOUNCE: Duration = Duration::from_millis(500);

    fn store_with(document: Option<&str>) -> (PreferenceStore, Arc<InMemoryPreferences>) {
        let memory = Arc::new(match document {
            Some(document) => InMemoryPreferences::with_document(document),
            None => InMemoryPreferences::new(),
        });
        let store = PreferenceStore::restore(Box::new(Shared(memory.clone())), DEBOUNCE);
        (store, memory)
    }

    fn expected_defaults() -> PresetSelection {
        PresetSelection {
            room_type: RoomType::LivingRoom,
            style_preset: StylePreset::Modern,
            color_theme: ColorTheme::Warm,
            lighting_mood: LightingMood::Morning,
        }
    }

    #[test]
    fn test_missing_falls_back_to_defaults() {
        let (store, _) = store_with(None);
        assert_eq!(store.selection(), expected_defaults());
        assert!(store.recovered_from().is_none());
    }

    #[test]
    fn test_corrupt_falls_back_to_defaults() {
        let (store, _) = store_with(Some("\u{0}garbage"));
        assert_eq!(store.selection(), expected_defaults());
        assert!(matches!(
            store.recovered_from(),
            Some(StagingError::CorruptPersistedState(_))
        ));
    }

    #[test]
    fn test_restores_saved_selection() {
        let (store, _) = store_with(Some(
            r#"{"version":"1.0","roomType":"office","stylePreset":"minimalist","colorTheme":"cool","lightingMood":"evening","lastUpdated":1}"#,
        ));
        assert_eq!(store.selection().room_type, RoomType::Office);
        assert_eq!(store.selection().style_preset, StylePreset::Minimalist);
        assert_eq!(store.selection().lighting_mood, LightingMood::Evening);
    }

    #[test]
    fn test_setter_reports_change() {
        let (mut store, _) = store_with(None);
        let now = Instant::now();
        assert!(!store.set_room_type(RoomType::LivingRoom, now));
        assert_eq!(store.save_deadline(), None);
        assert!(store.set_room_type(RoomType::Bedroom, now));
        assert_eq!(store.selection().room_type, RoomType::Bedroom);
    }

    #[test]
    fn test_save_is_debounced() {
        let (mut store, memory) = store_with(None);
        let start = Instant::now();
        store.set_style_preset(StylePreset::Boho, start);
        store.set_color_theme(ColorTheme::Cool, start + Duration::from_millis(300));

        // The second change pushed the deadline out
        assert!(!store.flush_due(start + Duration::from_millis(600)).unwrap());
        assert!(memory.document().is_none());

        assert!(store.flush_due(start + Duration::from_millis(800)).unwrap());
        let saved = StoredPreferences::decode(&memory.document().unwrap()).unwrap();
        assert_eq!(saved.style_preset, StylePreset::Boho);
        assert_eq!(saved.color_theme, ColorTheme::Cool);

        // Nothing pending afterwards
        assert!(!store.flush_due(start + Duration::from_secs(10)).unwrap());
    }

    #[test]
    fn test_save_now_cancels_pending() {
        let (mut store, memory) = store_with(None);
        let now = Instant::now();
        store.set_lighting_mood(LightingMood::Night, now);
        store.save_now().unwrap();
        assert_eq!(store.save_deadline(), None);
        let saved = StoredPreferences::decode(&memory.document().unwrap()).unwrap();
        assert_eq!(saved.lighting_mood, LightingMood::Night);
    }

    #[test]
    fn test_failed_save_reports_error_once() {
        let mut store = PreferenceStore::restore(Box::new(Unwritable), DEBOUNCE);
        let now = Instant::now();
        store.set_room_type(RoomType::Office, now);
        assert!(store.flush_due(now + DEBOUNCE).is_err());
        assert!(!store.flush_due(now + DEBOUNCE * 4).unwrap());
    }
}
