//! The per-frame controller tying presets, interpolators and loads together.

use std::time::Instant;

use roomviz_config::ViewerConfig;
use roomviz_ipc::{
    Capabilities, ColorTheme, LightingMood, LoadStatus, PresetSelection, RoomType, StylePreset,
    UiToViewer,
};
use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::dispatch::{LoadDispatcher, SceneLoader};
use crate::error::StagingError;
use crate::lighting::LightingInterpolator;
use crate::load::{AssetLoadController, Completion};
use crate::material::{MaterialInterpolator, MaterialState};
use crate::preferences::{PreferenceBackend, PreferenceStore};
use crate::presets::{LightingTarget, MaterialTarget};
use crate::scene::{LightRig, MeshId, SceneHandle, ShadowSettings};
use crate::stats::{AdaptiveQuality, FrameStats};

/// What happened during one [`PreviewController::frame`].
#[derive(Debug)]
pub struct FrameReport<S> {
    /// A room finished loading; the host replaces the displayed room with it
    pub scene: Option<(RoomType, S)>,
    /// The load status, when it differs from the previous frame
    pub status: Option<LoadStatus>,
    /// Loads that gave up this frame
    pub errors: Vec<StagingError>,
    /// New render pixel ratio, when the quality governor changed it
    pub pixel_ratio: Option<f32>,
}

impl<S> Default for FrameReport<S> {
    fn default() -> Self {
        Self {
            scene: None,
            status: None,
            errors: Vec::new(),
            pixel_ratio: None,
        }
    }
}

/// Owns every piece of viewer state that changes over time.
///
/// All mutation happens on the caller's thread through [`Self::frame`] and the
/// selection methods. Only the load futures run elsewhere.
pub struct PreviewController<L: SceneLoader> {
    capabilities: Capabilities,
    preferences: PreferenceStore,
    materials: MaterialInterpolator,
    lighting: LightingInterpolator,
    loads: AssetLoadController,
    dispatcher: LoadDispatcher<L>,
    stats: FrameStats,
    quality: AdaptiveQuality,
    last_status: LoadStatus,
}

impl<L: SceneLoader> PreviewController<L> {
    /// Restore presets, set up the interpolators and start loading the room.
    ///
    /// Fails only when the device cannot render 3D at all.
    pub fn new(
        config: &ViewerConfig,
        capabilities: Capabilities,
        backend: Box<dyn PreferenceBackend>,
        loader: L,
        runtime: Handle,
    ) -> Result<Self, StagingError> {
        if !capabilities.graphics_supported {
            return Err(StagingError::CapabilityUnsupported(
                "no usable graphics context".to_string(),
            ));
        }

        let preferences = PreferenceStore::restore(backend, config.preferences.debounce());
        let selection = preferences.selection();

        let materials = MaterialInterpolator::new(
            MaterialTarget::resolve(selection.style_preset, selection.color_theme),
            config.transitions.material_time_constant,
        );
        let lighting = LightingInterpolator::new(
            LightingTarget::resolve(selection.lighting_mood),
            config.transitions.lighting_time_constant,
            ShadowSettings::for_device(&capabilities, config.shadow_map_size),
        );

        let mut controller = Self {
            capabilities,
            preferences,
            materials,
            lighting,
            loads: AssetLoadController::new(config.retry),
            dispatcher: LoadDispatcher::new(loader, runtime),
            stats: FrameStats::new(),
            quality: AdaptiveQuality::new(
                capabilities.preferred_pixel_ratio_range,
                config.target_fps,
            ),
            last_status: LoadStatus::Idle,
        };

        if let Some(ticket) = controller.loads.select_room(selection.room_type) {
            controller.dispatcher.dispatch(ticket);
        }
        Ok(controller)
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn selection(&self) -> PresetSelection {
        self.preferences.selection()
    }

    /// Set if restoring presets had to fall back to defaults
    pub fn recovered_from(&self) -> Option<&StagingError> {
        self.preferences.recovered_from()
    }

    pub fn status(&self) -> LoadStatus {
        self.loads.status()
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.quality.pixel_ratio()
    }

    pub fn material_state(&self, mesh: MeshId) -> Option<&MaterialState> {
        self.materials.state(mesh)
    }

    /// Apply a command from the UI layer.
    pub fn apply(&mut self, command: UiToViewer, now: Instant) {
        match command {
            UiToViewer::SelectRoom(room) => self.select_room(room, now),
            UiToViewer::SelectStyle(style) => self.select_style(style, now),
            UiToViewer::SelectColorTheme(theme) => self.select_color_theme(theme, now),
            UiToViewer::SelectLightingMood(mood) => self.select_lighting_mood(mood, now),
            UiToViewer::SavePreferences => self.save_preferences(),
        }
    }

    /// Switch rooms. A different room abandons any pending load or retry.
    pub fn select_room(&mut self, room: RoomType, now: Instant) {
        self.preferences.set_room_type(room, now);
        if let Some(ticket) = self.loads.select_room(room) {
            self.dispatcher.dispatch(ticket);
        }
    }

    pub fn select_style(&mut self, style: StylePreset, now: Instant) {
        if self.preferences.set_style_preset(style, now) {
            self.retarget_materials();
        }
    }

    pub fn select_color_theme(&mut self, theme: ColorTheme, now: Instant) {
        if self.preferences.set_color_theme(theme, now) {
            self.retarget_materials();
        }
    }

    pub fn select_lighting_mood(&mut self, mood: LightingMood, now: Instant) {
        if self.preferences.set_lighting_mood(mood, now) {
            self.lighting.set_target(LightingTarget::resolve(mood));
        }
    }

    /// Persist the presets now instead of after the debounce.
    pub fn save_preferences(&mut self) {
        match self.preferences.save_now() {
            Ok(()) => info!("Presets saved"),
            Err(e) => warn!("Failed to save presets: {}", e),
        }
    }

    /// Advance everything by one frame.
    ///
    /// `delta_seconds` may be 0 (paused) or very large (resumed after a
    /// stall); `now` drives retry deadlines and the save debounce.
    pub fn frame(&mut self, delta_seconds: f32, now: Instant) -> FrameReport<L::Scene> {
        let mut report = FrameReport::default();

        for completion in self.dispatcher.drain() {
            let room = completion.ticket.room;
            match self.loads.complete(completion.ticket, completion.result, now) {
                Completion::Ready(scene) => {
                    // The old room goes away; its meshes' states with it
                    self.materials.clear();
                    self.lighting.invalidate_shadows();
                    report.scene = Some((room, scene));
                }
                Completion::Exhausted(error) => report.errors.push(error),
                Completion::RetryScheduled { .. } | Completion::Stale => {}
            }
        }

        if let Some(ticket) = self.loads.poll(now) {
            self.dispatcher.dispatch(ticket);
        }

        if let Err(e) = self.preferences.flush_due(now) {
            warn!("Failed to save presets: {}", e);
        }

        if self.stats.record(delta_seconds).is_some() {
            report.pixel_ratio = self.quality.on_sample(&self.stats);
        }

        self.materials.tick(delta_seconds);
        self.lighting.tick(delta_seconds);

        let status = self.loads.status();
        if status != self.last_status {
            self.last_status = status.clone();
            report.status = Some(status);
        }

        report
    }

    /// Write material values into the displayed room.
    pub fn write_scene(&mut self, scene: &mut dyn SceneHandle) {
        self.materials.write(scene);
    }

    /// Write light values into the rig.
    pub fn write_lights(&mut self, rig: &mut dyn LightRig) {
        self.lighting.write(rig);
    }

    fn retarget_materials(&mut self) {
        let selection = self.preferences.selection();
        self.materials.set_target(MaterialTarget::resolve(
            selection.style_preset,
            selection.color_theme,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::testing::{FakeLoader, Scripted};
    use crate::error::AssetLoadError;
    use crate::preferences::{InMemoryPreferences, StoredPreferences};
    use crate::scene::testing::{RecordedRig, RecordedScene};
    use std::time::Duration;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_time()
            .build()
            .unwrap()
    }

    fn desktop() -> Capabilities {
        Capabilities {
            graphics_supported: true,
            is_mobile: false,
            max_shadow_map_size: 4096,
            preferred_pixel_ratio_range: (1.0, 2.0),
        }
    }

    fn config() -> ViewerConfig {
        let mut config = ViewerConfig::default();
        config.preferences.path = None;
        config
    }

    fn controller(
        rt: &tokio::runtime::Runtime,
        loader: FakeLoader,
        backend: InMemoryPreferences,
    ) -> PreviewController<FakeLoader> {
        PreviewController::new(
            &config(),
            desktop(),
            Box::new(backend),
            loader,
            rt.handle().clone(),
        )
        .unwrap()
    }

    /// Run zero-length frames at `now` until `done` accepts a report
    fn pump(
        controller: &mut PreviewController<FakeLoader>,
        now: Instant,
        mut done: impl FnMut(&FrameReport<String>) -> bool,
    ) -> FrameReport<String> {
        for _ in 0..400 {
            let report = controller.frame(0.0, now);
            if done(&report) {
                return report;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("no matching frame report; status {:?}", controller.status());
    }

    fn scene_ready(report: &FrameReport<String>) -> bool {
        report.scene.is_some()
    }

    #[test]
    fn test_unsupported_graphics_is_an_error() {
        let rt = runtime();
        let result = PreviewController::new(
            &config(),
            Capabilities::unsupported(),
            Box::new(InMemoryPreferences::new()),
            FakeLoader::default(),
            rt.handle().clone(),
        );
        assert!(matches!(result, Err(StagingError::CapabilityUnsupported(_))));
    }

    #[test]
    fn test_startup_loads_restored_room() {
        let rt = runtime();
        let saved = StoredPreferences::new(
            &PresetSelection::default().with_room(RoomType::Office),
            0,
        )
        .encode()
        .unwrap();
        let mut controller = controller(
            &rt,
            FakeLoader::default(),
            InMemoryPreferences::with_document(saved),
        );
        assert_eq!(controller.selection().room_type, RoomType::Office);

        let report = pump(&mut controller, Instant::now(), scene_ready);
        let (room, scene) = report.scene.unwrap();
        assert_eq!(room, RoomType::Office);
        assert_eq!(scene, "office#1");
        assert_eq!(report.status, Some(LoadStatus::Ready { room: RoomType::Office }));
    }

    #[test]
    fn test_corrupt_preferences_use_defaults() {
        let rt = runtime();
        let controller = controller(
            &rt,
            FakeLoader::default(),
            InMemoryPreferences::with_document("{\"version\":"),
        );
        assert_eq!(controller.selection(), PresetSelection::default());
        assert!(matches!(
            controller.recovered_from(),
            Some(StagingError::CorruptPersistedState(_))
        ));
    }

    #[test]
    fn test_style_change_blends_meshes() {
        let rt = runtime();
        let mut controller = controller(&rt, FakeLoader::default(), InMemoryPreferences::new());
        let now = Instant::now();
        pump(&mut controller, now, scene_ready);

        let mut scene = RecordedScene::with_meshes(2);
        controller.write_scene(&mut scene);
        assert_eq!(scene.surfaces[0].roughness, 0.2);

        controller.apply(UiToViewer::SelectStyle(StylePreset::Boho), now);
        controller.frame(0.1, now);
        controller.write_scene(&mut scene);
        let mid = scene.surfaces[1].roughness;
        assert!(mid > 0.2 && mid < 0.8);

        controller.frame(100.0, now);
        controller.write_scene(&mut scene);
        assert_eq!(scene.surfaces[1].roughness, 0.8);
    }

    #[test]
    fn test_mood_change_blends_lights() {
        let rt = runtime();
        let mut controller = controller(&rt, FakeLoader::default(), InMemoryPreferences::new());
        let now = Instant::now();
        let mut rig = RecordedRig::default();

        controller.select_lighting_mood(LightingMood::Night, now);
        controller.frame(0.0, now);
        controller.write_lights(&mut rig);
        assert_eq!(rig.ambient_intensity, 0.8);

        controller.frame(0.2, now);
        controller.write_lights(&mut rig);
        assert!(rig.ambient_intensity < 0.8 && rig.ambient_intensity > 0.3);
        assert_eq!(rig.shadow_writes, 1);
    }

    #[test]
    fn test_failed_load_retries_after_backoff() {
        let rt = runtime();
        let loader = FakeLoader::default();
        loader.script(RoomType::LivingRoom, [Scripted::Fail]);
        let mut controller = controller(&rt, loader.clone(), InMemoryPreferences::new());
        let start = Instant::now();

        let report = pump(&mut controller, start, |r| {
            matches!(r.status, Some(LoadStatus::RetryScheduled { .. }))
        });
        assert!(matches!(
            report.status,
            Some(LoadStatus::RetryScheduled { delay_ms: 1000, .. })
        ));

        // Still waiting just before the deadline
        controller.frame(0.0, start + Duration::from_millis(500));
        assert_eq!(loader.calls().len(), 1);

        let report = pump(&mut controller, start + Duration::from_millis(1500), scene_ready);
        assert_eq!(report.scene.unwrap().0, RoomType::LivingRoom);
        assert_eq!(loader.calls(), vec![RoomType::LivingRoom, RoomType::LivingRoom]);
    }

    #[test]
    fn test_exhausted_load_is_reported() {
        let rt = runtime();
        let loader = FakeLoader::default();
        loader.script(RoomType::LivingRoom, [Scripted::Fail; 4]);
        let mut controller = controller(&rt, loader.clone(), InMemoryPreferences::new());
        let mut now = Instant::now();

        let mut errors = Vec::new();
        for _ in 0..4 {
            let report = pump(&mut controller, now, |r| {
                r.status.as_ref().is_some_and(|s| {
                    matches!(
                        s,
                        LoadStatus::RetryScheduled { .. } | LoadStatus::Exhausted { .. }
                    )
                })
            });
            errors.extend(report.errors);
            now += Duration::from_secs(10);
        }

        assert_eq!(loader.calls().len(), 4);
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            StagingError::AssetLoadFailure {
                room: RoomType::LivingRoom,
                source: AssetLoadError::NotFound { .. }
            }
        ));

        // No automatic retries after exhaustion
        controller.frame(0.0, now + Duration::from_secs(60));
        std::thread::sleep(Duration::from_millis(50));
        controller.frame(0.0, now + Duration::from_secs(120));
        assert_eq!(loader.calls().len(), 4);
    }

    #[test]
    fn test_room_switch_discards_pending_room() {
        let rt = runtime();
        let loader = FakeLoader::default();
        loader.script(RoomType::LivingRoom, [Scripted::Slow(Duration::from_millis(200))]);
        let mut controller = controller(&rt, loader.clone(), InMemoryPreferences::new());
        let now = Instant::now();

        controller.select_room(RoomType::Bedroom, now);
        let report = pump(&mut controller, now, scene_ready);
        assert_eq!(report.scene.unwrap().0, RoomType::Bedroom);

        std::thread::sleep(Duration::from_millis(300));
        let report = controller.frame(0.0, now);
        assert!(report.scene.is_none());
        assert_eq!(controller.status(), LoadStatus::Ready { room: RoomType::Bedroom });
    }

    #[test]
    fn test_room_switch_cancels_backoff() {
        let rt = runtime();
        let loader = FakeLoader::default();
        loader.script(RoomType::LivingRoom, [Scripted::Fail]);
        let mut controller = controller(&rt, loader.clone(), InMemoryPreferences::new());
        let now = Instant::now();

        pump(&mut controller, now, |r| {
            matches!(r.status, Some(LoadStatus::RetryScheduled { .. }))
        });
        controller.select_room(RoomType::Office, now);
        let report = pump(&mut controller, now + Duration::from_secs(5), scene_ready);
        assert_eq!(report.scene.unwrap().0, RoomType::Office);
        assert_eq!(loader.calls(), vec![RoomType::LivingRoom, RoomType::Office]);
    }

    #[test]
    fn test_new_room_resets_material_states() {
        let rt = runtime();
        let mut controller = controller(&rt, FakeLoader::default(), InMemoryPreferences::new());
        let now = Instant::now();
        pump(&mut controller, now, scene_ready);
        controller.write_scene(&mut RecordedScene::with_meshes(3));
        assert!(controller.material_state(MeshId(2)).is_some());

        controller.select_room(RoomType::Bedroom, now);
        pump(&mut controller, now, scene_ready);
        assert!(controller.material_state(MeshId(2)).is_none());
    }

    #[test]
    fn test_preferences_saved_after_debounce() {
        let rt = runtime();
        let memory = std::sync::Arc::new(InMemoryPreferences::new());

        struct Shared(std::sync::Arc<InMemoryPreferences>);
        impl PreferenceBackend for Shared {
            fn read(&self) -> Result<Option<String>, crate::preferences::PreferenceError> {
                self.0.read()
            }
            fn write(&self, document: &str) -> Result<(), crate::preferences::PreferenceError> {
                self.0.write(document)
            }
        }

        let mut controller = PreviewController::new(
            &config(),
            desktop(),
            Box::new(Shared(memory.clone())),
            FakeLoader::default(),
            rt.handle().clone(),
        )
        .unwrap();
        let now = Instant::now();

        controller.apply(UiToViewer::SelectColorTheme(ColorTheme::Neutral), now);
        controller.frame(0.016, now + Duration::from_millis(100));
        assert!(memory.document().is_none());

        controller.frame(0.016, now + Duration::from_millis(600));
        let saved = StoredPreferences::decode(&memory.document().unwrap()).unwrap();
        assert_eq!(saved.color_theme, ColorTheme::Neutral);
    }
}
