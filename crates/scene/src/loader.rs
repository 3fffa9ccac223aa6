//! Loads room models through the Bevy asset server

use std::path::PathBuf;

use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;
use roomviz_ipc::RoomType;
use staging::{AssetLoadError, LoadFuture, SceneLoader};

/// Resolves a room to `<models_dir>/<room>.glb` and waits for its first
/// glTF scene.
///
/// A failed handle is dropped with the future, so the next attempt for the
/// same path starts a fresh load.
#[derive(Clone)]
pub struct BevySceneLoader {
    asset_server: AssetServer,
    models_dir: PathBuf,
}

impl BevySceneLoader {
    pub fn new(asset_server: AssetServer, models_dir: impl Into<PathBuf>) -> Self {
        Self {
            asset_server,
            models_dir: models_dir.into(),
        }
    }

    /// Asset path for a room's model, relative to the asset root
    pub fn model_path(&self, room: RoomType) -> PathBuf {
        self.models_dir.join(room.model_file())
    }
}

impl SceneLoader for BevySceneLoader {
    type Scene = Handle<Scene>;

    fn load(&self, room: RoomType) -> LoadFuture<Handle<Scene>> {
        let path = self.model_path(room);
        let asset_server = self.asset_server.clone();
        Box::pin(async move {
            let handle: Handle<Scene> =
                asset_server.load(GltfAssetLabel::Scene(0).from_asset(path.clone()));
            match asset_server.wait_for_asset(&handle).await {
                Ok(()) => Ok(handle),
                Err(e) => Err(AssetLoadError::Failed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::asset::AssetPlugin;

    #[test]
    fn test_model_path() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()));
        let asset_server = app.world().resource::<AssetServer>().clone();

        let loader = BevySceneLoader::new(asset_server, "models");
        assert_eq!(
            loader.model_path(RoomType::LivingRoom),
            PathBuf::from("models/living-room.glb")
        );
        assert_eq!(
            loader.model_path(RoomType::Office),
            PathBuf::from("models/office.glb")
        );
    }
}
