//! Error taxonomy for the staging controller.

use roomviz_ipc::RoomType;
use thiserror::Error;

/// Failures the controller surfaces to its host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StagingError {
    /// No usable graphics context; the host must show a non-3D fallback
    #[error("3D rendering is not supported on this device: {0}")]
    CapabilityUnsupported(String),

    /// A room model could not be loaded even after all retries
    #[error("failed to load the {room} model: {source}")]
    AssetLoadFailure {
        room: RoomType,
        #[source]
        source: AssetLoadError,
    },

    /// Persisted presets were unreadable; defaults are used instead
    #[error("persisted preferences are corrupt: {0}")]
    CorruptPersistedState(String),
}

/// Why a single room model load failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetLoadError {
    #[error("model not found: {path}")]
    NotFound { path: String },

    #[error("could not load {path}: {reason}")]
    Failed { path: String, reason: String },

    #[error("load task ended without a result: {0}")]
    Aborted(String),
}
