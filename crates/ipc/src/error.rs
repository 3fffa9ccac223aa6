//! Error types for IPC operations.

/// Errors raised while reading preset values.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    #[error("Unknown {kind} preset: {value:?}")]
    UnknownPreset { kind: &'static str, value: String },
}
