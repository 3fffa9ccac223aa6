//! Preset types and message protocol for the room preview viewer
//!
//! Defines the discrete presets a user can pick, the device capability
//! summary, and the commands exchanged between the UI layer and the viewer.

pub mod error;
pub mod messages;
pub mod types;

pub use error::*;
pub use messages::*;
pub use types::*;
