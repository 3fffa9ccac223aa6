//! Type definitions for IPC messages.

mod capabilities;
mod presets;

pub use capabilities::*;
pub use presets::*;
