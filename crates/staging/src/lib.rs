//! Room preview staging - the controller behind preset transitions
//!
//! This crate is engine-agnostic. It provides:
//! - [`blend`] - the time-constant blend law shared by all interpolators
//! - [`presets`] - static tables from presets to numeric targets
//! - [`material`] - per-mesh material interpolation
//! - [`lighting`] - ambient and directional light interpolation
//! - [`load`] - room model load state machine with bounded backoff
//! - [`dispatch`] - runs loads on a worker runtime, results drained per frame
//! - [`capability`] - one-shot graphics capability detection
//! - [`preferences`] - current presets and their persistence
//! - [`stats`] - frame rate monitor and adaptive pixel ratio
//! - [`controller`] - ties everything to a per-frame tick

pub mod blend;
pub mod capability;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod lighting;
pub mod load;
pub mod material;
pub mod preferences;
pub mod presets;
pub mod scene;
pub mod stats;

pub use glam;

pub use blend::*;
pub use capability::*;
pub use controller::*;
pub use dispatch::*;
pub use error::*;
pub use lighting::*;
pub use load::*;
pub use material::*;
pub use preferences::*;
pub use presets::*;
pub use scene::*;
pub use stats::*;
