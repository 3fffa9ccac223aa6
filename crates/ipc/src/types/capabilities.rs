//! Device capability summary.

use serde::{Deserialize, Serialize};

/// What the graphics device can do, detected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    /// A graphics context could be created; without it no 3D is shown
    pub graphics_supported: bool,
    /// Phone or tablet class device
    pub is_mobile: bool,
    /// Largest shadow map the device should be asked for
    pub max_shadow_map_size: u32,
    /// Lower and upper bound for the render pixel ratio
    pub preferred_pixel_ratio_range: (f32, f32),
}

impl Capabilities {
    /// Result reported when probing failed
    pub fn unsupported() -> Self {
        Self {
            graphics_supported: false,
            is_mobile: false,
            max_shadow_map_size: 0,
            preferred_pixel_ratio_range: (1.0, 1.0),
        }
    }
}
