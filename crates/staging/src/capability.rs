//! One-shot graphics capability detection.

use std::panic::{self, AssertUnwindSafe};

use roomviz_ipc::Capabilities;
use thiserror::Error;
use tracing::{info, warn};

/// Largest shadow map requested on any device
pub const MAX_SHADOW_MAP_SIZE: u32 = 4096;

/// Upper pixel ratio bound on desktop-class devices
pub const DESKTOP_MAX_PIXEL_RATIO: f32 = 2.0;

/// Upper pixel ratio bound on mobile devices
pub const MOBILE_MAX_PIXEL_RATIO: f32 = 1.5;

/// Platform tokens that mark a phone or tablet, matched case-insensitively
const MOBILE_PLATFORM_TOKENS: &[&str] = &[
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
    "ios",
];

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("no graphics adapter available")]
    NoAdapter,

    #[error("graphics context creation failed: {0}")]
    ContextCreation(String),
}

/// What the graphics context factory reports about the device.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsContextInfo {
    /// Backend identifier (vulkan, metal, dx12, gl, webgpu)
    pub backend: String,
    /// Adapter name from the driver
    pub adapter_name: String,
    /// Operating system or user agent string
    pub platform: String,
    /// Set when the probe knows it is running on a phone or tablet
    pub mobile_device: bool,
    /// Maximum 2D texture dimension
    pub max_texture_dimension_2d: u32,
    /// Physical pixels per logical pixel of the output surface
    pub native_pixel_ratio: f32,
}

impl GraphicsContextInfo {
    pub fn is_mobile(&self) -> bool {
        if self.mobile_device {
            return true;
        }
        let platform = self.platform.to_lowercase();
        MOBILE_PLATFORM_TOKENS
            .iter()
            .any(|token| platform.contains(token))
    }
}

/// Graphics context factory consulted once at startup.
pub trait GraphicsProbe {
    fn probe(&self) -> Result<GraphicsContextInfo, ProbeError>;
}

impl<F> GraphicsProbe for F
where
    F: Fn() -> Result<GraphicsContextInfo, ProbeError>,
{
    fn probe(&self) -> Result<GraphicsContextInfo, ProbeError> {
        self()
    }
}

/// Detect device capabilities.
///
/// Never fails: probe errors and panics are reported as
/// [`Capabilities::unsupported`].
pub fn detect(probe: &dyn GraphicsProbe) -> Capabilities {
    let info = match panic::catch_unwind(AssertUnwindSafe(|| probe.probe())) {
        Ok(Ok(info)) => info,
        Ok(Err(e)) => {
            warn!("Graphics probe failed: {}", e);
            return Capabilities::unsupported();
        }
        Err(_) => {
            warn!("Graphics probe panicked, treating 3D as unsupported");
            return Capabilities::unsupported();
        }
    };

    if info.max_texture_dimension_2d == 0 {
        warn!("Adapter {} reports no usable texture size", info.adapter_name);
        return Capabilities::unsupported();
    }

    let capabilities = capabilities_for(&info);
    info!(
        "Graphics: {} on {} (mobile: {}, shadow map <= {}, pixel ratio {:?})",
        info.adapter_name,
        info.backend,
        capabilities.is_mobile,
        capabilities.max_shadow_map_size,
        capabilities.preferred_pixel_ratio_range
    );
    capabilities
}

fn capabilities_for(info: &GraphicsContextInfo) -> Capabilities {
    let is_mobile = info.is_mobile();
    let ceiling = if is_mobile {
        MOBILE_MAX_PIXEL_RATIO
    } else {
        DESKTOP_MAX_PIXEL_RATIO
    };
    let native = if info.native_pixel_ratio.is_finite() && info.native_pixel_ratio > 0.0 {
        info.native_pixel_ratio
    } else {
        1.0
    };
    let max_ratio = native.min(ceiling).max(1.0);

    Capabilities {
        graphics_supported: true,
        is_mobile,
        max_shadow_map_size: info.max_texture_dimension_2d.min(MAX_SHADOW_MAP_SIZE),
        preferred_pixel_ratio_range: (1.0, max_ratio),
    }
}
