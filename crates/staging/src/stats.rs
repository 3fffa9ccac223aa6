//! Frame rate monitor and adaptive pixel ratio.

use std::collections::VecDeque;

use tracing::{info, warn};

/// Seconds of frame time per published fps sample
pub const SAMPLE_PERIOD_SECONDS: f32 = 1.0;

/// Samples kept for average/min/max
pub const FPS_HISTORY_LEN: usize = 60;

/// Samples below this rate are logged
pub const LOW_FPS_WARNING: f32 = 30.0;

/// Pixel ratio change per adjustment
pub const PIXEL_RATIO_STEP: f32 = 0.25;

/// Samples averaged before deciding on an adjustment
const QUALITY_WINDOW: usize = 3;

/// Summary of recent frame rates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMetrics {
    pub fps: f32,
    /// Milliseconds per frame at the current rate, 0 before the first sample
    pub frame_time_ms: f32,
    pub average_fps: f32,
    pub min_fps: f32,
    pub max_fps: f32,
}

/// Counts frames and publishes one fps sample per second of frame time.
#[derive(Debug, Default)]
pub struct FrameStats {
    frames: u32,
    elapsed: f32,
    current_fps: f32,
    history: VecDeque<f32>,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one frame. Returns the new sample when a period completes.
    pub fn record(&mut self, delta_seconds: f32) -> Option<f32> {
        if !delta_seconds.is_finite() || delta_seconds < 0.0 {
            return None;
        }
        self.frames += 1;
        self.elapsed += delta_seconds;
        if self.elapsed < SAMPLE_PERIOD_SECONDS {
            return None;
        }

        let fps = (self.frames as f32 / self.elapsed).round();
        self.frames = 0;
        self.elapsed = 0.0;
        self.current_fps = fps;
        if self.history.len() == FPS_HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(fps);

        if fps < LOW_FPS_WARNING {
            warn!("Low frame rate: {} fps", fps);
        }
        Some(fps)
    }

    pub fn metrics(&self) -> FrameMetrics {
        let fps = self.current_fps;
        let (average_fps, min_fps, max_fps) = if self.history.is_empty() {
            (fps, fps, fps)
        } else {
            (
                (self.history.iter().sum::<f32>() / self.history.len() as f32).round(),
                self.history.iter().copied().fold(f32::INFINITY, f32::min),
                self.history.iter().copied().fold(f32::NEG_INFINITY, f32::max),
            )
        };
        FrameMetrics {
            fps,
            frame_time_ms: if fps > 0.0 { 1000.0 / fps } else { 0.0 },
            average_fps,
            min_fps,
            max_fps,
        }
    }

    /// Average of the newest `count` samples, if that many exist
    pub fn recent_average(&self, count: usize) -> Option<f32> {
        if count == 0 || self.history.len() < count {
            return None;
        }
        let sum: f32 = self.history.iter().rev().take(count).sum();
        Some(sum / count as f32)
    }

    pub fn meets_target(&self, target_fps: f32) -> bool {
        self.metrics().average_fps >= target_fps
    }
}

/// Keeps the render pixel ratio inside the device range, trading sharpness
/// for frame rate.
#[derive(Debug)]
pub struct AdaptiveQuality {
    range: (f32, f32),
    target_fps: f32,
    pixel_ratio: f32,
    samples_since_change: usize,
}

impl AdaptiveQuality {
    /// Starts at the top of the range
    pub fn new(range: (f32, f32), target_fps: f32) -> Self {
        let (min, max) = range;
        let max = max.max(min);
        Self {
            range: (min, max),
            target_fps,
            pixel_ratio: max,
            samples_since_change: 0,
        }
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Consider an adjustment after a new fps sample. Returns the new ratio
    /// if it changed.
    pub fn on_sample(&mut self, stats: &FrameStats) -> Option<f32> {
        self.samples_since_change += 1;
        if self.samples_since_change < QUALITY_WINDOW {
            return None;
        }
        let average = stats.recent_average(QUALITY_WINDOW)?;
        let (min, max) = self.range;

        let next = if average < self.target_fps {
            (self.pixel_ratio - PIXEL_RATIO_STEP).max(min)
        } else if average >= self.target_fps * 1.5 {
            (self.pixel_ratio + PIXEL_RATIO_STEP).min(max)
        } else {
            self.pixel_ratio
        };

        if next == self.pixel_ratio {
            return None;
        }
        info!(
            "Pixel ratio {} -> {} ({} fps, target {})",
            self.pixel_ratio, next, average, self.target_fps
        );
        self.pixel_ratio = next;
        self.samples_since_change = 0;
        Some(next)
    }
}
