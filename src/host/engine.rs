//! Capability surface of the host render engine.

use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::SweepResult;
use std::path::Path;

/// One rendered frame as straight-alpha RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FramePixels {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8 data, `width * height * 4` bytes.
    pub data: Vec<u8>,
}

impl FramePixels {
    /// A solid-color frame.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity((width as usize) * (height as usize) * 4);
        for _ in 0..(width as usize) * (height as usize) {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }
}

/// View transform applied by the engine's color pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewTransform {
    /// Color-graded transform for photorealistic output.
    Graded,
    /// Linear pass-through; mask colors must not be touched.
    Raw,
}

/// Full engine configuration for one render phase.
#[derive(Clone, Debug, PartialEq)]
pub struct EnginePreset {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Path-traced samples per pixel.
    pub samples: u32,
    /// Per-frame render time cap in seconds; 0 disables the cap.
    pub time_limit_secs: u32,
    /// Anti-aliasing filter width in pixels.
    pub filter_width: f64,
    /// Run the denoiser over the finished frame.
    pub use_denoising: bool,
    /// Stop sampling early in converged regions.
    pub use_adaptive_sampling: bool,
    /// Color pipeline for the phase.
    pub view_transform: ViewTransform,
    /// Render the emission pass the mask compositor reads.
    pub use_emit_pass: bool,
}

/// Lifecycle signals emitted by the engine while a job runs.
///
/// Signals are buffered inside the engine and observed by draining on timer
/// ticks; nothing is delivered re-entrantly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineSignal {
    /// The engine is about to render the given animation frame.
    FrameStarted(FrameIndex),
    /// The engine finished the given frame; a result is held in memory.
    FrameFinished(FrameIndex),
    /// The job was cancelled by the user or the host.
    Cancelled,
    /// The whole job (every frame) completed.
    JobComplete,
}

/// Host render engine capability.
///
/// Rendering is the only asynchronous activity in the pipeline: `render_*`
/// calls arm a job and return immediately, and progress is observed solely
/// through [`RenderEngine::drain_signals`].
pub trait RenderEngine {
    /// Apply a phase preset to the engine's shared global settings.
    fn configure(&mut self, preset: &EnginePreset) -> SweepResult<()>;

    /// Arm an asynchronous multi-frame render over `range`.
    ///
    /// `output_stem` is a throwaway path for the engine's own animation-file
    /// writes; real persistence happens frame-by-frame from the in-memory
    /// result. Returns immediately.
    fn render_animation(&mut self, range: FrameRange, output_stem: &Path) -> SweepResult<()>;

    /// Arm an asynchronous single-frame render written directly to `path`.
    /// Used only by the immediate fallback driver.
    fn render_still(&mut self, path: &Path) -> SweepResult<()>;

    /// Request cancellation of the armed job, if any.
    fn cancel(&mut self);

    /// Take the last finished frame held in engine memory, if any.
    fn take_result(&mut self) -> Option<FramePixels>;

    /// Drain lifecycle signals observed since the previous call, oldest
    /// first.
    fn drain_signals(&mut self) -> Vec<EngineSignal>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_frame_has_expected_layout() {
        let f = FramePixels::solid(2, 3, [1, 2, 3, 4]);
        assert_eq!(f.data.len(), 2 * 3 * 4);
        assert_eq!(&f.data[0..4], &[1, 2, 3, 4]);
        assert_eq!(&f.data[20..24], &[1, 2, 3, 4]);
    }
}
