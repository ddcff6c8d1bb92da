//! Engine presets for the two render phases.

use crate::config::RenderConfig;
use crate::foundation::core::FrameType;
use crate::host::engine::{EnginePreset, ViewTransform};

/// Per-frame wall-clock cap for the image phase, seconds.
const RAW_TIME_LIMIT_SECS: u32 = 60;
/// Anti-aliasing filter width for the image phase, pixels.
const RAW_FILTER_WIDTH: f64 = 1.5;
/// Near-zero filter width so mask edges stay hard.
const MASK_FILTER_WIDTH: f64 = 0.01;

/// The full engine configuration for a phase.
///
/// The two presets are mutually exclusive in their effect on shared engine
/// state: image frames get the configured sample count, denoising, adaptive
/// sampling and a color-graded view transform; mask frames get one sample, no
/// anti-aliasing, no denoising, and a linear view transform so the flat
/// segmentation colors survive untouched.
pub fn phase_preset(phase: FrameType, cfg: &RenderConfig) -> EnginePreset {
    match phase {
        FrameType::Raw => EnginePreset {
            width: cfg.output.width,
            height: cfg.output.height,
            samples: cfg.output.sample_count,
            time_limit_secs: RAW_TIME_LIMIT_SECS,
            filter_width: RAW_FILTER_WIDTH,
            use_denoising: true,
            use_adaptive_sampling: true,
            view_transform: ViewTransform::Graded,
            use_emit_pass: true,
        },
        FrameType::Mask => EnginePreset {
            width: cfg.output.width,
            height: cfg.output.height,
            samples: 1,
            time_limit_secs: 0,
            filter_width: MASK_FILTER_WIDTH,
            use_denoising: false,
            use_adaptive_sampling: false,
            view_transform: ViewTransform::Raw,
            use_emit_pass: true,
        },
    }
}
