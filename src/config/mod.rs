//! Immutable render configuration, snapshotted once per queue build.
//!
//! Everything the sweep needs (axis ranges, output layout, image quality,
//! segmentation color table) lives in one [`RenderConfig`] value. The
//! configuration surface that edits these values (a UI, a JSON file) is
//! external; this module only validates and derives from the snapshot.

use crate::foundation::core::FrameType;
use crate::foundation::error::{SweepError, SweepResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// How the two render phases are sequenced over one sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceMode {
    /// Render every mask frame, then every image frame.
    MasksThenImages,
    /// Render only the RGB images.
    ImagesOnly,
    /// Render only the segmentation masks.
    MasksOnly,
}

impl SequenceMode {
    /// Return `true` when this mode renders a mask phase.
    pub fn renders_masks(self) -> bool {
        matches!(self, Self::MasksThenImages | Self::MasksOnly)
    }

    /// Return `true` when this mode renders an image phase.
    pub fn renders_images(self) -> bool {
        matches!(self, Self::MasksThenImages | Self::ImagesOnly)
    }

    /// The phase rendered first. Masks lead when both phases run.
    pub fn first_phase(self) -> FrameType {
        match self {
            Self::MasksThenImages | Self::MasksOnly => FrameType::Mask,
            Self::ImagesOnly => FrameType::Raw,
        }
    }

    /// Number of phases this mode renders (1 or 2).
    pub fn phase_count(self) -> u64 {
        match self {
            Self::MasksThenImages => 2,
            Self::ImagesOnly | Self::MasksOnly => 1,
        }
    }

    /// Phases in render order, for per-frame consumers.
    pub fn phases(self) -> Vec<FrameType> {
        match self {
            Self::MasksThenImages => vec![FrameType::Mask, FrameType::Raw],
            Self::ImagesOnly => vec![FrameType::Raw],
            Self::MasksOnly => vec![FrameType::Mask],
        }
    }
}

/// The liquid-fill axis: held constant per dataset, or swept like the camera
/// axes. Levels are fill percentages in `0..=100`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LiquidAxis {
    /// Single fill level carried uniformly across the sweep.
    Fixed {
        /// Fill percentage.
        level: u32,
    },
    /// Fill level swept as an independent fourth axis.
    Swept {
        /// First fill percentage.
        start: u32,
        /// Increment per level.
        step: u32,
        /// Number of levels enumerated.
        count: u32,
    },
}

impl LiquidAxis {
    /// Number of liquid levels the sweep enumerates.
    pub fn count(self) -> u64 {
        match self {
            Self::Fixed { .. } => 1,
            Self::Swept { count, .. } => u64::from(count),
        }
    }

    /// The enumerated fill percentages, in sweep order.
    pub fn levels(self) -> Vec<u32> {
        match self {
            Self::Fixed { level } => vec![level],
            Self::Swept { start, step, count } => {
                (0..count).map(|i| start + i * step).collect()
            }
        }
    }

    fn validate(self) -> SweepResult<()> {
        match self {
            Self::Fixed { level } => {
                if level > 100 {
                    return Err(SweepError::validation(
                        "liquid level must be a percentage in 0..=100",
                    ));
                }
            }
            Self::Swept { start, step, count } => {
                if count == 0 {
                    return Err(SweepError::validation("liquid level count must be >= 1"));
                }
                if step == 0 {
                    return Err(SweepError::validation("liquid level step must be > 0"));
                }
                let last = u64::from(start) + u64::from(count - 1) * u64::from(step);
                if last > 100 {
                    return Err(SweepError::validation(
                        "liquid level sweep must stay within 0..=100 percent",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Camera/scene sweep axes. Angles are degrees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepParams {
    /// Liquid-fill axis (fixed or swept).
    pub liquid: LiquidAxis,
    /// Azimuth increment; azimuth runs 0 inclusive to 360 exclusive.
    pub azimuth_step: u32,
    /// First elevation enumerated.
    pub elevation_start: u32,
    /// Elevation increment.
    pub elevation_step: u32,
    /// Last elevation enumerated (inclusive).
    pub elevation_max: u32,
    /// First zoom factor enumerated.
    pub zoom_start: f64,
    /// Zoom increment per level.
    pub zoom_step: f64,
    /// Number of zoom levels enumerated.
    pub zoom_levels: u32,
    /// Camera focal length in millimeters, constant across the sweep.
    pub focal_length: f64,
}

impl Default for SweepParams {
    fn default() -> Self {
        Self {
            liquid: LiquidAxis::Fixed { level: 100 },
            azimuth_step: 10,
            elevation_start: 0,
            elevation_step: 10,
            elevation_max: 60,
            zoom_start: 1.0,
            zoom_step: 0.25,
            zoom_levels: 1,
            focal_length: 50.0,
        }
    }
}

impl SweepParams {
    /// Number of azimuth positions: `ceil(360 / azimuth_step)`.
    pub fn azimuth_count(&self) -> u64 {
        u64::from(360u32.div_ceil(self.azimuth_step.max(1)))
    }

    /// Number of elevation positions, both endpoints included.
    pub fn elevation_count(&self) -> u64 {
        u64::from((self.elevation_max - self.elevation_start) / self.elevation_step.max(1) + 1)
    }

    /// Number of zoom positions.
    pub fn zoom_count(&self) -> u64 {
        u64::from(self.zoom_levels)
    }

    fn validate(&self) -> SweepResult<()> {
        if self.azimuth_step == 0 || self.azimuth_step > 360 {
            return Err(SweepError::validation("azimuth step must be in 1..=360"));
        }
        if self.elevation_step == 0 {
            return Err(SweepError::validation("elevation step must be > 0"));
        }
        if self.elevation_max > 90 {
            return Err(SweepError::validation("max elevation must be in 0..=90"));
        }
        if self.elevation_start > self.elevation_max {
            return Err(SweepError::validation(
                "elevation start must be <= max elevation",
            ));
        }
        if self.zoom_levels == 0 {
            return Err(SweepError::validation("zoom levels must be >= 1"));
        }
        if self.zoom_start <= 0.0 {
            return Err(SweepError::validation("starting zoom must be > 0"));
        }
        if self.zoom_levels > 1 && self.zoom_step <= 0.0 {
            return Err(SweepError::validation(
                "zoom step must be > 0 when sweeping multiple zoom levels",
            ));
        }
        if self.focal_length <= 0.0 {
            return Err(SweepError::validation("focal length must be > 0"));
        }
        self.liquid.validate()
    }
}

/// Output layout and image quality settings.
///
/// The mask and image directories are derived from `root_directory` and
/// `dataset_name`, never supplied directly, so every dataset is
/// self-contained under its own folder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputParams {
    /// Directory under which the dataset folder is created.
    pub root_directory: PathBuf,
    /// Dataset folder name.
    pub dataset_name: String,
    /// Filename prefix for mask frames.
    pub mask_prefix: String,
    /// Filename prefix for image frames.
    pub image_prefix: String,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Path-traced sample count for the image phase.
    pub sample_count: u32,
    /// Phase ordering over the sweep.
    pub sequence_mode: SequenceMode,
}

impl Default for OutputParams {
    fn default() -> Self {
        Self {
            root_directory: PathBuf::new(),
            dataset_name: String::new(),
            mask_prefix: "MASK".to_owned(),
            image_prefix: "RGB".to_owned(),
            width: 1920,
            height: 1080,
            sample_count: 256,
            sequence_mode: SequenceMode::MasksThenImages,
        }
    }
}

/// Immutable snapshot of all user-facing configuration, taken at queue-build
/// time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct RenderConfig {
    /// Sweep axis parameters.
    pub sweep: SweepParams,
    /// Output layout and image quality.
    pub output: OutputParams,
    /// Semantic part name -> normalized RGB triple in `[0, 1]`.
    #[serde(default)]
    pub segmentation_colors: BTreeMap<String, [f64; 3]>,
    /// Per-material shader parameter snapshot (material -> socket -> value),
    /// captured by the configuration surface and dumped into metadata as-is.
    #[serde(default)]
    pub material_settings: BTreeMap<String, BTreeMap<String, f64>>,
}

impl RenderConfig {
    /// Parse a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> SweepResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| SweepError::validation(format!("parse render config JSON: {e}")))
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SweepResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SweepError::validation(format!("open render config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check all invariants a queue build relies on.
    pub fn validate(&self) -> SweepResult<()> {
        self.sweep.validate()?;
        if self.output.root_directory.as_os_str().is_empty() {
            return Err(SweepError::validation(
                "output directory is not set; pick a render directory",
            ));
        }
        if self.output.dataset_name.is_empty() {
            return Err(SweepError::validation("dataset name must not be empty"));
        }
        if self.output.mask_prefix.is_empty() || self.output.image_prefix.is_empty() {
            return Err(SweepError::validation(
                "mask and image filename prefixes must not be empty",
            ));
        }
        if self.output.width == 0 || self.output.height == 0 {
            return Err(SweepError::validation("image dimensions must be non-zero"));
        }
        if self.output.sample_count == 0 {
            return Err(SweepError::validation("sample count must be >= 1"));
        }
        Ok(())
    }

    /// The dataset folder: `{root_directory}/{dataset_name}`.
    pub fn dataset_dir(&self) -> PathBuf {
        self.output.root_directory.join(&self.output.dataset_name)
    }

    /// Mask output folder inside the dataset.
    pub fn mask_dir(&self) -> PathBuf {
        self.dataset_dir().join("masks")
    }

    /// Image output folder inside the dataset.
    pub fn image_dir(&self) -> PathBuf {
        self.dataset_dir().join("images")
    }

    /// Throwaway stem the engine's own animation-file writes are pointed at.
    /// Artifacts with this stem are deleted during cleanup.
    pub fn temp_stem(&self) -> PathBuf {
        self.output.root_directory.join("temp_render")
    }

    /// Output directory and filename prefix for a phase.
    pub fn phase_output(&self, phase: FrameType) -> (PathBuf, &str) {
        match phase {
            FrameType::Mask => (self.mask_dir(), self.output.mask_prefix.as_str()),
            FrameType::Raw => (self.image_dir(), self.output.image_prefix.as_str()),
        }
    }

    /// Number of frames the sweep enumerates.
    ///
    /// Must agree exactly with the length of the queue a build produces; the
    /// progress UI sizes itself from this value.
    pub fn estimated_frame_count(&self) -> u64 {
        self.sweep.azimuth_count()
            * self.sweep.elevation_count()
            * self.sweep.zoom_count()
            * self.sweep.liquid.count()
    }

    /// Number of files one run writes: frames times rendered phases.
    pub fn estimated_file_count(&self) -> u64 {
        self.estimated_frame_count() * self.output.sequence_mode.phase_count()
    }
}
