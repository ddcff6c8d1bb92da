use crate::foundation::error::{SweepError, SweepResult};

/// 1-based frame index in host animation timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Inclusive frame range `[start, end]` in host animation timeline space.
///
/// The host animation range is inclusive on both ends, so this is not the
/// half-open convention; `len_frames` counts both endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Inclusive range end.
    pub end: FrameIndex,
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> SweepResult<Self> {
        if start.0 > end.0 {
            return Err(SweepError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Number of frames contained in the range (both endpoints included).
    pub fn len_frames(self) -> u64 {
        self.end.0 - self.start.0 + 1
    }

    /// Return `true` when `f` is inside `[start, end]`.
    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 <= self.end.0
    }

    /// Iterate all frame indices in the range, in order.
    pub fn iter(self) -> impl Iterator<Item = FrameIndex> {
        (self.start.0..=self.end.0).map(FrameIndex)
    }
}

/// Which of the two mutually exclusive render phases a frame belongs to.
///
/// The phase selects the engine preset, the visible object collection, the
/// compositor switch state, and the output directory/prefix pair.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FrameType {
    /// Photorealistic RGB output.
    Raw,
    /// Flat-color segmentation mask output.
    Mask,
}

impl FrameType {
    /// Stable lowercase tag used in fallback-mode filenames.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Mask => "mask",
        }
    }
}
