//! Orbitsweep drives an external renderer through a parametric camera sweep to
//! produce paired synthetic-vision datasets: photorealistic RGB frames plus
//! pixel-aligned segmentation masks rendered from the same scene state.
//!
//! The crate is the sequencing core, not a renderer. A sweep over camera
//! azimuth, elevation, zoom and a liquid-fill axis is enumerated into a FIFO
//! [`RenderQueue`] of [`FrameSpec`] values, converted into time-ordered
//! keyframes by an [`AnimationSequence`], and rendered phase by phase (masks,
//! then images) by a [`RenderDriver`] bound to the host's timer loop. The host
//! scene graph and render engine are reached through the [`SceneHandle`] and
//! [`RenderEngine`] capabilities; in-memory implementations ship for tests and
//! host-less dry runs.
#![forbid(unsafe_code)]

mod foundation;

pub mod config;
pub mod driver;
pub mod host;
pub mod resolve;
pub mod sequence;
pub mod sweep;

pub use crate::foundation::core::{FrameIndex, FrameRange, FrameType};
pub use crate::foundation::error::{SweepError, SweepResult};

pub use crate::config::{LiquidAxis, OutputParams, RenderConfig, SequenceMode, SweepParams};
pub use crate::driver::immediate::ImmediateDriver;
pub use crate::driver::render_driver::{DriverState, DriverStatus, RenderDriver};
pub use crate::host::engine::{EnginePreset, EngineSignal, FramePixels, RenderEngine, ViewTransform};
pub use crate::host::memory::{MemoryEngine, MemoryScene};
pub use crate::host::scene::{Channel, ObjectId, ObjectKind, PathFollowConfig, SceneHandle};
pub use crate::host::scheduler::{Scheduler, Subscription};
pub use crate::resolve::{ResolvedObjects, SceneRefs, resolve};
pub use crate::sequence::animation::AnimationSequence;
pub use crate::sequence::metadata::{DatasetMetadata, ImageData};
pub use crate::sequence::preset::phase_preset;
pub use crate::sweep::enumerate::{SweepPoint, build_queue, sweep_points};
pub use crate::sweep::frame_spec::FrameSpec;
pub use crate::sweep::queue::RenderQueue;
