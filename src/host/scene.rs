//! Capability surface of the host 3D scene.

use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::SweepResult;

/// Opaque handle to an object owned by the host scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u64);

/// Capability classification of a scene object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    /// A camera object.
    Camera,
    /// A curve object (the camera track).
    Curve,
    /// A mesh object (cutters, liquid volume).
    Mesh,
    /// A collection of objects toggled as one render-visibility unit.
    Collection,
}

/// Animatable channels the sweep writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    /// Normalized position along the camera track (path-follow offset).
    PathOffset,
    /// Rotation around the world Z axis, radians.
    RotationZ,
    /// Uniform scale factor.
    UniformScale,
    /// Camera focal length, millimeters.
    FocalLength,
    /// World-space Z location.
    LocationZ,
}

/// Path-follow constraint configuration forced onto the camera at resolve
/// time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathFollowConfig {
    /// Pin the camera to a fixed offset along the curve.
    pub use_fixed_location: bool,
    /// Orient the camera to follow the curve tangent.
    pub use_curve_follow: bool,
    /// Scale the offset by the curve radius.
    pub use_curve_radius: bool,
    /// The curve the camera follows.
    pub target: ObjectId,
}

impl PathFollowConfig {
    /// The configuration every sweep enforces: fixed location on the track,
    /// following the curve with radius applied.
    pub fn orbit(target: ObjectId) -> Self {
        Self {
            use_fixed_location: true,
            use_curve_follow: true,
            use_curve_radius: true,
            target,
        }
    }
}

/// Host scene graph capability.
///
/// The scene owns globally mutable state (object transforms, keyframe tracks,
/// the animation range, compositor switches). While a render job is active the
/// sweep core is the sole writer; the model does not defend against external
/// concurrent edits. Handles are only valid against the scene that resolved
/// them, and scene state may change arbitrarily between invocations, which is
/// why resolution re-runs on every trigger.
pub trait SceneHandle {
    /// Look up an object by name.
    fn lookup(&self, name: &str) -> Option<ObjectId>;

    /// Capability kind of an object, if the handle is live.
    fn kind(&self, id: ObjectId) -> Option<ObjectKind>;

    /// Bounding dimensions of a mesh object in scene units.
    fn dimensions(&self, id: ObjectId) -> SweepResult<[f64; 3]>;

    /// Whether the object can carry a path-follow constraint.
    fn supports_path_follow(&self, id: ObjectId) -> bool;

    /// Attach or overwrite the path-follow constraint on `id`.
    fn configure_path_follow(&mut self, id: ObjectId, cfg: PathFollowConfig) -> SweepResult<()>;

    /// Set the animation playback range.
    fn set_frame_range(&mut self, range: FrameRange);

    /// Current animation playback range.
    fn frame_range(&self) -> FrameRange;

    /// Move the playhead.
    fn set_current_frame(&mut self, frame: FrameIndex);

    /// Current playhead position.
    fn current_frame(&self) -> FrameIndex;

    /// Remove all animation data from an object.
    fn clear_animation(&mut self, id: ObjectId) -> SweepResult<()>;

    /// Set a channel value without recording a keyframe.
    fn set_channel(&mut self, id: ObjectId, channel: Channel, value: f64) -> SweepResult<()>;

    /// Set a channel value and record it as a keyframe at `frame`.
    fn insert_keyframe(
        &mut self,
        id: ObjectId,
        channel: Channel,
        value: f64,
        frame: FrameIndex,
    ) -> SweepResult<()>;

    /// Toggle whether a collection is included in renders.
    fn set_render_visibility(&mut self, id: ObjectId, visible: bool) -> SweepResult<()>;

    /// Flip the compositor switch that routes the mask pass to the output.
    fn set_compositor_mask_switch(&mut self, enabled: bool) -> SweepResult<()>;
}
