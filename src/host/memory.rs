//! In-memory host implementations, for tests and host-less dry runs.

use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{SweepError, SweepResult};
use crate::host::engine::{EnginePreset, EngineSignal, FramePixels, RenderEngine};
use crate::host::scene::{Channel, ObjectId, ObjectKind, PathFollowConfig, SceneHandle};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug)]
struct MemoryObject {
    name: String,
    kind: ObjectKind,
    dimensions: [f64; 3],
    path_follow_capable: bool,
    path_follow: Option<PathFollowConfig>,
    render_visible: bool,
    values: BTreeMap<Channel, f64>,
    keyframes: Vec<(Channel, FrameIndex, f64)>,
}

/// In-memory [`SceneHandle`] implementation.
///
/// Objects are created through the builder methods and inspected through the
/// query methods; the trait implementation mirrors the mutation surface a real
/// host exposes.
#[derive(Debug)]
pub struct MemoryScene {
    objects: Vec<MemoryObject>,
    frame_range: Option<FrameRange>,
    current_frame: FrameIndex,
    compositor_mask_switch: bool,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryScene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            frame_range: None,
            current_frame: FrameIndex(1),
            compositor_mask_switch: false,
        }
    }

    /// A scene populated with the conventional sweep rig: camera (path-follow
    /// capable), track curve, liquid cutter, segmentation cutter, liquid
    /// volume, and the RGB/segmentation collections.
    pub fn standard_rig() -> Self {
        let mut scene = Self::new();
        let camera = scene.add_object("camera", ObjectKind::Camera);
        scene.set_path_follow_capable(camera, true);
        scene.add_object("camera_track", ObjectKind::Curve);
        scene.add_object("liquid_cutter", ObjectKind::Mesh);
        scene.add_object("seg_cutter", ObjectKind::Mesh);
        let volume = scene.add_object("liquid_volume", ObjectKind::Mesh);
        scene.set_object_dimensions(volume, [0.4, 0.4, 0.5]);
        scene.add_object("rgb_variant", ObjectKind::Collection);
        scene.add_object("seg_variant", ObjectKind::Collection);
        scene
    }

    /// Add an object and return its handle.
    pub fn add_object(&mut self, name: impl Into<String>, kind: ObjectKind) -> ObjectId {
        let id = ObjectId(self.objects.len() as u64);
        self.objects.push(MemoryObject {
            name: name.into(),
            kind,
            dimensions: [1.0, 1.0, 1.0],
            path_follow_capable: false,
            path_follow: None,
            render_visible: true,
            values: BTreeMap::new(),
            keyframes: Vec::new(),
        });
        id
    }

    /// Set the bounding dimensions reported for a mesh object.
    pub fn set_object_dimensions(&mut self, id: ObjectId, dimensions: [f64; 3]) {
        if let Some(obj) = self.objects.get_mut(id.0 as usize) {
            obj.dimensions = dimensions;
        }
    }

    /// Mark whether an object can carry a path-follow constraint.
    pub fn set_path_follow_capable(&mut self, id: ObjectId, capable: bool) {
        if let Some(obj) = self.objects.get_mut(id.0 as usize) {
            obj.path_follow_capable = capable;
        }
    }

    /// Remove an object's name so lookups for it fail. Simulates a reference
    /// going stale between invocations.
    pub fn unlink(&mut self, name: &str) {
        if let Some(obj) = self.objects.iter_mut().find(|o| o.name == name) {
            obj.name.clear();
        }
    }

    /// Keyframes recorded for one channel of one object, in insertion order.
    pub fn keyframes(&self, id: ObjectId, channel: Channel) -> Vec<(FrameIndex, f64)> {
        self.objects
            .get(id.0 as usize)
            .map(|obj| {
                obj.keyframes
                    .iter()
                    .filter(|(c, _, _)| *c == channel)
                    .map(|(_, f, v)| (*f, *v))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of keyframes recorded for one channel of one object.
    pub fn keyframe_count(&self, id: ObjectId, channel: Channel) -> usize {
        self.keyframes(id, channel).len()
    }

    /// Current (non-animated) value of a channel, if any was written.
    pub fn channel_value(&self, id: ObjectId, channel: Channel) -> Option<f64> {
        self.objects
            .get(id.0 as usize)
            .and_then(|obj| obj.values.get(&channel).copied())
    }

    /// Whether a collection is currently included in renders.
    pub fn is_render_visible(&self, id: ObjectId) -> bool {
        self.objects
            .get(id.0 as usize)
            .map(|obj| obj.render_visible)
            .unwrap_or(false)
    }

    /// Current compositor mask-switch state.
    pub fn compositor_mask_switch(&self) -> bool {
        self.compositor_mask_switch
    }

    /// Path-follow constraint configured on an object, if any.
    pub fn path_follow(&self, id: ObjectId) -> Option<PathFollowConfig> {
        self.objects
            .get(id.0 as usize)
            .and_then(|obj| obj.path_follow)
    }

    fn obj(&self, id: ObjectId) -> SweepResult<&MemoryObject> {
        self.objects
            .get(id.0 as usize)
            .ok_or_else(|| SweepError::render(format!("stale object handle {:?}", id)))
    }

    fn obj_mut(&mut self, id: ObjectId) -> SweepResult<&mut MemoryObject> {
        self.objects
            .get_mut(id.0 as usize)
            .ok_or_else(|| SweepError::render(format!("stale object handle {:?}", id)))
    }
}

impl SceneHandle for MemoryScene {
    fn lookup(&self, name: &str) -> Option<ObjectId> {
        if name.is_empty() {
            return None;
        }
        self.objects
            .iter()
            .position(|obj| obj.name == name)
            .map(|i| ObjectId(i as u64))
    }

    fn kind(&self, id: ObjectId) -> Option<ObjectKind> {
        self.objects.get(id.0 as usize).map(|obj| obj.kind)
    }

    fn dimensions(&self, id: ObjectId) -> SweepResult<[f64; 3]> {
        let obj = self.obj(id)?;
        if obj.kind != ObjectKind::Mesh {
            return Err(SweepError::render(format!(
                "object '{}' does not expose mesh dimensions",
                obj.name
            )));
        }
        Ok(obj.dimensions)
    }

    fn supports_path_follow(&self, id: ObjectId) -> bool {
        self.objects
            .get(id.0 as usize)
            .map(|obj| obj.path_follow_capable)
            .unwrap_or(false)
    }

    fn configure_path_follow(&mut self, id: ObjectId, cfg: PathFollowConfig) -> SweepResult<()> {
        let obj = self.obj_mut(id)?;
        if !obj.path_follow_capable {
            return Err(SweepError::render(format!(
                "object '{}' cannot carry a path-follow constraint",
                obj.name
            )));
        }
        obj.path_follow = Some(cfg);
        Ok(())
    }

    fn set_frame_range(&mut self, range: FrameRange) {
        self.frame_range = Some(range);
    }

    fn frame_range(&self) -> FrameRange {
        self.frame_range.unwrap_or(FrameRange {
            start: FrameIndex(1),
            end: FrameIndex(1),
        })
    }

    fn set_current_frame(&mut self, frame: FrameIndex) {
        self.current_frame = frame;
    }

    fn current_frame(&self) -> FrameIndex {
        self.current_frame
    }

    fn clear_animation(&mut self, id: ObjectId) -> SweepResult<()> {
        self.obj_mut(id)?.keyframes.clear();
        Ok(())
    }

    fn set_channel(&mut self, id: ObjectId, channel: Channel, value: f64) -> SweepResult<()> {
        self.obj_mut(id)?.values.insert(channel, value);
        Ok(())
    }

    fn insert_keyframe(
        &mut self,
        id: ObjectId,
        channel: Channel,
        value: f64,
        frame: FrameIndex,
    ) -> SweepResult<()> {
        let obj = self.obj_mut(id)?;
        obj.values.insert(channel, value);
        obj.keyframes.push((channel, frame, value));
        Ok(())
    }

    fn set_render_visibility(&mut self, id: ObjectId, visible: bool) -> SweepResult<()> {
        self.obj_mut(id)?.render_visible = visible;
        Ok(())
    }

    fn set_compositor_mask_switch(&mut self, enabled: bool) -> SweepResult<()> {
        self.compositor_mask_switch = enabled;
        Ok(())
    }
}

#[derive(Debug)]
enum Job {
    Animation { next: u64, last: u64 },
    Still { path: PathBuf },
}

/// In-memory [`RenderEngine`] implementation.
///
/// A job is armed by `render_animation`/`render_still` and progresses one
/// frame per [`MemoryEngine::step`] call, buffering the lifecycle signals a
/// real engine would emit. Tests interleave `step` with driver ticks.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    preset: Option<EnginePreset>,
    signals: Vec<EngineSignal>,
    job: Option<Job>,
    result: Option<FramePixels>,
    cancel_requested: bool,
    drop_next_result: bool,
    configure_history: Vec<EnginePreset>,
    armed_paths: Vec<PathBuf>,
}

impl MemoryEngine {
    /// Create an idle engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the simulation: render one frame of the armed job, or finish
    /// it. No-op when idle.
    pub fn step(&mut self) -> SweepResult<()> {
        if self.cancel_requested {
            if self.job.take().is_some() {
                self.signals.push(EngineSignal::Cancelled);
            }
            self.cancel_requested = false;
            return Ok(());
        }

        match self.job.take() {
            None => Ok(()),
            Some(Job::Animation { next, last }) => {
                if next > last {
                    self.signals.push(EngineSignal::JobComplete);
                    return Ok(());
                }
                let frame = FrameIndex(next);
                self.signals.push(EngineSignal::FrameStarted(frame));
                if self.drop_next_result {
                    self.result = None;
                    self.drop_next_result = false;
                } else {
                    self.result = Some(self.frame_pattern(next));
                }
                self.signals.push(EngineSignal::FrameFinished(frame));
                self.job = Some(Job::Animation {
                    next: next + 1,
                    last,
                });
                Ok(())
            }
            Some(Job::Still { path }) => {
                let pixels = self.frame_pattern(0);
                image::save_buffer_with_format(
                    &path,
                    &pixels.data,
                    pixels.width,
                    pixels.height,
                    image::ColorType::Rgba8,
                    image::ImageFormat::Png,
                )
                .map_err(|e| SweepError::io(format!("write still '{}': {e}", path.display())))?;
                self.signals.push(EngineSignal::FrameStarted(FrameIndex(0)));
                self.signals
                    .push(EngineSignal::FrameFinished(FrameIndex(0)));
                self.signals.push(EngineSignal::JobComplete);
                Ok(())
            }
        }
    }

    /// Request a user-level cancellation; surfaced as a `Cancelled` signal on
    /// the next step.
    pub fn request_cancel(&mut self) {
        self.cancel_requested = true;
    }

    /// Drop the in-memory result for the next rendered frame. Simulates the
    /// host discarding the render result buffer mid-job.
    pub fn drop_next_result(&mut self) {
        self.drop_next_result = true;
    }

    /// Whether a job is currently armed.
    pub fn is_busy(&self) -> bool {
        self.job.is_some()
    }

    /// Every preset applied through `configure`, oldest first.
    pub fn configure_history(&self) -> &[EnginePreset] {
        &self.configure_history
    }

    /// Every output path armed through `render_animation`/`render_still`.
    pub fn armed_paths(&self) -> &[PathBuf] {
        &self.armed_paths
    }

    fn frame_pattern(&self, frame: u64) -> FramePixels {
        let (width, height) = self
            .preset
            .as_ref()
            .map(|p| (p.width, p.height))
            .unwrap_or((4, 4));
        // Encode the frame index into the pixel data so saved files differ.
        FramePixels::solid(
            width,
            height,
            [(frame & 0xff) as u8, ((frame >> 8) & 0xff) as u8, 0, 255],
        )
    }
}

impl RenderEngine for MemoryEngine {
    fn configure(&mut self, preset: &EnginePreset) -> SweepResult<()> {
        self.preset = Some(preset.clone());
        self.configure_history.push(preset.clone());
        Ok(())
    }

    fn render_animation(&mut self, range: FrameRange, output_stem: &Path) -> SweepResult<()> {
        if self.job.is_some() {
            return Err(SweepError::render("a render job is already in flight"));
        }
        self.armed_paths.push(output_stem.to_path_buf());
        self.job = Some(Job::Animation {
            next: range.start.0,
            last: range.end.0,
        });
        Ok(())
    }

    fn render_still(&mut self, path: &Path) -> SweepResult<()> {
        if self.job.is_some() {
            return Err(SweepError::render("a render job is already in flight"));
        }
        self.armed_paths.push(path.to_path_buf());
        self.job = Some(Job::Still {
            path: path.to_path_buf(),
        });
        Ok(())
    }

    fn cancel(&mut self) {
        if self.job.is_some() {
            self.cancel_requested = true;
        }
    }

    fn take_result(&mut self) -> Option<FramePixels> {
        self.result.take()
    }

    fn drain_signals(&mut self) -> Vec<EngineSignal> {
        std::mem::take(&mut self.signals)
    }
}
