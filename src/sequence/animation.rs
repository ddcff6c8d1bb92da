//! Queue-to-keyframe conversion and per-phase render orchestration.

use crate::config::RenderConfig;
use crate::foundation::core::{FrameIndex, FrameRange, FrameType};
use crate::foundation::error::{SweepError, SweepResult};
use crate::host::engine::RenderEngine;
use crate::host::scene::SceneHandle;
use crate::resolve::ResolvedObjects;
use crate::sequence::metadata::DatasetMetadata;
use crate::sequence::preset::phase_preset;
use crate::sweep::queue::RenderQueue;
use std::path::PathBuf;

/// Orchestrates one sweep's rendering: keyframe generation at construction,
/// then per-phase engine setup, per-frame persistence, temp cleanup and
/// metadata emission.
///
/// Construction is a write-once, drain-once operation: the queue is fully
/// consumed into keyframes on the host scene and no partial state is
/// recoverable. Everything after construction is idempotent per phase.
#[derive(Debug)]
pub struct AnimationSequence {
    cfg: RenderConfig,
    objects: ResolvedObjects,
    temp_stem: PathBuf,
    frame_range: FrameRange,
    keyframes_generated: bool,
}

impl AnimationSequence {
    /// Drain `queue` into keyframes on the host scene.
    ///
    /// The animation range becomes `[1, N]` for a queue of N frames, and
    /// every frame index in the range carries exactly one keyframe per
    /// tracked channel, in sweep-enumeration order: frame 1 is the first
    /// enumerated tuple, frame N the last.
    pub fn new(
        scene: &mut dyn SceneHandle,
        cfg: RenderConfig,
        objects: ResolvedObjects,
        mut queue: RenderQueue,
    ) -> SweepResult<Self> {
        let total = queue.max_length();
        if total == 0 {
            return Err(SweepError::validation("the sweep produced no frames"));
        }

        let frame_range = FrameRange::new(FrameIndex(1), FrameIndex(total))?;
        scene.set_frame_range(frame_range);

        // Stale keyframes from a previous run would shadow the new sweep.
        for id in objects.animated() {
            scene.clear_animation(id)?;
        }

        for frame in frame_range.iter() {
            queue.pop()?.write_keyframe(scene, frame)?;
        }

        tracing::info!(frames = total, "keyframes generated");
        Ok(Self {
            temp_stem: cfg.temp_stem(),
            cfg,
            objects,
            frame_range,
            keyframes_generated: true,
        })
    }

    /// The animation range the keyframes cover.
    pub fn frame_range(&self) -> FrameRange {
        self.frame_range
    }

    /// Number of frames per phase.
    pub fn total_frames(&self) -> u64 {
        self.frame_range.len_frames()
    }

    /// Whether keyframe generation completed. Read by progress UIs.
    pub fn keyframes_generated(&self) -> bool {
        self.keyframes_generated
    }

    /// The configuration snapshot this sequence was built from.
    pub fn config(&self) -> &RenderConfig {
        &self.cfg
    }

    /// Configure the engine and scene for `phase` and arm the asynchronous
    /// animation render.
    ///
    /// The render targets the throwaway temp stem, never a final output path;
    /// persistence happens per frame through [`AnimationSequence::save_frame`].
    pub fn render(
        &self,
        phase: FrameType,
        scene: &mut dyn SceneHandle,
        engine: &mut dyn RenderEngine,
    ) -> SweepResult<()> {
        engine.configure(&phase_preset(phase, &self.cfg))?;

        scene.set_render_visibility(self.objects.rgb_variant, phase == FrameType::Raw)?;
        scene.set_render_visibility(self.objects.seg_variant, phase == FrameType::Mask)?;
        scene.set_compositor_mask_switch(phase == FrameType::Mask)?;
        scene.set_current_frame(self.frame_range.start);

        engine.render_animation(self.frame_range, &self.temp_stem)?;
        tracing::info!(?phase, frames = self.total_frames(), "phase armed");
        Ok(())
    }

    /// Persist the engine's in-memory result for `frame` under the phase's
    /// directory and prefix.
    pub fn save_frame(
        &self,
        phase: FrameType,
        frame: FrameIndex,
        engine: &mut dyn RenderEngine,
    ) -> SweepResult<PathBuf> {
        let pixels = engine.take_result().ok_or_else(|| {
            SweepError::result_unavailable(format!("no render result for frame {}", frame.0))
        })?;

        let (dir, prefix) = self.cfg.phase_output(phase);
        let path = dir.join(format!("{prefix}_{:08}.png", frame.0));
        image::save_buffer_with_format(
            &path,
            &pixels.data,
            pixels.width,
            pixels.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| SweepError::io(format!("write frame '{}': {e}", path.display())))?;

        tracing::debug!(frame = frame.0, path = %path.display(), "frame saved");
        Ok(path)
    }

    /// Delete every artifact the engine wrote under the temp stem. Zero
    /// matches is success.
    pub fn cleanup(&self) -> SweepResult<()> {
        let Some(parent) = self.temp_stem.parent() else {
            return Ok(());
        };
        let Some(stem_name) = self.temp_stem.file_name().and_then(|n| n.to_str()) else {
            return Ok(());
        };

        let entries = match std::fs::read_dir(parent) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(SweepError::io(format!(
                    "scan temp dir '{}': {e}",
                    parent.display()
                )));
            }
        };

        let mut removed = 0usize;
        for entry in entries {
            let entry =
                entry.map_err(|e| SweepError::io(format!("scan temp dir: {e}")))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with(stem_name) && entry.path().is_file() {
                std::fs::remove_file(entry.path()).map_err(|e| {
                    SweepError::io(format!("remove '{}': {e}", entry.path().display()))
                })?;
                removed += 1;
            }
        }
        tracing::debug!(removed, "temp artifacts cleaned");
        Ok(())
    }

    /// Write `metadata.json` at the dataset root. Called exactly once, after
    /// every phase has completed.
    pub fn create_metadata(&self) -> SweepResult<PathBuf> {
        let path = self.cfg.dataset_dir().join("metadata.json");
        DatasetMetadata::from_config(&self.cfg).write(&path)?;
        tracing::info!(path = %path.display(), "metadata written");
        Ok(path)
    }
}
