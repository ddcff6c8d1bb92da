//! The top-level finite-state controller for one dataset render.

use crate::config::RenderConfig;
use crate::foundation::core::{FrameIndex, FrameType};
use crate::foundation::error::{SweepError, SweepResult};
use crate::host::engine::{EngineSignal, RenderEngine};
use crate::host::scene::SceneHandle;
use crate::host::scheduler::{DEFAULT_TIMER_INTERVAL_SECS, Scheduler, Subscription};
use crate::resolve::{SceneRefs, resolve};
use crate::sequence::animation::AnimationSequence;
use crate::sweep::enumerate::build_queue;

/// Driver lifecycle states.
///
/// `Validating`, `Queueing` and `Finalizing` are transient: they are entered
/// and left within a single `execute`/`tick` call, but they are real states.
/// A failure inside one of them determines what has and has not been
/// registered or written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    /// Constructed, not yet executed.
    Idle,
    /// Resolving scene references and checking the configuration.
    Validating,
    /// Building the queue and draining it into keyframes.
    Queueing,
    /// Mask phase armed or in flight.
    RenderingMasks,
    /// Image phase armed or in flight.
    RenderingImages,
    /// Writing metadata and cleaning temp artifacts.
    Finalizing,
    /// Every phase completed and metadata written.
    Done,
    /// Terminal cancellation; partial outputs are left in place.
    Cancelled,
}

/// What a tick left behind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverStatus {
    /// The job is still progressing; keep ticking.
    Running,
    /// The job completed and the subscription was released.
    Finished,
    /// The job was cancelled and the subscription was released.
    Cancelled,
}

/// Finite-state controller sequencing one dataset render.
///
/// `execute` validates, queues and subscribes, then returns to the host event
/// loop; all further progress happens in `tick`, driven by the host timer.
/// Exactly one render operation is ever in flight, and every exit path
/// (completion, cancellation, mid-pipeline failure) releases the host
/// subscription before returning.
pub struct RenderDriver {
    cfg: RenderConfig,
    refs: SceneRefs,
    timer_interval_secs: f64,

    state: DriverState,
    sequence: Option<AnimationSequence>,
    subscription: Option<Subscription>,
    rendering: bool,
    stop: bool,
    phase_armed: bool,
    phase_complete: bool,
    frames_saved: u64,
}

impl RenderDriver {
    /// Create an idle driver for one configuration snapshot.
    pub fn new(cfg: RenderConfig, refs: SceneRefs) -> Self {
        Self {
            cfg,
            refs,
            timer_interval_secs: DEFAULT_TIMER_INTERVAL_SECS,
            state: DriverState::Idle,
            sequence: None,
            subscription: None,
            rendering: false,
            stop: false,
            phase_armed: false,
            phase_complete: false,
            frames_saved: 0,
        }
    }

    /// Override the timer interval the driver subscribes with. Cancellation
    /// is observed at tick granularity, so this bounds its latency.
    pub fn with_timer_interval(mut self, secs: f64) -> Self {
        self.timer_interval_secs = secs;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Whether host hooks are currently registered.
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Frames persisted so far, across phases.
    pub fn frames_saved(&self) -> u64 {
        self.frames_saved
    }

    /// Fraction of expected output files already written, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        let expected = self.cfg.estimated_file_count();
        if expected == 0 {
            return 0.0;
        }
        self.frames_saved as f64 / expected as f64
    }

    /// Validate, build the queue, generate keyframes and subscribe to the
    /// host loop. Non-blocking: rendering starts on the first tick.
    ///
    /// A validation failure reports and terminates without registering
    /// anything.
    pub fn execute(
        &mut self,
        scene: &mut dyn SceneHandle,
        scheduler: &Scheduler,
    ) -> SweepResult<()> {
        if self.state != DriverState::Idle {
            return Err(SweepError::validation(
                "this driver has already executed; build a new one per render",
            ));
        }

        self.state = DriverState::Validating;
        let objects = match self.cfg.validate().and_then(|()| resolve(scene, &self.refs)) {
            Ok(objects) => objects,
            Err(e) => return Err(self.fail(e)),
        };

        self.state = DriverState::Queueing;
        let queue = match build_queue(&self.cfg, objects, scene) {
            Ok(queue) => queue,
            Err(e) => return Err(self.fail(e)),
        };
        let sequence = match AnimationSequence::new(scene, self.cfg.clone(), objects, queue) {
            Ok(sequence) => sequence,
            Err(e) => return Err(self.fail(e)),
        };
        self.sequence = Some(sequence);

        self.subscription = match scheduler.subscribe(self.timer_interval_secs) {
            Ok(sub) => Some(sub),
            Err(e) => return Err(self.fail(e)),
        };

        self.state = match self.cfg.output.sequence_mode.first_phase() {
            FrameType::Mask => DriverState::RenderingMasks,
            FrameType::Raw => DriverState::RenderingImages,
        };
        tracing::info!(state = ?self.state, "render job queued");
        Ok(())
    }

    /// Advance the job by one host timer tick.
    pub fn tick(
        &mut self,
        scene: &mut dyn SceneHandle,
        engine: &mut dyn RenderEngine,
    ) -> SweepResult<DriverStatus> {
        let phase = match self.state {
            DriverState::Idle => {
                return Err(SweepError::validation("execute() must run before ticking"));
            }
            DriverState::Done => return Ok(DriverStatus::Finished),
            DriverState::Cancelled => return Ok(DriverStatus::Cancelled),
            DriverState::RenderingMasks => FrameType::Mask,
            DriverState::RenderingImages => FrameType::Raw,
            // Transient states never persist across calls.
            DriverState::Validating | DriverState::Queueing | DriverState::Finalizing => {
                return Ok(DriverStatus::Running);
            }
        };

        for signal in engine.drain_signals() {
            match signal {
                EngineSignal::FrameStarted(_) => self.rendering = true,
                EngineSignal::FrameFinished(frame) => {
                    if let Err(e) = self.save_finished_frame(phase, frame, engine) {
                        return Err(self.fail(e));
                    }
                    self.rendering = false;
                }
                EngineSignal::Cancelled => self.stop = true,
                EngineSignal::JobComplete => self.phase_complete = true,
            }
        }

        if self.stop {
            tracing::warn!(frames_saved = self.frames_saved, "render job cancelled");
            self.teardown(DriverState::Cancelled);
            return Ok(DriverStatus::Cancelled);
        }

        // Single-flight: nothing below runs while a frame is in the engine.
        if self.rendering {
            return Ok(DriverStatus::Running);
        }

        if self.phase_complete {
            return self.advance_phase();
        }

        if !self.phase_armed {
            let sequence = self.sequence.as_ref().ok_or_else(|| {
                SweepError::validation("driver has no animation sequence (bug)")
            })?;
            if let Err(e) = sequence.render(phase, scene, engine) {
                return Err(self.fail(e));
            }
            self.phase_armed = true;
        }

        Ok(DriverStatus::Running)
    }

    fn save_finished_frame(
        &mut self,
        phase: FrameType,
        frame: FrameIndex,
        engine: &mut dyn RenderEngine,
    ) -> SweepResult<()> {
        let sequence = self
            .sequence
            .as_ref()
            .ok_or_else(|| SweepError::validation("driver has no animation sequence (bug)"))?;
        sequence.save_frame(phase, frame, engine)?;
        self.frames_saved += 1;
        Ok(())
    }

    fn advance_phase(&mut self) -> SweepResult<DriverStatus> {
        if self.state == DriverState::RenderingMasks
            && self.cfg.output.sequence_mode.renders_images()
        {
            self.state = DriverState::RenderingImages;
            self.phase_armed = false;
            self.phase_complete = false;
            tracing::info!("mask phase complete; arming image phase");
            return Ok(DriverStatus::Running);
        }

        self.state = DriverState::Finalizing;
        let sequence = self
            .sequence
            .as_ref()
            .ok_or_else(|| SweepError::validation("driver has no animation sequence (bug)"))?;
        if let Err(e) = sequence.create_metadata().and_then(|_| sequence.cleanup()) {
            return Err(self.fail(e));
        }
        self.teardown(DriverState::Done);
        tracing::info!(frames_saved = self.frames_saved, "render job complete");
        Ok(DriverStatus::Finished)
    }

    /// Release the subscription and settle into a terminal state.
    fn teardown(&mut self, state: DriverState) {
        self.subscription = None;
        self.state = state;
    }

    fn fail(&mut self, err: SweepError) -> SweepError {
        tracing::error!(error = %err, "render job failed");
        self.teardown(DriverState::Cancelled);
        err
    }
}
