//! Fallback driver that renders one frame per pop, without keyframes.
//!
//! The canonical path drains the queue into keyframes and renders each phase
//! as a single batched animation job. This driver keeps the older strategy
//! alive for hosts where animation batching is unavailable: on each tick it
//! pops the next frame, writes its parameters straight onto the scene, and
//! arms one still render per enabled phase, pairing the phases per frame. No
//! metadata or temp cleanup is involved; stills are written directly to their
//! final paths by the engine.

use crate::config::RenderConfig;
use crate::foundation::core::FrameType;
use crate::foundation::error::{SweepError, SweepResult};
use crate::host::engine::{EngineSignal, RenderEngine};
use crate::host::scene::SceneHandle;
use crate::host::scheduler::{DEFAULT_TIMER_INTERVAL_SECS, Scheduler, Subscription};
use crate::resolve::{SceneRefs, resolve};
use crate::sequence::preset::phase_preset;
use crate::sweep::enumerate::build_queue;
use crate::sweep::frame_spec::FrameSpec;
use crate::sweep::queue::RenderQueue;

use super::render_driver::DriverStatus;

/// Pop-and-render-per-frame driver.
pub struct ImmediateDriver {
    cfg: RenderConfig,
    refs: SceneRefs,
    timer_interval_secs: f64,

    queue: Option<RenderQueue>,
    current: Option<FrameSpec>,
    pending_phases: Vec<FrameType>,
    counter: u64,
    subscription: Option<Subscription>,
    rendering: bool,
    stop: bool,
    finished: bool,
}

impl ImmediateDriver {
    /// Create an idle driver for one configuration snapshot.
    pub fn new(cfg: RenderConfig, refs: SceneRefs) -> Self {
        Self {
            cfg,
            refs,
            timer_interval_secs: DEFAULT_TIMER_INTERVAL_SECS,
            queue: None,
            current: None,
            pending_phases: Vec::new(),
            counter: 0,
            subscription: None,
            rendering: false,
            stop: false,
            finished: false,
        }
    }

    /// Override the timer interval the driver subscribes with.
    pub fn with_timer_interval(mut self, secs: f64) -> Self {
        self.timer_interval_secs = secs;
        self
    }

    /// Whether host hooks are currently registered.
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Validate, build the queue and subscribe. Non-blocking.
    pub fn execute(
        &mut self,
        scene: &mut dyn SceneHandle,
        scheduler: &Scheduler,
    ) -> SweepResult<()> {
        if self.queue.is_some() || self.finished {
            return Err(SweepError::validation(
                "this driver has already executed; build a new one per render",
            ));
        }
        self.cfg.validate()?;
        let objects = resolve(scene, &self.refs)?;
        self.queue = Some(build_queue(&self.cfg, objects, scene)?);
        self.subscription = Some(scheduler.subscribe(self.timer_interval_secs)?);
        Ok(())
    }

    /// Advance by one host timer tick.
    pub fn tick(
        &mut self,
        scene: &mut dyn SceneHandle,
        engine: &mut dyn RenderEngine,
    ) -> SweepResult<DriverStatus> {
        if self.finished {
            return Ok(DriverStatus::Finished);
        }
        let Some(queue) = self.queue.as_mut() else {
            if self.stop {
                return Ok(DriverStatus::Cancelled);
            }
            return Err(SweepError::validation("execute() must run before ticking"));
        };

        for signal in engine.drain_signals() {
            match signal {
                EngineSignal::FrameStarted(_) => self.rendering = true,
                EngineSignal::FrameFinished(_) => {}
                EngineSignal::JobComplete => self.rendering = false,
                EngineSignal::Cancelled => self.stop = true,
            }
        }

        if self.stop {
            self.subscription = None;
            self.queue = None;
            tracing::warn!(frames_rendered = self.counter, "immediate render cancelled");
            return Ok(DriverStatus::Cancelled);
        }

        if self.rendering {
            return Ok(DriverStatus::Running);
        }

        if self.pending_phases.is_empty() {
            if queue.is_empty() {
                self.subscription = None;
                self.queue = None;
                self.finished = true;
                tracing::info!(frames_rendered = self.counter, "immediate render complete");
                return Ok(DriverStatus::Finished);
            }
            self.current = Some(queue.pop()?);
            self.pending_phases = self.cfg.output.sequence_mode.phases();
            self.counter += 1;
        }

        let phase = self.pending_phases.remove(0);
        let spec = self
            .current
            .ok_or_else(|| SweepError::validation("no frame staged for rendering (bug)"))?;
        let arm = (|| -> SweepResult<()> {
            engine.configure(&phase_preset(phase, &self.cfg))?;
            spec.apply(scene)?;
            let (dir, prefix) = self.cfg.phase_output(phase);
            let path = dir.join(format!(
                "{prefix}_{:06}_{}.png",
                self.counter - 1,
                phase.as_str()
            ));
            engine.render_still(&path)
        })();
        if let Err(e) = arm {
            self.subscription = None;
            self.queue = None;
            tracing::error!(error = %e, "immediate render failed");
            return Err(e);
        }
        self.rendering = true;

        Ok(DriverStatus::Running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OutputParams, SequenceMode, SweepParams};
    use crate::host::memory::{MemoryEngine, MemoryScene};
    use std::path::PathBuf;

    fn temp_root(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "orbitsweep_imm_{tag}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0)
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn small_config(root: PathBuf) -> RenderConfig {
        RenderConfig {
            sweep: SweepParams {
                azimuth_step: 180,
                elevation_step: 60,
                elevation_max: 0,
                ..SweepParams::default()
            },
            output: OutputParams {
                root_directory: root,
                dataset_name: "ds".to_owned(),
                width: 4,
                height: 4,
                ..OutputParams::default()
            },
            ..RenderConfig::default()
        }
    }

    fn drive_to_completion(
        driver: &mut ImmediateDriver,
        scene: &mut MemoryScene,
        engine: &mut MemoryEngine,
    ) -> DriverStatus {
        for _ in 0..1000 {
            engine.step().unwrap();
            match driver.tick(scene, engine).unwrap() {
                DriverStatus::Running => {}
                status => return status,
            }
        }
        panic!("immediate driver did not finish");
    }

    #[test]
    fn renders_phase_pairs_per_frame_to_final_paths() {
        let root = temp_root("pairs");
        let cfg = small_config(root.clone());
        let mut scene = MemoryScene::standard_rig();
        let mut engine = MemoryEngine::new();
        let scheduler = Scheduler::new();
        let mut driver = ImmediateDriver::new(cfg.clone(), SceneRefs::default());
        driver.execute(&mut scene, &scheduler).unwrap();

        let status = drive_to_completion(&mut driver, &mut scene, &mut engine);
        assert_eq!(status, DriverStatus::Finished);
        assert_eq!(scheduler.active_subscriptions(), 0);

        // Two azimuths, one elevation: frames 0 and 1, mask+raw each.
        for counter in 0..2 {
            assert!(
                cfg.mask_dir()
                    .join(format!("MASK_{counter:06}_mask.png"))
                    .is_file()
            );
            assert!(
                cfg.image_dir()
                    .join(format!("RGB_{counter:06}_raw.png"))
                    .is_file()
            );
        }
        assert!(!cfg.dataset_dir().join("metadata.json").exists());
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn masks_only_mode_skips_the_image_phase() {
        let root = temp_root("masksonly");
        let mut cfg = small_config(root.clone());
        cfg.output.sequence_mode = SequenceMode::MasksOnly;
        let mut scene = MemoryScene::standard_rig();
        let mut engine = MemoryEngine::new();
        let scheduler = Scheduler::new();
        let mut driver = ImmediateDriver::new(cfg.clone(), SceneRefs::default());
        driver.execute(&mut scene, &scheduler).unwrap();

        drive_to_completion(&mut driver, &mut scene, &mut engine);
        assert!(cfg.mask_dir().join("MASK_000000_mask.png").is_file());
        assert!(!cfg.image_dir().join("RGB_000000_raw.png").exists());
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn cancellation_releases_the_subscription() {
        let root = temp_root("cancel");
        let cfg = small_config(root.clone());
        let mut scene = MemoryScene::standard_rig();
        let mut engine = MemoryEngine::new();
        let scheduler = Scheduler::new();
        let mut driver = ImmediateDriver::new(cfg, SceneRefs::default());
        driver.execute(&mut scene, &scheduler).unwrap();

        driver.tick(&mut scene, &mut engine).unwrap();
        engine.request_cancel();
        engine.step().unwrap();
        let status = driver.tick(&mut scene, &mut engine).unwrap();
        assert_eq!(status, DriverStatus::Cancelled);
        assert_eq!(scheduler.active_subscriptions(), 0);
        std::fs::remove_dir_all(&root).unwrap();
    }
}
