//! Sweep enumeration: the Cartesian product of the configured axes, in a
//! deterministic order.

use crate::config::RenderConfig;
use crate::foundation::error::{SweepError, SweepResult};
use crate::host::scene::SceneHandle;
use crate::resolve::ResolvedObjects;
use crate::sweep::frame_spec::FrameSpec;
use crate::sweep::queue::RenderQueue;
use std::path::Path;

/// One tuple of swept parameter values.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct SweepPoint {
    /// Azimuth in degrees, `0..360`.
    pub azimuth: u32,
    /// Elevation in degrees.
    pub elevation: u32,
    /// Zoom factor.
    pub zoom: f64,
    /// Liquid fill percentage.
    pub liquid_level: u32,
}

/// Enumerate every sweep point, outer axis to inner: liquid level, zoom,
/// elevation, azimuth.
///
/// Azimuth runs 0 inclusive to 360 exclusive (it wraps); elevation runs from
/// its start to its max inclusive; zoom iterates a fixed level count so float
/// accumulation can never drop the last level.
pub fn sweep_points(cfg: &RenderConfig) -> Vec<SweepPoint> {
    let sweep = &cfg.sweep;
    let mut points = Vec::with_capacity(cfg.estimated_frame_count() as usize);

    for liquid_level in sweep.liquid.levels() {
        for zoom_idx in 0..sweep.zoom_levels {
            let zoom = sweep.zoom_start + f64::from(zoom_idx) * sweep.zoom_step;
            let mut elevation = sweep.elevation_start;
            while elevation <= sweep.elevation_max {
                let mut azimuth = 0;
                while azimuth < 360 {
                    points.push(SweepPoint {
                        azimuth,
                        elevation,
                        zoom,
                        liquid_level,
                    });
                    azimuth += sweep.azimuth_step;
                }
                elevation += sweep.elevation_step;
            }
        }
    }

    points
}

/// Build the render queue for one invocation.
///
/// Side effect: creates the dataset, mask and image directories if absent.
/// Creation is idempotent and never touches pre-existing contents.
pub fn build_queue(
    cfg: &RenderConfig,
    objects: ResolvedObjects,
    scene: &dyn SceneHandle,
) -> SweepResult<RenderQueue> {
    cfg.validate()?;
    create_output_dirs(cfg)?;

    // Fill level scales against the measured volume height, sampled once per
    // build.
    let volume_height = scene.dimensions(objects.liquid_volume)?[2];

    let mut queue = RenderQueue::new();
    for point in sweep_points(cfg) {
        let cutter_height = volume_height * f64::from(point.liquid_level) * 0.01;
        queue.add(FrameSpec::new(
            point,
            cfg.sweep.focal_length,
            cutter_height,
            objects,
        ));
    }

    debug_assert_eq!(queue.max_length(), cfg.estimated_frame_count());
    tracing::info!(frames = queue.max_length(), "sweep enumerated");
    Ok(queue)
}

fn create_output_dirs(cfg: &RenderConfig) -> SweepResult<()> {
    for dir in [cfg.dataset_dir(), cfg.mask_dir(), cfg.image_dir()] {
        create_dir_idempotent(&dir)?;
    }
    Ok(())
}

fn create_dir_idempotent(dir: &Path) -> SweepResult<()> {
    std::fs::create_dir_all(dir)
        .map_err(|e| SweepError::io(format!("create output dir '{}': {e}", dir.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LiquidAxis, OutputParams, RenderConfig, SweepParams};
    use crate::host::memory::MemoryScene;
    use crate::resolve::{SceneRefs, resolve};
    use std::path::PathBuf;

    fn test_config(root: PathBuf) -> RenderConfig {
        RenderConfig {
            sweep: SweepParams {
                azimuth_step: 90,
                elevation_start: 0,
                elevation_step: 30,
                elevation_max: 60,
                zoom_levels: 1,
                ..SweepParams::default()
            },
            output: OutputParams {
                root_directory: root,
                dataset_name: "ds".to_owned(),
                ..OutputParams::default()
            },
            ..RenderConfig::default()
        }
    }

    fn temp_root(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "orbitsweep_enum_{tag}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0)
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn twelve_frame_scenario_enumerates_in_order() {
        let cfg = test_config(PathBuf::from("/tmp/unused"));
        let points = sweep_points(&cfg);
        assert_eq!(points.len(), 12);
        // Azimuth is the innermost axis.
        let azimuths: Vec<u32> = points.iter().take(5).map(|p| p.azimuth).collect();
        assert_eq!(azimuths, vec![0, 90, 180, 270, 0]);
        let elevations: Vec<u32> = points.iter().map(|p| p.elevation).collect();
        assert_eq!(elevations[0..4], [0, 0, 0, 0]);
        assert_eq!(elevations[4..8], [30, 30, 30, 30]);
        assert_eq!(elevations[8..12], [60, 60, 60, 60]);
    }

    #[test]
    fn point_count_matches_the_estimator_across_a_grid() {
        for azimuth_step in [1, 7, 10, 90, 100, 360] {
            for elevation_step in [1, 10, 30, 90] {
                for zoom_levels in [1, 3] {
                    let mut cfg = test_config(PathBuf::from("/tmp/unused"));
                    cfg.sweep.azimuth_step = azimuth_step;
                    cfg.sweep.elevation_step = elevation_step;
                    cfg.sweep.elevation_max = 60;
                    cfg.sweep.zoom_levels = zoom_levels;
                    cfg.validate().unwrap();
                    assert_eq!(
                        sweep_points(&cfg).len() as u64,
                        cfg.estimated_frame_count(),
                        "azimuth_step={azimuth_step} elevation_step={elevation_step} \
                         zoom_levels={zoom_levels}"
                    );
                }
            }
        }
    }

    #[test]
    fn liquid_axis_is_outermost() {
        let mut cfg = test_config(PathBuf::from("/tmp/unused"));
        cfg.sweep.liquid = LiquidAxis::Swept {
            start: 25,
            step: 50,
            count: 2,
        };
        let points = sweep_points(&cfg);
        assert_eq!(points.len() as u64, cfg.estimated_frame_count());
        assert!(points[..12].iter().all(|p| p.liquid_level == 25));
        assert!(points[12..].iter().all(|p| p.liquid_level == 75));
    }

    #[test]
    fn zoom_levels_step_from_the_start_value() {
        let mut cfg = test_config(PathBuf::from("/tmp/unused"));
        cfg.sweep.zoom_start = 1.0;
        cfg.sweep.zoom_step = 0.5;
        cfg.sweep.zoom_levels = 3;
        let points = sweep_points(&cfg);
        let mut zooms: Vec<f64> = points.iter().map(|p| p.zoom).collect();
        zooms.dedup();
        assert_eq!(zooms, vec![1.0, 1.5, 2.0]);
    }

    #[test]
    fn build_queue_creates_directories_idempotently() {
        let root = temp_root("dirs");
        let cfg = test_config(root.clone());
        let mut scene = MemoryScene::standard_rig();
        let objects = resolve(&mut scene, &SceneRefs::default()).unwrap();

        let marker = cfg.mask_dir().join("keep.txt");
        std::fs::create_dir_all(cfg.mask_dir()).unwrap();
        std::fs::write(&marker, b"existing").unwrap();

        let queue = build_queue(&cfg, objects, &scene).unwrap();
        assert_eq!(queue.max_length(), 12);
        assert!(cfg.image_dir().is_dir());
        assert!(marker.is_file(), "pre-existing contents must survive");

        // Second build against the same directories succeeds.
        build_queue(&cfg, objects, &scene).unwrap();
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn cutter_height_scales_with_volume_and_level() {
        let root = temp_root("cutter");
        let mut cfg = test_config(root.clone());
        cfg.sweep.liquid = LiquidAxis::Fixed { level: 50 };
        let mut scene = MemoryScene::standard_rig();
        let objects = resolve(&mut scene, &SceneRefs::default()).unwrap();

        let mut queue = build_queue(&cfg, objects, &scene).unwrap();
        let spec = queue.pop().unwrap();
        spec.write_keyframe(&mut scene, crate::FrameIndex(1)).unwrap();
        // Volume height 0.5 at 50% fill.
        assert_eq!(
            scene.keyframes(objects.liquid_cutter, crate::Channel::LocationZ),
            vec![(crate::FrameIndex(1), 0.25)]
        );
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn build_queue_rejects_invalid_config() {
        let mut cfg = test_config(PathBuf::from("/tmp/unused"));
        cfg.sweep.azimuth_step = 0;
        let mut scene = MemoryScene::standard_rig();
        let objects = resolve(&mut scene, &SceneRefs::default()).unwrap();
        assert!(build_queue(&cfg, objects, &scene).is_err());
    }
}
