//! The UI-facing estimator and the queue builder must agree exactly for every
//! valid configuration: the estimate sizes progress bars and the animation
//! range alike.

use orbitsweep::{
    LiquidAxis, MemoryScene, OutputParams, RenderConfig, SceneRefs, SweepParams, build_queue,
    resolve, sweep_points,
};
use std::path::PathBuf;

fn temp_root(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "orbitsweep_parity_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn config(root: PathBuf, sweep: SweepParams) -> RenderConfig {
    RenderConfig {
        sweep,
        output: OutputParams {
            root_directory: root,
            dataset_name: "ds".to_owned(),
            ..OutputParams::default()
        },
        ..RenderConfig::default()
    }
}

#[test]
fn queue_length_equals_estimate_across_a_parameter_grid() {
    let root = temp_root("grid");
    let mut scene = MemoryScene::standard_rig();
    let objects = resolve(&mut scene, &SceneRefs::default()).unwrap();

    for azimuth_step in [1, 3, 7, 45, 90, 113, 360] {
        for (elevation_start, elevation_step, elevation_max) in
            [(0, 1, 0), (0, 10, 90), (15, 20, 75), (5, 90, 90)]
        {
            for zoom_levels in [1, 2, 5] {
                for liquid in [
                    LiquidAxis::Fixed { level: 100 },
                    LiquidAxis::Swept {
                        start: 10,
                        step: 30,
                        count: 4,
                    },
                ] {
                    let cfg = config(
                        root.clone(),
                        SweepParams {
                            liquid,
                            azimuth_step,
                            elevation_start,
                            elevation_step,
                            elevation_max,
                            zoom_levels,
                            ..SweepParams::default()
                        },
                    );
                    cfg.validate().unwrap();
                    let estimate = cfg.estimated_frame_count();
                    assert_eq!(sweep_points(&cfg).len() as u64, estimate);
                    let queue = build_queue(&cfg, objects, &scene).unwrap();
                    assert_eq!(queue.max_length(), estimate);
                }
            }
        }
    }

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn estimate_matches_the_closed_form() {
    let root = temp_root("closed");
    let cfg = config(
        root.clone(),
        SweepParams {
            azimuth_step: 90,
            elevation_start: 0,
            elevation_step: 30,
            elevation_max: 60,
            zoom_levels: 1,
            ..SweepParams::default()
        },
    );
    // ceil(360/90) * (floor(60/30) + 1) * 1 = 4 * 3 = 12.
    assert_eq!(cfg.estimated_frame_count(), 12);
    assert_eq!(cfg.estimated_file_count(), 24);

    let points = sweep_points(&cfg);
    let azimuths: std::collections::BTreeSet<u32> = points.iter().map(|p| p.azimuth).collect();
    let elevations: std::collections::BTreeSet<u32> =
        points.iter().map(|p| p.elevation).collect();
    assert_eq!(azimuths, [0, 90, 180, 270].into_iter().collect());
    assert_eq!(elevations, [0, 30, 60].into_iter().collect());

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn drained_queue_reports_zero_lengths() {
    let root = temp_root("drain");
    let cfg = config(
        root.clone(),
        SweepParams {
            azimuth_step: 120,
            elevation_step: 60,
            elevation_max: 0,
            ..SweepParams::default()
        },
    );
    let mut scene = MemoryScene::standard_rig();
    let objects = resolve(&mut scene, &SceneRefs::default()).unwrap();
    let mut queue = build_queue(&cfg, objects, &scene).unwrap();

    let n = queue.max_length();
    assert_eq!(n, 3);
    for _ in 0..n {
        assert_eq!(queue.max_length(), n, "max length is pop-invariant");
        queue.pop().unwrap();
    }
    assert_eq!(queue.max_length(), 0);
    assert_eq!(queue.remaining_len(), 0);
    assert!(queue.pop().is_err());

    std::fs::remove_dir_all(&root).unwrap();
}
