//! Resolution and validation of the named scene references a sweep needs.
//!
//! Scene state is externally mutable between invocations, so resolution is
//! never cached: every render trigger re-runs [`resolve`] and fails fast with
//! a user-facing message before any scene or engine mutation happens.

use crate::foundation::error::{SweepError, SweepResult};
use crate::host::scene::{ObjectId, ObjectKind, PathFollowConfig, SceneHandle};
use serde::{Deserialize, Serialize};

/// Named scene references, as read from the configuration surface.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneRefs {
    /// The render camera.
    pub camera: String,
    /// Curve the camera orbits along.
    pub camera_track: String,
    /// Mesh whose Z location sets the visible liquid height.
    pub liquid_cutter: String,
    /// Optional mirror cutter in the segmentation variant.
    pub seg_cutter: Option<String>,
    /// Liquid volume mesh; its measured height scales the fill level.
    pub liquid_volume: String,
    /// Collection rendered during the image phase.
    pub rgb_variant: String,
    /// Collection rendered during the mask phase.
    pub seg_variant: String,
}

impl Default for SceneRefs {
    fn default() -> Self {
        Self {
            camera: "camera".to_owned(),
            camera_track: "camera_track".to_owned(),
            liquid_cutter: "liquid_cutter".to_owned(),
            seg_cutter: Some("seg_cutter".to_owned()),
            liquid_volume: "liquid_volume".to_owned(),
            rgb_variant: "rgb_variant".to_owned(),
            seg_variant: "seg_variant".to_owned(),
        }
    }
}

/// Handles resolved and validated against the live scene, valid for one
/// render invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedObjects {
    /// The render camera.
    pub camera: ObjectId,
    /// The camera track curve.
    pub camera_track: ObjectId,
    /// The liquid cutter mesh.
    pub liquid_cutter: ObjectId,
    /// The segmentation-variant cutter mesh, when configured.
    pub seg_cutter: Option<ObjectId>,
    /// The liquid volume mesh.
    pub liquid_volume: ObjectId,
    /// The RGB-variant collection.
    pub rgb_variant: ObjectId,
    /// The segmentation-variant collection.
    pub seg_variant: ObjectId,
}

impl ResolvedObjects {
    /// The handles that carry animation data. Collections carry none and are
    /// excluded.
    pub fn animated(&self) -> Vec<ObjectId> {
        let mut ids = vec![
            self.camera,
            self.camera_track,
            self.liquid_cutter,
            self.liquid_volume,
        ];
        if let Some(seg_cutter) = self.seg_cutter {
            ids.push(seg_cutter);
        }
        ids
    }
}

fn lookup_typed(
    scene: &dyn SceneHandle,
    name: &str,
    kind: ObjectKind,
    what: &str,
    hint: &str,
) -> SweepResult<ObjectId> {
    let id = scene.lookup(name).ok_or_else(|| {
        SweepError::validation(format!("Invalid {what} object '{name}'. {hint}"))
    })?;
    if scene.kind(id) != Some(kind) {
        return Err(SweepError::validation(format!(
            "Invalid {what} object '{name}'. {hint}"
        )));
    }
    Ok(id)
}

/// Resolve and validate every named reference, then force the camera's
/// path-follow constraint onto the track.
pub fn resolve(scene: &mut dyn SceneHandle, refs: &SceneRefs) -> SweepResult<ResolvedObjects> {
    let camera = lookup_typed(
        scene,
        &refs.camera,
        ObjectKind::Camera,
        "camera",
        "Pick a camera in the scene.",
    )?;
    let camera_track = lookup_typed(
        scene,
        &refs.camera_track,
        ObjectKind::Curve,
        "camera track",
        "Pick a curve object.",
    )?;
    let liquid_cutter = lookup_typed(
        scene,
        &refs.liquid_cutter,
        ObjectKind::Mesh,
        "liquid cutter",
        "Pick a mesh object.",
    )?;
    let seg_cutter = match &refs.seg_cutter {
        Some(name) => Some(lookup_typed(
            scene,
            name,
            ObjectKind::Mesh,
            "segmentation cutter",
            "Pick a mesh object.",
        )?),
        None => None,
    };
    let liquid_volume = lookup_typed(
        scene,
        &refs.liquid_volume,
        ObjectKind::Mesh,
        "liquid volume",
        "Pick a mesh object.",
    )?;
    let rgb_variant = lookup_typed(
        scene,
        &refs.rgb_variant,
        ObjectKind::Collection,
        "RGB collection",
        "Pick a valid collection.",
    )?;
    let seg_variant = lookup_typed(
        scene,
        &refs.seg_variant,
        ObjectKind::Collection,
        "segmentation collection",
        "Pick a valid collection.",
    )?;

    if !scene.supports_path_follow(camera) {
        return Err(SweepError::validation(
            "The camera has no path-follow constraint slot. \
             Add a \"Follow Path\" constraint to the camera.",
        ));
    }
    scene.configure_path_follow(camera, PathFollowConfig::orbit(camera_track))?;

    Ok(ResolvedObjects {
        camera,
        camera_track,
        liquid_cutter,
        seg_cutter,
        liquid_volume,
        rgb_variant,
        seg_variant,
    })
}
