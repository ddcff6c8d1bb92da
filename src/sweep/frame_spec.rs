//! One sweep point and the scene writes it performs.

use crate::foundation::core::FrameIndex;
use crate::foundation::error::SweepResult;
use crate::host::scene::{Channel, ObjectId, SceneHandle};
use crate::resolve::ResolvedObjects;
use crate::sweep::enumerate::SweepPoint;

/// One point in the parameter sweep plus the resolved handles it writes to.
///
/// A `FrameSpec` is a pure value created once during enumeration and never
/// mutated; its only side effect is the one-time channel write it performs on
/// the external scene, either as a keyframe ([`FrameSpec::write_keyframe`]) or
/// directly ([`FrameSpec::apply`], fallback mode).
#[derive(Clone, Copy, Debug)]
pub struct FrameSpec {
    point: SweepPoint,
    focal_length: f64,
    cutter_height: f64,
    objects: ResolvedObjects,
}

impl FrameSpec {
    /// Build a spec for one sweep point.
    ///
    /// `cutter_height` is the world-space Z the cutter meshes move to, already
    /// scaled from the point's fill level and the measured volume height.
    pub fn new(
        point: SweepPoint,
        focal_length: f64,
        cutter_height: f64,
        objects: ResolvedObjects,
    ) -> Self {
        Self {
            point,
            focal_length,
            cutter_height,
            objects,
        }
    }

    /// Azimuth in degrees, `0..360`.
    pub fn azimuth(&self) -> u32 {
        self.point.azimuth
    }

    /// Elevation in degrees.
    pub fn elevation(&self) -> u32 {
        self.point.elevation
    }

    /// Zoom factor.
    pub fn zoom(&self) -> f64 {
        self.point.zoom
    }

    /// Liquid fill percentage.
    pub fn liquid_level(&self) -> u32 {
        self.point.liquid_level
    }

    /// Normalized position along the camera track.
    ///
    /// The track's zero point sits a quarter turn off the azimuth origin, so
    /// elevation rides on top of a fixed 0.25 phase offset.
    pub fn path_offset(&self) -> f64 {
        0.25 + f64::from(self.point.elevation) / 360.0
    }

    /// Record this point as one keyframe per channel at `frame`.
    pub fn write_keyframe(
        &self,
        scene: &mut dyn SceneHandle,
        frame: FrameIndex,
    ) -> SweepResult<()> {
        self.write_channels(|id, channel, value| scene.insert_keyframe(id, channel, value, frame))
    }

    /// Write this point's channel values directly, without keyframes.
    /// Fallback-mode path.
    pub fn apply(&self, scene: &mut dyn SceneHandle) -> SweepResult<()> {
        self.write_channels(|id, channel, value| scene.set_channel(id, channel, value))
    }

    fn write_channels(
        &self,
        mut write: impl FnMut(ObjectId, Channel, f64) -> SweepResult<()>,
    ) -> SweepResult<()> {
        write(self.objects.camera, Channel::PathOffset, self.path_offset())?;
        write(
            self.objects.camera_track,
            Channel::RotationZ,
            f64::from(self.point.azimuth).to_radians(),
        )?;
        write(
            self.objects.camera_track,
            Channel::UniformScale,
            self.point.zoom,
        )?;
        write(self.objects.camera, Channel::FocalLength, self.focal_length)?;
        write(
            self.objects.liquid_cutter,
            Channel::LocationZ,
            self.cutter_height,
        )?;
        if let Some(seg_cutter) = self.objects.seg_cutter {
            write(seg_cutter, Channel::LocationZ, self.cutter_height)?;
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn for_tests(azimuth: u32, elevation: u32, zoom: f64, liquid_level: u32) -> Self {
        Self::new(
            SweepPoint {
                azimuth,
                elevation,
                zoom,
                liquid_level,
            },
            50.0,
            0.5,
            ResolvedObjects {
                camera: ObjectId(0),
                camera_track: ObjectId(1),
                liquid_cutter: ObjectId(2),
                seg_cutter: Some(ObjectId(3)),
                liquid_volume: ObjectId(4),
                rgb_variant: ObjectId(5),
                seg_variant: ObjectId(6),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryScene;
    use crate::host::scene::ObjectKind;
    use crate::resolve::{SceneRefs, resolve};

    fn rig() -> (MemoryScene, ResolvedObjects) {
        let mut scene = MemoryScene::standard_rig();
        let resolved = resolve(&mut scene, &SceneRefs::default()).unwrap();
        (scene, resolved)
    }

    #[test]
    fn path_offset_carries_the_quarter_turn_phase() {
        let spec = FrameSpec::for_tests(0, 0, 1.0, 100);
        assert_eq!(spec.path_offset(), 0.25);
        let spec = FrameSpec::for_tests(0, 90, 1.0, 100);
        assert_eq!(spec.path_offset(), 0.5);
    }

    #[test]
    fn write_keyframe_touches_every_tracked_channel() {
        let (mut scene, objects) = rig();
        let spec = FrameSpec::new(
            SweepPoint {
                azimuth: 90,
                elevation: 30,
                zoom: 1.5,
                liquid_level: 50,
            },
            50.0,
            0.25,
            objects,
        );
        spec.write_keyframe(&mut scene, FrameIndex(7)).unwrap();

        assert_eq!(
            scene.keyframes(objects.camera, Channel::PathOffset),
            vec![(FrameIndex(7), 0.25 + 30.0 / 360.0)]
        );
        let rot = scene.keyframes(objects.camera_track, Channel::RotationZ);
        assert_eq!(rot.len(), 1);
        assert!((rot[0].1 - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(
            scene.keyframes(objects.camera_track, Channel::UniformScale),
            vec![(FrameIndex(7), 1.5)]
        );
        assert_eq!(
            scene.keyframes(objects.camera, Channel::FocalLength),
            vec![(FrameIndex(7), 50.0)]
        );
        assert_eq!(
            scene.keyframes(objects.liquid_cutter, Channel::LocationZ),
            vec![(FrameIndex(7), 0.25)]
        );
        assert_eq!(
            scene.keyframes(objects.seg_cutter.unwrap(), Channel::LocationZ),
            vec![(FrameIndex(7), 0.25)]
        );
    }

    #[test]
    fn apply_writes_values_without_keyframes() {
        let (mut scene, objects) = rig();
        let spec = FrameSpec::new(
            SweepPoint {
                azimuth: 180,
                elevation: 0,
                zoom: 2.0,
                liquid_level: 100,
            },
            35.0,
            0.5,
            objects,
        );
        spec.apply(&mut scene).unwrap();
        assert_eq!(
            scene.channel_value(objects.camera_track, Channel::UniformScale),
            Some(2.0)
        );
        assert_eq!(
            scene.keyframe_count(objects.camera_track, Channel::UniformScale),
            0
        );
    }

    #[test]
    fn missing_seg_cutter_skips_its_write() {
        let mut scene = MemoryScene::standard_rig();
        let refs = SceneRefs {
            seg_cutter: None,
            ..SceneRefs::default()
        };
        let objects = resolve(&mut scene, &refs).unwrap();
        let spec = FrameSpec::new(
            SweepPoint {
                azimuth: 0,
                elevation: 0,
                zoom: 1.0,
                liquid_level: 100,
            },
            50.0,
            0.5,
            objects,
        );
        spec.write_keyframe(&mut scene, FrameIndex(1)).unwrap();
        // Only the liquid cutter carries a location keyframe.
        let seg = scene.lookup("seg_cutter").unwrap();
        assert_eq!(scene.kind(seg), Some(ObjectKind::Mesh));
        assert_eq!(scene.keyframe_count(seg, Channel::LocationZ), 0);
    }
}
