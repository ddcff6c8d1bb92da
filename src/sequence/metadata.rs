//! The `metadata.json` document written once per dataset.

use crate::config::{RenderConfig, SweepParams};
use crate::foundation::error::{SweepError, SweepResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Image-level settings recorded alongside the sweep parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Image-phase sample count.
    pub sample_amount: u32,
    /// Mask filename prefix.
    pub mask_prefix: String,
    /// Image filename prefix.
    pub image_prefix: String,
    /// Semantic part name -> 8-bit RGB triple.
    pub segmentation_colors: BTreeMap<String, [u8; 3]>,
    /// Masks are rendered without denoising; consumers can rely on exact
    /// colors.
    pub masks_denoised: bool,
}

/// The dataset's self-describing record: everything needed to interpret (or
/// reproduce) the frames on disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    /// Sweep axis parameters the queue was built from.
    pub sweep: SweepParams,
    /// Per-material shader parameter snapshot.
    pub material_settings: BTreeMap<String, BTreeMap<String, f64>>,
    /// Image-level settings.
    pub image_data: ImageData,
}

impl DatasetMetadata {
    /// Build the metadata document from a configuration snapshot.
    pub fn from_config(cfg: &RenderConfig) -> Self {
        let segmentation_colors = cfg
            .segmentation_colors
            .iter()
            .map(|(name, rgb)| (name.clone(), rgb.map(to_u8)))
            .collect();
        Self {
            sweep: cfg.sweep.clone(),
            material_settings: cfg.material_settings.clone(),
            image_data: ImageData {
                width: cfg.output.width,
                height: cfg.output.height,
                sample_amount: cfg.output.sample_count,
                mask_prefix: cfg.output.mask_prefix.clone(),
                image_prefix: cfg.output.image_prefix.clone(),
                segmentation_colors,
                masks_denoised: false,
            },
        }
    }

    /// Write the document as pretty-printed JSON.
    pub fn write(&self, path: &Path) -> SweepResult<()> {
        let f = File::create(path)
            .map_err(|e| SweepError::io(format!("create metadata '{}': {e}", path.display())))?;
        serde_json::to_writer_pretty(BufWriter::new(f), self)
            .map_err(|e| SweepError::serde(format!("write metadata '{}': {e}", path.display())))
    }

    /// Read a document back from disk.
    pub fn from_path(path: &Path) -> SweepResult<Self> {
        let f = File::open(path)
            .map_err(|e| SweepError::io(format!("open metadata '{}': {e}", path.display())))?;
        serde_json::from_reader(BufReader::new(f))
            .map_err(|e| SweepError::serde(format!("parse metadata '{}': {e}", path.display())))
    }
}

fn to_u8(normalized: f64) -> u8 {
    (normalized * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OutputParams, RenderConfig};
    use std::path::PathBuf;

    fn cfg() -> RenderConfig {
        let mut cfg = RenderConfig {
            output: OutputParams {
                root_directory: PathBuf::from("/tmp/unused"),
                dataset_name: "ds".to_owned(),
                ..OutputParams::default()
            },
            ..RenderConfig::default()
        };
        cfg.segmentation_colors
            .insert("bin_interior".to_owned(), [1.0, 0.0, 0.5]);
        cfg.segmentation_colors
            .insert("grease".to_owned(), [0.2, 0.2, 0.2]);
        cfg.material_settings.insert(
            "grease".to_owned(),
            BTreeMap::from([("Roughness".to_owned(), 0.35)]),
        );
        cfg
    }

    #[test]
    fn colors_scale_to_8_bit() {
        let meta = DatasetMetadata::from_config(&cfg());
        assert_eq!(
            meta.image_data.segmentation_colors["bin_interior"],
            [255, 0, 128]
        );
        assert_eq!(meta.image_data.segmentation_colors["grease"], [51, 51, 51]);
    }

    #[test]
    fn masks_denoised_is_pinned_false() {
        assert!(!DatasetMetadata::from_config(&cfg()).image_data.masks_denoised);
    }

    #[test]
    fn round_trip_reproduces_sweep_and_image_settings() {
        let source = cfg();
        let meta = DatasetMetadata::from_config(&source);
        let json = serde_json::to_string_pretty(&meta).unwrap();
        let back: DatasetMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
        assert_eq!(back.sweep, source.sweep);
        assert_eq!(back.image_data.width, source.output.width);
        assert_eq!(back.image_data.sample_amount, source.output.sample_count);
        assert_eq!(back.material_settings, source.material_settings);
    }
}
