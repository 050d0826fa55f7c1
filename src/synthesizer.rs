use crate::ClusterError;
use image::RgbImage;
use num_traits::Float;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Produces a preview artifact for a group represented by a synthetic vector, such as a
/// centroid, and returns a reference to it.
///
/// The engine calls this once per group in its canonical traversal order, so an implementation
/// naming artifacts after `cluster_id` produces reproducible file names. A failure leaves the
/// preview of that group unset.
pub trait Synthesizer<T> {
    fn synthesize(&self, cluster_id: usize, representative: &[T]) -> Result<String, ClusterError>;
}

/// Writes each representative back out as an RGB image of `width` x `height` pixels.
///
/// Meant for items whose features are the raw RGB bytes of resized images, as produced by
/// [`crate::load_image_dir`]. Components are rounded and clamped into `0..=255`.
#[derive(Debug, Clone)]
pub struct CentroidImageWriter {
    dir: PathBuf,
    prefix: String,
    width: u32,
    height: u32,
}

impl CentroidImageWriter {
    pub fn new(
        dir: impl Into<PathBuf>,
        prefix: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        CentroidImageWriter {
            dir: dir.into(),
            prefix: prefix.into(),
            width,
            height,
        }
    }

    /// Path of the preview of `cluster_id`: `<dir>/<prefix>-<cluster_id>.png`.
    pub fn preview_path(&self, cluster_id: usize) -> PathBuf {
        self.dir.join(format!("{}-{cluster_id}.png", self.prefix))
    }

    fn to_pixels<T: Float>(&self, representative: &[T]) -> Result<RgbImage, ClusterError> {
        let expected = self.width as usize * self.height as usize * 3;
        if representative.len() != expected {
            return Err(ClusterError::SynthesisFailure(format!(
                "a {}x{} RGB preview needs {expected} components, but the representative has {}",
                self.width,
                self.height,
                representative.len()
            )));
        }
        let bytes = representative
            .iter()
            .map(|component| {
                component
                    .to_f64()
                    .filter(|c| c.is_finite())
                    .map(|c| c.round().clamp(0.0, 255.0) as u8)
                    .unwrap_or(0)
            })
            .collect();
        RgbImage::from_raw(self.width, self.height, bytes).ok_or_else(|| {
            ClusterError::SynthesisFailure(String::from("pixel buffer does not fit the raster"))
        })
    }
}

impl<T: Float> Synthesizer<T> for CentroidImageWriter {
    fn synthesize(&self, cluster_id: usize, representative: &[T]) -> Result<String, ClusterError> {
        let raster = self.to_pixels(representative)?;
        fs::create_dir_all(&self.dir).map_err(|err| {
            ClusterError::SynthesisFailure(format!("{}: {err}", self.dir.display()))
        })?;
        let path = self.preview_path(cluster_id);
        raster
            .save(&path)
            .map_err(|err| ClusterError::SynthesisFailure(format!("{}: {err}", path.display())))?;
        debug!(cluster_id, path = %path.display(), "wrote preview");
        Ok(path.to_string_lossy().into_owned())
    }
}
