//! Normalized image adapter with in-place mutators.
//!
//! The analysis code never touches pixels through anything but
//! [`ImageAdapter`]. Every mutating operation bumps a generation counter so
//! that consumers caching geometry derived from the pixels (edge maps,
//! detected outlines) can tell when their cache went stale.
//!
//! # Coordinate System Conversions
//!
//! - **ndarray**: matrix indexing \[row, col\] = \[y, x\] with (height, width) dimensions
//! - **image crate**: graphics indexing (x, y) with (width, height) dimensions
//!
//! Points handed out by this module are always (x, y).

use std::path::{Path, PathBuf};

use image::{GrayImage, ImageBuffer, Luma};
use ndarray::{s, Array2, ArrayView2, Axis};
use thiserror::Error;

/// Side length of the corner boxes used by the corner inversion heuristic.
pub const DEFAULT_INVERSION_BOX: usize = 20;

/// Errors raised by image construction and mutation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImageError {
    /// Pixel spacing must be a finite positive number.
    #[error("invalid pixel spacing {0} px/mm")]
    InvalidSpacing(f64),

    /// Image has no pixels.
    #[error("image is empty ({rows}x{cols})")]
    Empty {
        /// Row count.
        rows: usize,
        /// Column count.
        cols: usize,
    },

    /// Crop would remove the whole image.
    #[error("cannot crop {pixels} px from each edge of a {rows}x{cols} image")]
    CropTooLarge {
        /// Pixels requested per edge.
        pixels: usize,
        /// Row count before cropping.
        rows: usize,
        /// Column count before cropping.
        cols: usize,
    },
}

/// The view of an image the phantom analysis needs: pixels, spacing and the
/// in-place mutators applied during orientation correction.
pub trait ImageAdapter {
    /// Pixel data indexed \[row, col\].
    fn array(&self) -> ArrayView2<'_, f64>;

    /// Physical scale in pixels per millimetre.
    fn dpmm(&self) -> f64;

    /// Incremented by every mutation.
    fn generation(&self) -> u64;

    /// Replace every value `v` with `-v + max + min`.
    fn invert(&mut self);

    /// Mirror the image left to right.
    fn fliplr(&mut self);

    /// Remove `pixels` from every edge.
    fn crop(&mut self, pixels: usize) -> Result<(), ImageError>;

    /// Subtract the minimum so the darkest pixel is zero.
    fn ground(&mut self);

    /// Divide by the maximum so the brightest pixel is one.
    fn normalize(&mut self);

    /// Geometric center in (x, y) pixel coordinates.
    fn center(&self) -> (f64, f64) {
        let (rows, cols) = self.array().dim();
        ((cols as f64 - 1.0) / 2.0, (rows as f64 - 1.0) / 2.0)
    }

    /// Corner-intensity inversion heuristic.
    ///
    /// Radiographs of a phantom placed in an open field have dark corners.
    /// When the mean of four corner boxes (offset one pixel from the border)
    /// is brighter than the whole-image mean the polarity is assumed flipped
    /// and the image is inverted.
    ///
    /// # Returns
    /// `true` when the image was inverted
    fn check_inversion(&mut self, box_size: usize) -> bool {
        let (corner_mean, image_mean) = {
            let array = self.array();
            let (rows, cols) = array.dim();
            if rows < 3 || cols < 3 {
                return false;
            }
            let b = box_size.max(1).min(rows - 2).min(cols - 2);
            let boxes = [
                array.slice(s![1..1 + b, 1..1 + b]),
                array.slice(s![1..1 + b, cols - 1 - b..cols - 1]),
                array.slice(s![rows - 1 - b..rows - 1, 1..1 + b]),
                array.slice(s![rows - 1 - b..rows - 1, cols - 1 - b..cols - 1]),
            ];
            let sum: f64 = boxes.iter().map(|view| view.sum()).sum();
            let count: usize = boxes.iter().map(|view| view.len()).sum();
            let image_mean = array.sum() / array.len() as f64;
            (sum / count as f64, image_mean)
        };
        if corner_mean > image_mean {
            log::info!("corner mean {corner_mean:.4} exceeds image mean {image_mean:.4}; inverting");
            self.invert();
            true
        } else {
            false
        }
    }
}

/// Owned floating-point radiograph with pixel spacing and provenance.
#[derive(Debug, Clone)]
pub struct PlanarImage {
    array: Array2<f64>,
    dpmm: f64,
    path: Option<PathBuf>,
    generation: u64,
}

impl PlanarImage {
    /// Wrap a pixel array.
    ///
    /// # Arguments
    /// * `array` - Pixel values indexed \[row, col\]
    /// * `dpmm` - Pixels per millimetre at the detector plane
    pub fn new(array: Array2<f64>, dpmm: f64) -> Result<Self, ImageError> {
        if !(dpmm.is_finite() && dpmm > 0.0) {
            return Err(ImageError::InvalidSpacing(dpmm));
        }
        let (rows, cols) = array.dim();
        if rows == 0 || cols == 0 {
            return Err(ImageError::Empty { rows, cols });
        }
        Ok(Self {
            array,
            dpmm,
            path: None,
            generation: 0,
        })
    }

    /// Record where the pixels were decoded from.
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Build from an 8-bit grayscale buffer, scaled to [0, 1].
    pub fn from_gray8(image: &GrayImage, dpmm: f64) -> Result<Self, ImageError> {
        let (width, height) = image.dimensions();
        let full_scale = u8::MAX as f64;
        let array = Array2::from_shape_fn((height as usize, width as usize), |(row, col)| {
            image.get_pixel(col as u32, row as u32)[0] as f64 / full_scale
        });
        Self::new(array, dpmm)
    }

    /// Build from a 16-bit grayscale buffer, scaled to [0, 1].
    pub fn from_gray16(
        image: &ImageBuffer<Luma<u16>, Vec<u16>>,
        dpmm: f64,
    ) -> Result<Self, ImageError> {
        let (width, height) = image.dimensions();
        let full_scale = u16::MAX as f64;
        let array = Array2::from_shape_fn((height as usize, width as usize), |(row, col)| {
            image.get_pixel(col as u32, row as u32)[0] as f64 / full_scale
        });
        Self::new(array, dpmm)
    }

    /// Source path, when known.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Consume the adapter and return the pixels.
    pub fn into_array(self) -> Array2<f64> {
        self.array
    }
}

impl ImageAdapter for PlanarImage {
    fn array(&self) -> ArrayView2<'_, f64> {
        self.array.view()
    }

    fn dpmm(&self) -> f64 {
        self.dpmm
    }

    fn generation(&self) -> u64 {
        self.generation
    }

    fn invert(&mut self) {
        let (min, max) = min_max(&self.array.view());
        self.array.mapv_inplace(|v| -v + max + min);
        self.generation += 1;
    }

    fn fliplr(&mut self) {
        self.array.invert_axis(Axis(1));
        self.array = self.array.as_standard_layout().to_owned();
        self.generation += 1;
    }

    fn crop(&mut self, pixels: usize) -> Result<(), ImageError> {
        let (rows, cols) = self.array.dim();
        if 2 * pixels >= rows || 2 * pixels >= cols {
            return Err(ImageError::CropTooLarge { pixels, rows, cols });
        }
        self.array = self
            .array
            .slice(s![pixels..rows - pixels, pixels..cols - pixels])
            .to_owned();
        self.generation += 1;
        Ok(())
    }

    fn ground(&mut self) {
        let (min, _) = min_max(&self.array.view());
        self.array.mapv_inplace(|v| v - min);
        self.generation += 1;
    }

    /// Leaves an all-zero image untouched.
    fn normalize(&mut self) {
        let (_, max) = min_max(&self.array.view());
        if max.abs() > f64::EPSILON {
            self.array.mapv_inplace(|v| v / max);
        }
        self.generation += 1;
    }
}

/// Minimum and maximum of an array, ignoring NaN.
pub fn min_max(array: &ArrayView2<f64>) -> (f64, f64) {
    array
        .iter()
        .filter(|v| !v.is_nan())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// Inverted copy of an array using the same `-v + max + min` mapping as
/// [`ImageAdapter::invert`].
pub fn inverted(array: &ArrayView2<f64>) -> Array2<f64> {
    let (min, max) = min_max(array);
    array.mapv(|v| -v + max + min)
}
