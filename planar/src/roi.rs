//! Sampling regions placed from a resolved phantom geometry.
//!
//! A descriptor's position is polar relative to the phantom: the disk center
//! is `center + radius·distance·(cos θ, sin θ)` with
//! `θ = phantom angle + descriptor angle`, and the disk radius is
//! `radius·radius_ratio`. Pixel masks and statistics are computed on first
//! access and cached for as long as the ROI lives; an ROI borrows the image
//! immutably, so the image cannot change underneath it.

use imaging::algo::stats::{self, StatsError};
use imaging::image_proc::aperture::DiskMask;
use nalgebra::{Point2, Vector2};
use ndarray::{s, ArrayView2};
use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::contrast::{self, ContrastMethod};
use crate::error::PlanarError;
use crate::geometry::PhantomGeometry;

/// Placement of one sampling disk relative to the phantom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoiDescriptor {
    pub name: &'static str,
    /// Degrees added to the phantom angle
    pub angle: f64,
    /// Distance from the phantom center as a multiple of the phantom radius
    pub distance: f64,
    /// Disk radius as a multiple of the phantom radius
    pub radius: f64,
    /// Spatial frequency of a high-contrast pattern, line pairs per mm
    pub lp_mm: Option<f64>,
}

impl RoiDescriptor {
    pub const fn disk(name: &'static str, angle: f64, distance: f64, radius: f64) -> Self {
        Self {
            name,
            angle,
            distance,
            radius,
            lp_mm: None,
        }
    }

    pub const fn resolution(
        name: &'static str,
        angle: f64,
        distance: f64,
        radius: f64,
        lp_mm: f64,
    ) -> Self {
        Self {
            name,
            angle,
            distance,
            radius,
            lp_mm: Some(lp_mm),
        }
    }

    /// Center and radius of this descriptor at a resolved geometry.
    pub fn place(&self, geometry: &PhantomGeometry) -> (Point2<f64>, f64) {
        let theta = (geometry.angle + self.angle).to_radians();
        let shift = Vector2::new(theta.cos(), theta.sin()) * geometry.radius * self.distance;
        (geometry.center + shift, geometry.radius * self.radius)
    }
}

/// Statistics of the pixels inside a sampling region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiStats {
    pub median: f64,
    /// Population standard deviation
    pub std: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub pixel_count: usize,
}

impl RoiStats {
    pub fn from_pixels(pixels: &[f64]) -> Result<Self, StatsError> {
        let median = stats::median(pixels)?;
        let std = stats::std_dev(pixels)?;
        let mean = stats::mean(pixels)?;
        let (min, max) = pixels
            .iter()
            .filter(|v| !v.is_nan())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        Ok(Self {
            median,
            std,
            mean,
            min,
            max,
            pixel_count: pixels.len(),
        })
    }
}

/// A circular sampling region over a borrowed image.
#[derive(Debug)]
pub struct DiskRoi<'a> {
    name: &'static str,
    center: Point2<f64>,
    radius: f64,
    array: ArrayView2<'a, f64>,
    mask: OnceCell<DiskMask>,
    stats: OnceCell<RoiStats>,
}

impl<'a> DiskRoi<'a> {
    pub fn new(
        array: ArrayView2<'a, f64>,
        name: &'static str,
        center: Point2<f64>,
        radius: f64,
    ) -> Self {
        Self {
            name,
            center,
            radius,
            array,
            mask: OnceCell::new(),
            stats: OnceCell::new(),
        }
    }

    /// Place a descriptor at a resolved geometry.
    pub fn from_descriptor(
        array: ArrayView2<'a, f64>,
        descriptor: &RoiDescriptor,
        geometry: &PhantomGeometry,
    ) -> Self {
        let (center, radius) = descriptor.place(geometry);
        Self::new(array, descriptor.name, center, radius)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn center(&self) -> Point2<f64> {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Pixel mask of the disk, built on first use.
    pub fn mask(&self) -> &DiskMask {
        self.mask
            .get_or_init(|| DiskMask::new(self.array.dim(), self.center.x, self.center.y, self.radius))
    }

    /// Statistics over the masked pixels, computed on first use.
    pub fn stats(&self) -> Result<&RoiStats, PlanarError> {
        self.stats.get_or_try_init(|| {
            let pixels = self.mask().collect(&self.array);
            RoiStats::from_pixels(&pixels).map_err(|source| PlanarError::EmptyRoi {
                name: self.name.to_string(),
                source,
            })
        })
    }

    /// Median of the masked pixels.
    pub fn pixel_value(&self) -> Result<f64, PlanarError> {
        Ok(self.stats()?.median)
    }
}

/// Evaluated low-contrast (or background) region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowContrastMeasurement {
    pub name: String,
    pub center: (f64, f64),
    pub radius: f64,
    pub stats: RoiStats,
    /// Background value the contrast was computed against
    pub reference: f64,
    pub contrast: f64,
    pub cnr: f64,
    pub snr: f64,
    pub visibility: f64,
    /// Contrast above the contrast threshold
    pub passed_contrast: bool,
    /// Visibility above the visibility threshold
    pub passed_visibility: bool,
}

/// Pass thresholds applied to low-contrast regions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowContrastCriteria {
    pub method: ContrastMethod,
    pub contrast_threshold: f64,
    pub visibility_threshold: f64,
}

/// A disk evaluated against a contrast reference.
#[derive(Debug)]
pub struct LowContrastRoi<'a> {
    disk: DiskRoi<'a>,
    reference: f64,
    criteria: LowContrastCriteria,
}

impl<'a> LowContrastRoi<'a> {
    pub fn new(disk: DiskRoi<'a>, reference: f64, criteria: LowContrastCriteria) -> Self {
        Self {
            disk,
            reference,
            criteria,
        }
    }

    pub fn contrast(&self) -> Result<f64, PlanarError> {
        Ok(self
            .criteria
            .method
            .contrast(self.disk.pixel_value()?, self.reference))
    }

    pub fn cnr(&self) -> Result<f64, PlanarError> {
        Ok(contrast::cnr(self.contrast()?, self.disk.stats()?.std))
    }

    pub fn snr(&self) -> Result<f64, PlanarError> {
        let stats = self.disk.stats()?;
        Ok(contrast::snr(stats.median, stats.std))
    }

    pub fn visibility(&self) -> Result<f64, PlanarError> {
        Ok(contrast::visibility(
            self.contrast()?,
            self.disk.radius(),
            self.disk.stats()?.std,
        ))
    }

    pub fn passed_contrast(&self) -> Result<bool, PlanarError> {
        Ok(self.contrast()? > self.criteria.contrast_threshold)
    }

    pub fn passed_visibility(&self) -> Result<bool, PlanarError> {
        Ok(self.visibility()? > self.criteria.visibility_threshold)
    }

    /// Snapshot every metric.
    pub fn measure(&self) -> Result<LowContrastMeasurement, PlanarError> {
        let center = self.disk.center();
        Ok(LowContrastMeasurement {
            name: self.disk.name().to_string(),
            center: (center.x, center.y),
            radius: self.disk.radius(),
            stats: *self.disk.stats()?,
            reference: self.reference,
            contrast: self.contrast()?,
            cnr: self.cnr()?,
            snr: self.snr()?,
            visibility: self.visibility()?,
            passed_contrast: self.passed_contrast()?,
            passed_visibility: self.passed_visibility()?,
        })
    }
}

/// Extremes of a high-contrast (line-pair) region with its spatial frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighContrastSample {
    pub name: String,
    pub center: (f64, f64),
    pub radius: f64,
    pub lp_mm: f64,
    pub max: f64,
    pub min: f64,
    /// Threshold the external resolution component compares against
    pub contrast_threshold: f64,
}

/// Sample a high-contrast disk: only its extremes are reported.
pub fn sample_high_contrast(
    disk: &DiskRoi<'_>,
    lp_mm: f64,
    contrast_threshold: f64,
) -> Result<HighContrastSample, PlanarError> {
    let stats = disk.stats()?;
    let center = disk.center();
    Ok(HighContrastSample {
        name: disk.name().to_string(),
        center: (center.x, center.y),
        radius: disk.radius(),
        lp_mm,
        max: stats.max,
        min: stats.min,
        contrast_threshold,
    })
}

/// Axis-aligned rectangle with integer-snapped corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectangleRoi {
    /// Inclusive top-left corner (x, y)
    pub top_left: (usize, usize),
    /// Exclusive bottom-right corner (x, y)
    pub bottom_right: (usize, usize),
}

impl RectangleRoi {
    /// Snap a rectangle centered at `center` to pixel corners, clipped to `shape` (rows, cols).
    pub fn new(center: Point2<f64>, width: f64, height: f64, shape: (usize, usize)) -> Self {
        let (rows, cols) = shape;
        let snap = |v: f64, upper: usize| v.round().max(0.0).min(upper as f64) as usize;
        Self {
            top_left: (snap(center.x - width / 2.0, cols), snap(center.y - height / 2.0, rows)),
            bottom_right: (snap(center.x + width / 2.0, cols), snap(center.y + height / 2.0, rows)),
        }
    }

    /// Polar placement from a phantom geometry, like [`RoiDescriptor::place`].
    pub fn from_polar(
        geometry: &PhantomGeometry,
        angle: f64,
        distance: f64,
        width: f64,
        height: f64,
        shape: (usize, usize),
    ) -> Self {
        let theta = (geometry.angle + angle).to_radians();
        let center =
            geometry.center + Vector2::new(theta.cos(), theta.sin()) * geometry.radius * distance;
        Self::new(center, width, height, shape)
    }

    pub fn is_empty(&self) -> bool {
        self.bottom_right.0 <= self.top_left.0 || self.bottom_right.1 <= self.top_left.1
    }

    /// Center of the snapped rectangle in pixel coordinates.
    pub fn center(&self) -> Point2<f64> {
        Point2::new(
            (self.top_left.0 + self.bottom_right.0) as f64 / 2.0,
            (self.top_left.1 + self.bottom_right.1) as f64 / 2.0,
        )
    }

    /// Pixels inside the rectangle.
    pub fn view<'a>(&self, array: &ArrayView2<'a, f64>) -> ArrayView2<'a, f64> {
        array.clone().slice_move(s![
            self.top_left.1..self.bottom_right.1,
            self.top_left.0..self.bottom_right.0
        ])
    }

    /// Mean pixel value, `None` for an empty rectangle.
    pub fn pixel_value(&self, array: &ArrayView2<f64>) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        self.view(array).mean()
    }
}
