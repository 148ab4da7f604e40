//! Polarity and left/right orientation correction.
//!
//! Both corrections mutate the image in place and run before any geometry is
//! resolved: inversion first, then the caller's forced invert, then the
//! direction check.

use imaging::algo::stats;
use imaging::image_proc::detection::BoundingBox;
use imaging::image_proc::profile::{CircleProfileParams, PeakSearch, Profile};
use imaging::image_proc::ImageAdapter;
use nalgebra::Point2;
use ndarray::{s, ArrayView2};

use crate::error::PlanarError;
use crate::geometry::FiducialProbe;

/// Fraction of the phantom sub-image trimmed from each edge before the
/// percentile check.
pub const PERCENTILE_CROP_FRACTION: f64 = 0.1;

/// How a family detects flipped polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InversionCheck {
    None,
    /// Image corners brighter than the image mean
    Corners,
    /// Heavy dark tail in the intensity distribution inside the outline
    PhantomPercentiles,
}

/// Whether the phantom sub-image has its polarity flipped.
///
/// Inside the outline most pixels are phantom body with a few bright
/// details. When the 0.5th percentile lies further from the median than the
/// 99.5th does, the details are dark and the image needs inverting.
pub fn percentile_inversion_needed(
    array: &ArrayView2<f64>,
    bbox: &BoundingBox,
) -> Result<bool, PlanarError> {
    let sub = array.slice(s![bbox.min_row..=bbox.max_row, bbox.min_col..=bbox.max_col]);
    let (rows, cols) = sub.dim();
    let crop = (rows as f64 * PERCENTILE_CROP_FRACTION) as usize;
    let sub = if 2 * crop < rows && 2 * crop < cols {
        sub.slice_move(s![crop..rows - crop, crop..cols - crop])
    } else {
        sub
    };
    let pixels: Vec<f64> = sub.iter().copied().collect();
    let p = stats::percentiles(&pixels, &[0.5, 50.0, 99.5]).map_err(|source| {
        PlanarError::EmptyRoi {
            name: "phantom outline".to_string(),
            source,
        }
    })?;
    let to_low = (p[1] - p[0]).abs();
    let to_high = (p[1] - p[2]).abs();
    log::debug!("percentile check: median-low {to_low:.4}, median-high {to_high:.4}");
    Ok(to_low > to_high)
}

/// Valley ordering around a ring of graded contrast details.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValleyOrder {
    /// Profile radius as a multiple of the phantom radius
    pub radius_ratio: f64,
    pub width_ratio: f64,
    pub num_profiles: usize,
    /// Median filter window as a fraction of the profile length
    pub filter_size: f64,
}

impl ValleyOrder {
    /// Innermost ring of the Las Vegas contrast-detail pattern.
    pub const LAS_VEGAS: Self = Self {
        radius_ratio: 0.175,
        width_ratio: 0.16,
        num_profiles: 5,
        filter_size: 0.015,
    };

    /// Whether the image is mirrored.
    ///
    /// The ring is walked clockwise from its darkest sample. Of the two
    /// deepest remaining valleys the deeper one must come first.
    pub fn needs_flip(&self, array: &ArrayView2<f64>, center: Point2<f64>, radius: f64) -> bool {
        let params = CircleProfileParams::new((center.x, center.y), radius * self.radius_ratio)
            .collapsed(self.width_ratio, self.num_profiles);
        let mut profile = Profile::circle(array, &params);
        let Some(darkest) = profile.argmin() else {
            return false;
        };
        profile.roll(darkest).median_filter(self.filter_size).invert();
        let valleys = profile.find_peaks(&PeakSearch {
            max_number: Some(2),
            ..Default::default()
        });
        match valleys.as_slice() {
            [deepest, next, ..] => deepest.index > next.index,
            _ => {
                log::debug!("direction check found {} valleys; leaving orientation", valleys.len());
                false
            }
        }
    }
}

/// Ordering of the contrast details following an angular fiducial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiducialSweep {
    pub probe: FiducialProbe,
    /// Fractional profile range searched after the fiducial
    pub leading: (f64, f64),
    /// Fractional profile range searched before the fiducial
    pub trailing: (f64, f64),
    pub min_distance: f64,
    pub max_peaks: usize,
}

impl FiducialSweep {
    pub const LEEDS: Self = Self {
        probe: FiducialProbe::LEEDS,
        leading: (0.05, 0.45),
        trailing: (0.55, 0.95),
        min_distance: 0.025,
        max_peaks: 9,
    };

    /// Whether the strongest details follow the fiducial in the
    /// expected (counter-clockwise) direction.
    pub fn is_ccw(
        &self,
        array: &ArrayView2<f64>,
        center: Point2<f64>,
        radius: f64,
    ) -> Result<bool, PlanarError> {
        let mut profile = self.probe.profile(array, center, radius, 0.0, false);
        let fiducial = self.probe.peak_index(&profile, radius)?;
        profile.roll(fiducial.round() as usize);

        let strongest = |region: (f64, f64)| {
            profile
                .find_peaks(&PeakSearch {
                    threshold: 0.0,
                    min_distance: self.min_distance,
                    max_number: Some(self.max_peaks),
                    search_region: region,
                })
                .iter()
                .map(|p| p.value)
                .fold(f64::NEG_INFINITY, f64::max)
        };
        let leading = strongest(self.leading);
        let trailing = strongest(self.trailing);
        if leading == f64::NEG_INFINITY && trailing == f64::NEG_INFINITY {
            log::debug!("no contrast details around the fiducial; leaving orientation");
            return Ok(true);
        }
        Ok(leading > trailing)
    }
}

/// How a family verifies left/right orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DirectionCheck {
    None,
    ValleyOrder(ValleyOrder),
    FiducialSweep(FiducialSweep),
}

impl DirectionCheck {
    /// Mirror the image when it is the wrong way round.
    ///
    /// # Returns
    /// `true` when the image was flipped
    pub fn apply<I: ImageAdapter>(
        &self,
        image: &mut I,
        center: Point2<f64>,
        radius: f64,
    ) -> Result<bool, PlanarError> {
        let flip = match self {
            DirectionCheck::None => false,
            DirectionCheck::ValleyOrder(check) => check.needs_flip(&image.array(), center, radius),
            DirectionCheck::FiducialSweep(check) => !check.is_ccw(&image.array(), center, radius)?,
        };
        if flip {
            log::info!("phantom is mirrored; flipping left-right");
            image.fliplr();
        }
        Ok(flip)
    }
}
