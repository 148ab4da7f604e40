//! One-dimensional intensity profiles: straight lines through an image and
//! (collapsed) circles around a point.
//!
//! Circular profiles are sampled at angles measured in image coordinates:
//! a sample at angle θ sits at `(cx + r·cosθ, cy + r·sinθ)` with y pointing
//! down. Counter-clockwise profiles walk the circle in decreasing θ so that
//! a sample at index fraction `f` lies at `start + 2π·(1 − f)`.
//!
//! # Peak finding
//! - [`Profile::find_peaks`] reports local maxima (plateaus resolve to their
//!   middle sample, end samples never count) above a relative threshold,
//!   greedily keeping the highest ones at least `min_distance` apart.
//! - [`Profile::find_fwxm_peaks`] reports the centers of contiguous runs
//!   above X% of the profile's range, located to sub-sample precision.

use std::f64::consts::TAU;

use ndarray::ArrayView2;
use thiserror::Error;

use crate::image_proc::convolve::reflect_index;

/// Errors from profile measurements.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    /// Too few samples for the requested measurement.
    #[error("profile has {0} samples; at least 3 required")]
    TooShort(usize),

    /// Profile is flat so no width can be measured.
    #[error("profile is flat; no edges at {0}% of maximum")]
    Flat(f64),
}

/// Search parameters for [`Profile::find_peaks`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakSearch {
    /// Minimum peak height as a fraction of the search region's range above its minimum
    pub threshold: f64,
    /// Minimum separation; below 1 a fraction of the profile length, otherwise samples
    pub min_distance: f64,
    /// Keep at most this many peaks
    pub max_number: Option<usize>,
    /// Fractional (start, end) of the profile searched
    pub search_region: (f64, f64),
}

impl Default for PeakSearch {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            min_distance: 0.05,
            max_number: None,
            search_region: (0.0, 1.0),
        }
    }
}

/// A detected peak.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    /// Sample index in the full profile
    pub index: usize,
    /// Profile value at the peak
    pub value: f64,
}

/// Left/right crossings of a full-width-at-X%-max measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FwxmEdges {
    pub left: f64,
    pub right: f64,
}

impl FwxmEdges {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn center(&self) -> f64 {
        (self.left + self.right) / 2.0
    }
}

/// Parameters of a circular profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleProfileParams {
    /// Center (x, y) in pixels
    pub center: (f64, f64),
    /// Nominal radius in pixels
    pub radius: f64,
    /// Angle of the first sample in radians
    pub start_angle: f64,
    /// Walk the circle counter-clockwise
    pub ccw: bool,
    /// Samples per pixel of circumference
    pub sampling_ratio: f64,
    /// Relative half-width of the sampled annulus; 0 samples a single circle
    pub width_ratio: f64,
    /// Number of concentric circles averaged across the annulus
    pub num_profiles: usize,
}

impl CircleProfileParams {
    /// A single-circle profile starting at angle 0, walked clockwise.
    pub fn new(center: (f64, f64), radius: f64) -> Self {
        Self {
            center,
            radius,
            start_angle: 0.0,
            ccw: false,
            sampling_ratio: 1.0,
            width_ratio: 0.0,
            num_profiles: 1,
        }
    }

    /// Average `num_profiles` circles spanning `radius·(1 ± width_ratio)`.
    pub fn collapsed(mut self, width_ratio: f64, num_profiles: usize) -> Self {
        self.width_ratio = width_ratio;
        self.num_profiles = num_profiles.max(1);
        self
    }

    pub fn start_angle(mut self, radians: f64) -> Self {
        self.start_angle = radians;
        self
    }

    pub fn ccw(mut self, ccw: bool) -> Self {
        self.ccw = ccw;
        self
    }

    /// Sample angles in walking order.
    pub fn angles(&self) -> Vec<f64> {
        let size = ((TAU * self.radius * self.sampling_ratio).round() as usize).max(8);
        (0..size)
            .map(|k| {
                let fraction = k as f64 / size as f64;
                if self.ccw {
                    self.start_angle + TAU * (1.0 - fraction)
                } else {
                    self.start_angle + TAU * fraction
                }
            })
            .collect()
    }

    fn radii(&self) -> Vec<f64> {
        if self.num_profiles <= 1 || self.width_ratio <= 0.0 {
            return vec![self.radius];
        }
        let start = self.radius * (1.0 - self.width_ratio);
        let stop = self.radius * (1.0 + self.width_ratio);
        let step = (stop - start) / (self.num_profiles - 1) as f64;
        (0..self.num_profiles)
            .map(|i| start + step * i as f64)
            .collect()
    }
}

/// Bilinear sample at (x, y), clamping coordinates to the image.
pub fn sample_bilinear(image: &ArrayView2<f64>, x: f64, y: f64) -> f64 {
    let (rows, cols) = image.dim();
    let x = x.clamp(0.0, (cols - 1) as f64);
    let y = y.clamp(0.0, (rows - 1) as f64);
    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(cols - 1);
    let y1 = (y0 + 1).min(rows - 1);
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let top = image[[y0, x0]] * (1.0 - fx) + image[[y0, x1]] * fx;
    let bottom = image[[y1, x0]] * (1.0 - fx) + image[[y1, x1]] * fx;
    top * (1.0 - fy) + bottom * fy
}

/// A sequence of intensity samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    values: Vec<f64>,
}

impl Profile {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Row `row` of an image, optionally averaged over `half_width` rows either side.
    pub fn horizontal(image: &ArrayView2<f64>, row: usize, half_width: usize) -> Self {
        let (rows, cols) = image.dim();
        let lo = row.saturating_sub(half_width);
        let hi = (row + half_width + 1).min(rows);
        let n = (hi - lo).max(1) as f64;
        Self::new(
            (0..cols)
                .map(|c| (lo..hi).map(|r| image[[r, c]]).sum::<f64>() / n)
                .collect(),
        )
    }

    /// Column `col` of an image, optionally averaged over `half_width` columns either side.
    pub fn vertical(image: &ArrayView2<f64>, col: usize, half_width: usize) -> Self {
        let (rows, cols) = image.dim();
        let lo = col.saturating_sub(half_width);
        let hi = (col + half_width + 1).min(cols);
        let n = (hi - lo).max(1) as f64;
        Self::new(
            (0..rows)
                .map(|r| (lo..hi).map(|c| image[[r, c]]).sum::<f64>() / n)
                .collect(),
        )
    }

    /// Sample a (collapsed) circle.
    pub fn circle(image: &ArrayView2<f64>, params: &CircleProfileParams) -> Self {
        let angles = params.angles();
        let radii = params.radii();
        let (cx, cy) = params.center;
        let values = angles
            .iter()
            .map(|theta| {
                let (sin, cos) = theta.sin_cos();
                radii
                    .iter()
                    .map(|r| sample_bilinear(image, cx + r * cos, cy + r * sin))
                    .sum::<f64>()
                    / radii.len() as f64
            })
            .collect();
        Self::new(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn min_max(&self) -> (f64, f64) {
        self.values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Subtract the minimum.
    pub fn ground(&mut self) -> &mut Self {
        let (min, _) = self.min_max();
        self.values.iter_mut().for_each(|v| *v -= min);
        self
    }

    /// Divide by the maximum; a zero profile is left unchanged.
    pub fn normalize(&mut self) -> &mut Self {
        let (_, max) = self.min_max();
        if max.abs() > f64::EPSILON {
            self.values.iter_mut().for_each(|v| *v /= max);
        }
        self
    }

    /// Replace every value `v` with `-v + max + min`.
    pub fn invert(&mut self) -> &mut Self {
        let (min, max) = self.min_max();
        self.values.iter_mut().for_each(|v| *v = -*v + max + min);
        self
    }

    /// Median filter with reflected ends.
    ///
    /// # Arguments
    /// * `size` - Window length; below 1 a fraction of the profile length
    pub fn median_filter(&mut self, size: f64) -> &mut Self {
        let n = self.values.len();
        if n == 0 {
            return self;
        }
        let window = if size < 1.0 {
            (size * n as f64).round() as usize
        } else {
            size.round() as usize
        };
        let half = (window.max(1) / 2) as isize;
        if half == 0 {
            return self;
        }
        let source = self.values.clone();
        let mut scratch = Vec::with_capacity((2 * half + 1) as usize);
        for (i, value) in self.values.iter_mut().enumerate() {
            scratch.clear();
            scratch.extend(
                (-half..=half).map(|k| source[reflect_index(i as isize + k, n)]),
            );
            scratch.sort_by(|a, b| a.total_cmp(b));
            *value = scratch[scratch.len() / 2];
        }
        self
    }

    /// Rotate so that sample `amount` becomes the first sample.
    pub fn roll(&mut self, amount: usize) -> &mut Self {
        if !self.values.is_empty() {
            let n = self.values.len();
            self.values.rotate_left(amount % n);
        }
        self
    }

    pub fn argmin(&self) -> Option<usize> {
        self.values
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
    }

    pub fn argmax(&self) -> Option<usize> {
        self.values
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
    }

    /// Local maxima within the search region, highest first.
    pub fn find_peaks(&self, search: &PeakSearch) -> Vec<Peak> {
        let n = self.values.len();
        if n < 3 {
            return Vec::new();
        }
        let start = ((search.search_region.0 * n as f64).floor() as usize).min(n);
        let end = ((search.search_region.1 * n as f64).ceil() as usize).min(n);
        if end <= start + 2 {
            return Vec::new();
        }
        let region = &self.values[start..end];
        let (min, max) = region
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let threshold = if search.threshold <= 1.0 {
            min + (max - min) * search.threshold
        } else {
            search.threshold
        };
        let min_distance = if search.min_distance < 1.0 {
            search.min_distance * n as f64
        } else {
            search.min_distance
        };

        let mut candidates = Vec::new();
        let mut i = 1;
        while i + 1 < region.len() {
            if region[i] > region[i - 1] {
                // Walk across a plateau
                let mut j = i;
                while j + 1 < region.len() && region[j + 1] == region[i] {
                    j += 1;
                }
                if j + 1 < region.len() && region[j + 1] < region[i] && region[i] >= threshold {
                    candidates.push(Peak {
                        index: start + (i + j) / 2,
                        value: region[i],
                    });
                }
                i = j + 1;
            } else {
                i += 1;
            }
        }

        candidates.sort_by(|a, b| b.value.total_cmp(&a.value));
        let mut peaks: Vec<Peak> = Vec::new();
        for candidate in candidates {
            if peaks
                .iter()
                .all(|p| (p.index as f64 - candidate.index as f64).abs() >= min_distance)
            {
                peaks.push(candidate);
                if search.max_number.is_some_and(|limit| peaks.len() >= limit) {
                    break;
                }
            }
        }
        peaks
    }

    /// Centers of the runs above `x_percent`% of the range, highest run first.
    pub fn find_fwxm_peaks(&self, x_percent: f64, max_number: Option<usize>) -> Vec<f64> {
        let v = &self.values;
        let n = v.len();
        if n == 0 {
            return Vec::new();
        }
        let (min, max) = self.min_max();
        if max - min <= f64::EPSILON {
            return Vec::new();
        }
        let level = min + (max - min) * x_percent / 100.0;

        let mut runs: Vec<(f64, f64)> = Vec::new();
        let mut i = 0;
        while i < n {
            if v[i] < level {
                i += 1;
                continue;
            }
            let first = i;
            let mut height = v[i];
            while i + 1 < n && v[i + 1] >= level {
                i += 1;
                height = height.max(v[i]);
            }
            let last = i;
            let left = if first == 0 {
                0.0
            } else {
                crossing(first - 1, first, v[first - 1], v[first], level)
            };
            let right = if last + 1 == n {
                (n - 1) as f64
            } else {
                crossing(last, last + 1, v[last], v[last + 1], level)
            };
            runs.push(((left + right) / 2.0, height));
            i += 1;
        }

        runs.sort_by(|a, b| b.1.total_cmp(&a.1));
        let keep = max_number.unwrap_or(runs.len());
        runs.into_iter().take(keep).map(|(center, _)| center).collect()
    }

    /// Outermost crossings of `x_percent`% between the minimum and maximum.
    pub fn fwxm_edges(&self, x_percent: f64) -> Result<FwxmEdges, ProfileError> {
        let v = &self.values;
        let n = v.len();
        if n < 3 {
            return Err(ProfileError::TooShort(n));
        }
        let (min, max) = self.min_max();
        if max - min <= f64::EPSILON {
            return Err(ProfileError::Flat(x_percent));
        }
        let level = min + (max - min) * x_percent / 100.0;

        let first = v.iter().position(|&x| x >= level).ok_or(ProfileError::Flat(x_percent))?;
        let last = v.iter().rposition(|&x| x >= level).ok_or(ProfileError::Flat(x_percent))?;
        let left = if first == 0 {
            0.0
        } else {
            crossing(first - 1, first, v[first - 1], v[first], level)
        };
        let right = if last + 1 == n {
            (n - 1) as f64
        } else {
            crossing(last, last + 1, v[last], v[last + 1], level)
        };
        Ok(FwxmEdges { left, right })
    }
}

fn crossing(i0: usize, i1: usize, v0: f64, v1: f64, level: f64) -> f64 {
    if (v1 - v0).abs() < f64::EPSILON {
        return i0 as f64;
    }
    i0 as f64 + (level - v0) / (v1 - v0) * (i1 as f64 - i0 as f64)
}
