//! Properties of labeled regions: bounding box, area, centroid and the
//! second-moment ellipse (orientation, eccentricity).
//!
//! Orientation follows the convention of the common region-property tools:
//! the angle in radians between the row axis and the major axis of the
//! moment ellipse, in (-π/2, π/2\]. With image coordinates (x right, y down)
//! a major axis along +x+y has orientation π/4 and one along +x−y has −π/4.

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

/// Inclusive pixel bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_row: usize,
    pub min_col: usize,
    pub max_row: usize,
    pub max_col: usize,
}

impl BoundingBox {
    fn seed(row: usize, col: usize) -> Self {
        Self {
            min_row: row,
            min_col: col,
            max_row: row,
            max_col: col,
        }
    }

    fn expand_to_include(&mut self, row: usize, col: usize) {
        self.min_row = self.min_row.min(row);
        self.min_col = self.min_col.min(col);
        self.max_row = self.max_row.max(row);
        self.max_col = self.max_col.max(col);
    }

    pub fn height(&self) -> usize {
        self.max_row - self.min_row + 1
    }

    pub fn width(&self) -> usize {
        self.max_col - self.min_col + 1
    }

    /// Area of the box in pixels.
    pub fn area(&self) -> usize {
        self.height() * self.width()
    }

    /// Midpoint (x, y) of the half-open extent `[min, max + 1)` on each axis.
    pub fn center(&self) -> (f64, f64) {
        bbox_midpoint(
            (self.min_row as f64, self.min_col as f64),
            (self.max_row as f64 + 1.0, self.max_col as f64 + 1.0),
        )
    }
}

/// Midpoint (x, y) of two opposite (row, col) corners, in either order.
pub fn bbox_midpoint(corner_a: (f64, f64), corner_b: (f64, f64)) -> (f64, f64) {
    let y = (corner_a.0 - corner_b.0).abs() / 2.0 + corner_a.0.min(corner_b.0);
    let x = (corner_a.1 - corner_b.1).abs() / 2.0 + corner_a.1.min(corner_b.1);
    (x, y)
}

/// Geometric properties of one labeled region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionProps {
    /// Label value in the labeled image
    pub label: usize,
    /// Inclusive bounding box
    pub bbox: BoundingBox,
    /// Number of pixels in the region
    pub area: usize,
    /// Centroid (x, y) of the region pixels
    pub centroid: (f64, f64),
    /// Major-axis angle from the row axis in radians
    pub orientation: f64,
    /// Eccentricity of the moment ellipse in \[0, 1)
    pub eccentricity: f64,
}

impl RegionProps {
    /// Area of the bounding box in pixels.
    pub fn bbox_area(&self) -> usize {
        self.bbox.area()
    }
}

#[derive(Default, Clone)]
struct Accumulator {
    bbox: Option<BoundingBox>,
    n: f64,
    sum_r: f64,
    sum_c: f64,
    sum_rr: f64,
    sum_cc: f64,
    sum_rc: f64,
}

/// Measure every labeled region.
///
/// # Returns
/// One entry per label of a [`super::connected_components`] image, ordered by label
pub fn region_props(labels: &ArrayView2<usize>) -> Vec<RegionProps> {
    let max_label = labels.iter().copied().max().unwrap_or(0);
    let mut acc = vec![Accumulator::default(); max_label + 1];

    for ((row, col), &label) in labels.indexed_iter() {
        if label == 0 {
            continue;
        }
        let a = &mut acc[label];
        match a.bbox.as_mut() {
            Some(bbox) => bbox.expand_to_include(row, col),
            None => a.bbox = Some(BoundingBox::seed(row, col)),
        }
        let (r, c) = (row as f64, col as f64);
        a.n += 1.0;
        a.sum_r += r;
        a.sum_c += c;
        a.sum_rr += r * r;
        a.sum_cc += c * c;
        a.sum_rc += r * c;
    }

    acc.into_iter()
        .enumerate()
        .skip(1)
        .filter_map(|(label, a)| {
            let bbox = a.bbox?;
            let mean_r = a.sum_r / a.n;
            let mean_c = a.sum_c / a.n;
            let row_var = a.sum_rr / a.n - mean_r * mean_r;
            let col_var = a.sum_cc / a.n - mean_c * mean_c;
            let cov = a.sum_rc / a.n - mean_r * mean_c;

            let half_sum = (row_var + col_var) / 2.0;
            let root = (((row_var - col_var) / 2.0).powi(2) + cov * cov).sqrt();
            let lambda1 = half_sum + root;
            let lambda2 = (half_sum - root).max(0.0);
            let eccentricity = if lambda1 > f64::EPSILON {
                (1.0 - lambda2 / lambda1).max(0.0).sqrt()
            } else {
                0.0
            };

            Some(RegionProps {
                label,
                bbox,
                area: a.n as usize,
                centroid: (mean_c, mean_r),
                orientation: 0.5 * (2.0 * cov).atan2(row_var - col_var),
                eccentricity,
            })
        })
        .collect()
}
