//! Intensity-weighted centroids over a pixel mask.

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

/// Intensity-weighted center of a masked object.
///
/// Position is relative to the origin of the input sub-image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CentroidResult {
    /// Centroid x-coordinate relative to sub-image origin
    pub x: f64,
    /// Centroid y-coordinate relative to sub-image origin
    pub y: f64,
}

/// Calculate the intensity-weighted centroid of the masked pixels.
///
/// # Arguments
///
/// * `image` - Sub-image containing the object
/// * `mask` - Binary mask (same size as image) with true where pixels belong to object
///
/// # Returns
///
/// `None` when the shapes differ or the masked flux is zero, otherwise the
/// centroid relative to the sub-image origin
pub fn compute_centroid_from_mask(
    image: &ArrayView2<f64>,
    mask: &ArrayView2<bool>,
) -> Option<CentroidResult> {
    if image.shape() != mask.shape() {
        return None;
    }

    let mut m00 = 0.0; // Total mass/intensity
    let mut m10 = 0.0; // First moment in x
    let mut m01 = 0.0; // First moment in y

    for ((row, col), &mask_val) in mask.indexed_iter() {
        if mask_val {
            let intensity = image[[row, col]];
            m00 += intensity;
            m10 += col as f64 * intensity;
            m01 += row as f64 * intensity;
        }
    }

    if m00 < f64::EPSILON {
        return None;
    }

    Some(CentroidResult {
        x: m10 / m00,
        y: m01 / m00,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    #[test]
    fn test_centroid_single_pixel() {
        let mut image = Array2::from_elem((3, 3), 0.0);
        let mut mask = Array2::from_elem((3, 3), false);
        image[[1, 1]] = 100.0;
        mask[[1, 1]] = true;

        let result = compute_centroid_from_mask(&image.view(), &mask.view()).unwrap();

        assert_relative_eq!(result.x, 1.0, epsilon = 1e-10);
        assert_relative_eq!(result.y, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_centroid_weighted_toward_bright_side() {
        let mut image = Array2::from_elem((5, 5), 0.0);
        let mut mask = Array2::from_elem((5, 5), false);
        image[[2, 1]] = 10.0;
        image[[2, 2]] = 10.0;
        image[[2, 3]] = 30.0;
        for col in 1..4 {
            mask[[2, col]] = true;
        }

        let result = compute_centroid_from_mask(&image.view(), &mask.view()).unwrap();
        // (1*10 + 2*10 + 3*30) / 50
        assert_relative_eq!(result.x, 2.4, epsilon = 1e-10);
        assert_relative_eq!(result.y, 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_unmasked_pixels_ignored() {
        let mut image = Array2::from_elem((5, 5), 1.0);
        image[[0, 0]] = 1000.0;
        let mut mask = Array2::from_elem((5, 5), false);
        mask[[3, 2]] = true;
        mask[[3, 4]] = true;

        let result = compute_centroid_from_mask(&image.view(), &mask.view()).unwrap();
        assert_eq!(result, CentroidResult { x: 3.0, y: 3.0 });
    }

    #[test]
    fn test_zero_flux_and_shape_mismatch() {
        let image = Array2::from_elem((4, 4), 0.0);
        let mask = Array2::from_elem((4, 4), true);
        assert!(compute_centroid_from_mask(&image.view(), &mask.view()).is_none());

        let other = Array2::from_elem((3, 4), true);
        assert!(compute_centroid_from_mask(&image.view(), &other.view()).is_none());
    }
}
