//! Circular apertures over an image.
//!
//! A pixel belongs to a disk when its center lies within the radius:
//! `(row - y)² + (col - x)² <= r²`. The mask only spans the disk's bounding
//! window clipped to the image, which keeps many small disks on a large
//! radiograph cheap.

use ndarray::{s, Array2, ArrayView2};

/// Boolean disk mask positioned inside a larger image.
#[derive(Debug, Clone, PartialEq)]
pub struct DiskMask {
    /// Row of the window's top-left pixel in the image
    pub row_offset: usize,
    /// Column of the window's top-left pixel in the image
    pub col_offset: usize,
    /// True for pixels inside the disk
    pub mask: Array2<bool>,
}

impl DiskMask {
    /// Build the mask of a disk centered at (x, y) for an image of `shape` (rows, cols).
    pub fn new(shape: (usize, usize), x_center: f64, y_center: f64, radius: f64) -> Self {
        let (height, width) = shape;
        let radius = radius.max(0.0);

        let clamp = |v: f64, upper: usize| v.max(0.0).min(upper as f64) as usize;
        let x_min = clamp((x_center - radius).floor(), width);
        let x_max = clamp((x_center + radius).ceil() + 1.0, width);
        let y_min = clamp((y_center - radius).floor(), height);
        let y_max = clamp((y_center + radius).ceil() + 1.0, height);

        let r2 = radius * radius;
        let mask = Array2::from_shape_fn((y_max - y_min, x_max - x_min), |(i, j)| {
            let dy = (y_min + i) as f64 - y_center;
            let dx = (x_min + j) as f64 - x_center;
            dx * dx + dy * dy <= r2
        });

        Self {
            row_offset: y_min,
            col_offset: x_min,
            mask,
        }
    }

    /// Number of pixels inside the disk.
    pub fn pixel_count(&self) -> usize {
        self.mask.iter().filter(|&&inside| inside).count()
    }

    /// Values of the image pixels inside the disk.
    pub fn collect(&self, image: &ArrayView2<f64>) -> Vec<f64> {
        let (rows, cols) = self.mask.dim();
        let (height, width) = image.dim();
        if self.row_offset + rows > height || self.col_offset + cols > width {
            return Vec::new();
        }
        let window = image.slice(s![
            self.row_offset..self.row_offset + rows,
            self.col_offset..self.col_offset + cols
        ]);
        window
            .iter()
            .zip(self.mask.iter())
            .filter_map(|(&value, &inside)| inside.then_some(value))
            .collect()
    }
}

/// Collect pixels from a circular aperture.
///
/// # Arguments
///
/// * `image` - The image array as f64 pixel values
/// * `x_center` - X coordinate of the aperture center (can be subpixel)
/// * `y_center` - Y coordinate of the aperture center (can be subpixel)
/// * `radius` - Radius in pixels
pub fn collect_disk_pixels(
    image: &ArrayView2<f64>,
    x_center: f64,
    y_center: f64,
    radius: f64,
) -> Vec<f64> {
    DiskMask::new(image.dim(), x_center, y_center, radius).collect(image)
}
