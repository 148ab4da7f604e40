//! Synthetic phantom radiographs for validating detection and sampling.
//!
//! Shapes are painted with hard edges onto an existing array: a pixel is
//! painted when its center falls inside the shape. Positions are (x, y) in
//! pixels, angles in degrees measured the way ROI placement measures them
//! (x right, y down, positive angles toward +y).

use ndarray::Array2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Paint an axis-aligned filled rectangle.
pub fn draw_rectangle<T: Copy>(
    image: &mut Array2<T>,
    center: (f64, f64),
    width: f64,
    height: f64,
    value: T,
) {
    draw_rotated_rectangle(image, center, width, height, 0.0, value);
}

/// Paint a filled rectangle whose `width` side lies along `angle_deg`.
pub fn draw_rotated_rectangle<T: Copy>(
    image: &mut Array2<T>,
    center: (f64, f64),
    width: f64,
    height: f64,
    angle_deg: f64,
    value: T,
) {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let (cx, cy) = center;
    for ((row, col), pixel) in image.indexed_iter_mut() {
        let dx = col as f64 - cx;
        let dy = row as f64 - cy;
        // Project onto the rectangle's own axes
        let along = dx * cos + dy * sin;
        let across = -dx * sin + dy * cos;
        if along.abs() <= width / 2.0 && across.abs() <= height / 2.0 {
            *pixel = value;
        }
    }
}

/// Paint a filled disk.
pub fn draw_disk<T: Copy>(image: &mut Array2<T>, center: (f64, f64), radius: f64, value: T) {
    let (cx, cy) = center;
    let r2 = radius * radius;
    for ((row, col), pixel) in image.indexed_iter_mut() {
        let dx = col as f64 - cx;
        let dy = row as f64 - cy;
        if dx * dx + dy * dy <= r2 {
            *pixel = value;
        }
    }
}

/// Paint an annulus with `inner_radius < r <= outer_radius`.
pub fn draw_ring<T: Copy>(
    image: &mut Array2<T>,
    center: (f64, f64),
    inner_radius: f64,
    outer_radius: f64,
    value: T,
) {
    let (cx, cy) = center;
    let (inner2, outer2) = (inner_radius * inner_radius, outer_radius * outer_radius);
    for ((row, col), pixel) in image.indexed_iter_mut() {
        let dx = col as f64 - cx;
        let dy = row as f64 - cy;
        let r2 = dx * dx + dy * dy;
        if r2 > inner2 && r2 <= outer2 {
            *pixel = value;
        }
    }
}

/// Paint a disk at polar position (`distance`, `angle_deg`) from `origin`.
pub fn draw_polar_disk<T: Copy>(
    image: &mut Array2<T>,
    origin: (f64, f64),
    distance: f64,
    angle_deg: f64,
    radius: f64,
    value: T,
) {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let center = (origin.0 + distance * cos, origin.1 + distance * sin);
    draw_disk(image, center, radius, value);
}

/// Paint a square block at polar position (`distance`, `angle_deg`) from `origin`.
pub fn draw_polar_block<T: Copy>(
    image: &mut Array2<T>,
    origin: (f64, f64),
    distance: f64,
    angle_deg: f64,
    side: f64,
    value: T,
) {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let center = (origin.0 + distance * cos, origin.1 + distance * sin);
    draw_rectangle(image, center, side, side, value);
}

/// Add seeded Gaussian noise in place.
///
/// A non-positive `sigma` leaves the image untouched.
pub fn add_gaussian_noise(image: &mut Array2<f64>, sigma: f64, seed: u64) {
    if sigma <= 0.0 {
        return;
    }
    let Ok(normal) = Normal::new(0.0, sigma) else {
        return;
    };
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    image.mapv_inplace(|v| v + normal.sample(&mut rng));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_pixel_count() {
        let mut image = Array2::from_elem((50, 50), 0u8);
        draw_rectangle(&mut image, (24.5, 24.5), 10.0, 6.0, 1);
        // Centers within ±5 and ±3 of a half-integer center: 10 x 6 pixels
        assert_eq!(image.iter().filter(|&&v| v == 1).count(), 60);
    }

    #[test]
    fn test_rotated_rectangle_along_diagonal() {
        let mut image = Array2::from_elem((60, 60), 0.0);
        draw_rotated_rectangle(&mut image, (30.0, 30.0), 40.0, 4.0, 45.0, 1.0);
        assert_eq!(image[[40, 40]], 1.0);
        assert_eq!(image[[20, 40]], 0.0);
    }

    #[test]
    fn test_polar_disk_position() {
        let mut image = Array2::from_elem((100, 100), 0.0);
        draw_polar_disk(&mut image, (50.0, 50.0), 30.0, 90.0, 3.0, 1.0);
        // 90° points down (+y)
        assert_eq!(image[[80, 50]], 1.0);
        assert_eq!(image[[20, 50]], 0.0);
    }

    #[test]
    fn test_ring_leaves_center_untouched() {
        let mut image = Array2::from_elem((41, 41), 0u8);
        draw_ring(&mut image, (20.0, 20.0), 10.0, 15.0, 1);
        assert_eq!(image[[20, 20]], 0);
        assert_eq!(image[[20, 30]], 0);
        assert_eq!(image[[20, 31]], 1);
        assert_eq!(image[[20, 35]], 1);
        assert_eq!(image[[20, 36]], 0);
        assert_eq!(image[[8, 20]], 1);
    }

    #[test]
    fn test_noise_is_seeded() {
        let mut a = Array2::from_elem((10, 10), 0.5);
        let mut b = a.clone();
        add_gaussian_noise(&mut a, 0.01, 7);
        add_gaussian_noise(&mut b, 0.01, 7);
        assert_eq!(a, b);
        assert!(a.iter().any(|&v| v != 0.5));
    }
}
