//! Smoothing and gradient convolutions for ndarray images.
//!
//! Gaussian smoothing is applied separably (rows then columns) with edge
//! replication, which avoids the artificial step a zero-padded border would
//! put into a subsequent gradient.

use ndarray::{Array1, Array2, ArrayView2};

/// Edge handling modes for convolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeMode {
    /// Uses a constant value for pixels outside image bounds
    Constant(f64),

    /// Reflects the image at the edges (d c b a | a b c d)
    Reflect,

    /// Extends the edge pixels outward
    Extend,
}

/// Correlate a 2D array with a small kernel.
///
/// The kernel is not flipped. Output has the same shape as `input`.
pub fn convolve2d(input: &ArrayView2<f64>, kernel: &ArrayView2<f64>, edge_mode: EdgeMode) -> Array2<f64> {
    let (rows, cols) = input.dim();
    let (k_rows, k_cols) = kernel.dim();
    let kr = (k_rows / 2) as isize;
    let kc = (k_cols / 2) as isize;

    Array2::from_shape_fn((rows, cols), |(i, j)| {
        let mut sum = 0.0;
        for ki in 0..k_rows {
            for kj in 0..k_cols {
                let ii = i as isize + ki as isize - kr;
                let jj = j as isize + kj as isize - kc;
                sum += pixel(input, ii, jj, edge_mode) * kernel[[ki, kj]];
            }
        }
        sum
    })
}

fn pixel(input: &ArrayView2<f64>, i: isize, j: isize, edge_mode: EdgeMode) -> f64 {
    let (rows, cols) = input.dim();
    if i >= 0 && j >= 0 && (i as usize) < rows && (j as usize) < cols {
        return input[[i as usize, j as usize]];
    }
    match edge_mode {
        EdgeMode::Constant(value) => value,
        EdgeMode::Reflect => input[[reflect_index(i, rows), reflect_index(j, cols)]],
        EdgeMode::Extend => input[[clamp_index(i, rows), clamp_index(j, cols)]],
    }
}

/// Symmetric reflection about the array edge, valid for any offset.
pub fn reflect_index(idx: isize, size: usize) -> usize {
    let n = size as isize;
    if n == 1 {
        return 0;
    }
    let period = 2 * n;
    let mut i = idx.rem_euclid(period);
    if i >= n {
        i = period - 1 - i;
    }
    i as usize
}

fn clamp_index(idx: isize, size: usize) -> usize {
    idx.clamp(0, size as isize - 1) as usize
}

/// Normalized 1D Gaussian kernel truncated at four standard deviations.
pub fn gaussian_kernel_1d(sigma: f64) -> Array1<f64> {
    let radius = (4.0 * sigma).ceil().max(1.0) as isize;
    let mut kernel = Array1::from_shape_fn((2 * radius + 1) as usize, |i| {
        let x = (i as isize - radius) as f64;
        (-(x * x) / (2.0 * sigma * sigma)).exp()
    });
    let sum = kernel.sum();
    kernel.mapv_inplace(|v| v / sum);
    kernel
}

/// Separable Gaussian smoothing with replicated edges.
///
/// A non-positive `sigma` returns an unmodified copy.
pub fn gaussian_filter(input: &ArrayView2<f64>, sigma: f64) -> Array2<f64> {
    if sigma <= 0.0 {
        return input.to_owned();
    }
    let kernel = gaussian_kernel_1d(sigma);
    let radius = (kernel.len() / 2) as isize;
    let (rows, cols) = input.dim();

    let horizontal = Array2::from_shape_fn((rows, cols), |(i, j)| {
        kernel
            .iter()
            .enumerate()
            .map(|(k, w)| w * input[[i, clamp_index(j as isize + k as isize - radius, cols)]])
            .sum::<f64>()
    });

    Array2::from_shape_fn((rows, cols), |(i, j)| {
        kernel
            .iter()
            .enumerate()
            .map(|(k, w)| w * horizontal[[clamp_index(i as isize + k as isize - radius, rows), j]])
            .sum()
    })
}

/// Horizontal and vertical Sobel derivatives `(d/dx, d/dy)`.
///
/// `d/dx` increases toward larger column index, `d/dy` toward larger row index.
pub fn sobel(input: &ArrayView2<f64>) -> (Array2<f64>, Array2<f64>) {
    let kx = ndarray::arr2(&[[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]]);
    let ky = ndarray::arr2(&[[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]]);
    (
        convolve2d(input, &kx.view(), EdgeMode::Extend),
        convolve2d(input, &ky.view(), EdgeMode::Extend),
    )
}
