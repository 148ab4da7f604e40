//! Thresholding and connected-component labeling.
//!
//! # Key Algorithms
//!
//! ## Otsu Thresholding
//! Automatic threshold selection using Otsu's method, which maximizes
//! between-class variance to separate a small bright fiducial from the
//! surrounding field.
//!
//! ## Connected Components
//! Two-pass connected component labeling with union-find optimization.
//! Groups connected pixels into distinct objects with unique labels, with
//! either 4- or 8-connectivity. Edge maps are labeled with 8-connectivity so
//! that diagonal steps of a thin contour stay one object.
//!
//! ## Hole Filling
//! Background pixels not reachable from the image border are foreground.

use std::collections::VecDeque;

use ndarray::{Array2, ArrayView2};

/// Pixel neighbourhood used when joining foreground pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    /// Horizontal and vertical neighbours only.
    Four,
    /// Horizontal, vertical and diagonal neighbours.
    Eight,
}

/// Compute optimal threshold using Otsu's method for automatic image segmentation.
///
/// # Algorithm
/// 1. Compute intensity histogram (256 bins, normalized to \[0,1\])
/// 2. For each possible threshold, calculate between-class variance
/// 3. Return threshold that maximizes this variance
///
/// # Arguments
/// * `image` - Input grayscale image with values in \[0,1\] range
///
/// # Returns
/// Upper edge of the last background bin, so that `pixel >= threshold`
/// selects the foreground class
pub fn otsu_threshold(image: &ArrayView2<f64>) -> f64 {
    let mut histogram = vec![0usize; 256];
    let total_pixels = image.len() as f64;

    for &pixel in image.iter() {
        let bin = (pixel.clamp(0.0, 1.0) * 255.0) as usize;
        histogram[bin] += 1;
    }

    let sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum();

    let mut sum_b = 0.0;
    let mut weight_b = 0.0;
    let mut max_variance = 0.0;
    let mut threshold = 0.0;

    for (i, &count) in histogram.iter().enumerate() {
        weight_b += count as f64;
        if weight_b.abs() < f64::EPSILON {
            continue;
        }

        let weight_f = total_pixels - weight_b;
        if weight_f.abs() < f64::EPSILON {
            break;
        }

        sum_b += (i as f64) * (count as f64);
        let mean_b = sum_b / weight_b;
        let mean_f = (sum - sum_b) / weight_f;

        let variance = weight_b * weight_f * (mean_b - mean_f).powi(2);

        if variance > max_variance {
            max_variance = variance;
            threshold = i as f64;
        }
    }

    ((threshold + 1.0) / 255.0).min(1.0)
}

/// Binary mask with true for pixels >= threshold.
pub fn apply_threshold(image: &ArrayView2<f64>, threshold: f64) -> Array2<bool> {
    image.mapv(|pixel| pixel >= threshold)
}

/// Find the root label in a disjoint-set (union-find) data structure
fn find_root(labels: &mut [usize], label: usize) -> usize {
    let mut current = label;

    while current != labels[current] {
        // Path compression - make the parent point to the grandparent
        labels[current] = labels[labels[current]];
        current = labels[current];
    }

    current
}

/// Union two labels in a disjoint-set data structure
fn union_labels(labels: &mut [usize], label1: usize, label2: usize) -> usize {
    let root1 = find_root(labels, label1);
    let root2 = find_root(labels, label2);

    if root1 < root2 {
        labels[root2] = root1;
        root1
    } else {
        labels[root1] = root2;
        root2
    }
}

/// Connected component labeling using optimized two-pass algorithm with union-find.
///
/// # Algorithm
/// 1. **First pass**: Scan image, assign preliminary labels, track equivalences
/// 2. **Union-find**: Resolve label equivalences with path compression
/// 3. **Second pass**: Relabel image with final consecutive labels
///
/// # Arguments
/// * `binary_image` - Image where non-zero values represent foreground
/// * `connectivity` - Neighbourhood joining foreground pixels
///
/// # Returns
/// Labeled image where background pixels are 0 and each object has a unique
/// consecutive label starting from 1, numbered in raster order of first
/// appearance.
pub fn connected_components(
    binary_image: &ArrayView2<f64>,
    connectivity: Connectivity,
) -> Array2<usize> {
    let (height, width) = binary_image.dim();
    let mut labels = Array2::zeros((height, width));
    let mut label_count = 0;
    let mut parent_table = vec![0];
    let mut neighbor_labels = Vec::with_capacity(4);

    for i in 0..height {
        for j in 0..width {
            if binary_image[[i, j]] <= 0.0 {
                continue;
            }
            neighbor_labels.clear();

            if i > 0 && labels[[i - 1, j]] > 0 {
                neighbor_labels.push(labels[[i - 1, j]]);
            }
            if j > 0 && labels[[i, j - 1]] > 0 {
                neighbor_labels.push(labels[[i, j - 1]]);
            }
            if connectivity == Connectivity::Eight && i > 0 {
                if j > 0 && labels[[i - 1, j - 1]] > 0 {
                    neighbor_labels.push(labels[[i - 1, j - 1]]);
                }
                if j + 1 < width && labels[[i - 1, j + 1]] > 0 {
                    neighbor_labels.push(labels[[i - 1, j + 1]]);
                }
            }

            match neighbor_labels.iter().copied().min() {
                None => {
                    label_count += 1;
                    labels[[i, j]] = label_count;
                    parent_table.push(label_count);
                }
                Some(min_label) => {
                    labels[[i, j]] = min_label;
                    for &neighbor_label in &neighbor_labels {
                        if neighbor_label != min_label {
                            union_labels(&mut parent_table, min_label, neighbor_label);
                        }
                    }
                }
            }
        }
    }

    for i in 1..parent_table.len() {
        find_root(&mut parent_table, i);
    }

    let mut relabel_map = vec![0; parent_table.len()];
    let mut next_label = 1;
    for i in 1..parent_table.len() {
        let root = find_root(&mut parent_table, i);
        if relabel_map[root] == 0 {
            relabel_map[root] = next_label;
            next_label += 1;
        }
        relabel_map[i] = relabel_map[root];
    }

    labels.mapv_inplace(|label| relabel_map[label]);
    labels
}

/// Fill enclosed holes of a binary mask.
///
/// Flood-fills background from every border pixel (4-connected); background
/// the flood never reaches is enclosed and becomes foreground.
pub fn fill_holes(mask: &ArrayView2<bool>) -> Array2<bool> {
    let (height, width) = mask.dim();
    let mut outside = Array2::from_elem((height, width), false);
    let mut queue = VecDeque::new();

    for i in 0..height {
        for j in 0..width {
            let on_border = i == 0 || j == 0 || i + 1 == height || j + 1 == width;
            if on_border && !mask[[i, j]] {
                outside[[i, j]] = true;
                queue.push_back((i, j));
            }
        }
    }

    while let Some((i, j)) = queue.pop_front() {
        let neighbours = [
            (i.wrapping_sub(1), j),
            (i + 1, j),
            (i, j.wrapping_sub(1)),
            (i, j + 1),
        ];
        for (ni, nj) in neighbours {
            if ni < height && nj < width && !mask[[ni, nj]] && !outside[[ni, nj]] {
                outside[[ni, nj]] = true;
                queue.push_back((ni, nj));
            }
        }
    }

    outside.mapv(|reached| !reached)
}
