//! Image processing for phantom radiographs: adapter, smoothing, edges,
//! segmentation, centroids, apertures and intensity profiles.

pub mod aperture;
pub mod centroid;
pub mod convolve;
pub mod detection;
pub mod edges;
pub mod image;
pub mod profile;
pub mod test_patterns;

pub use image::{ImageAdapter, ImageError, PlanarImage};
