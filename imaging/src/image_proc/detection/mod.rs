//! Segmentation of binary and edge images into labeled regions.

pub mod regions;
pub mod thresholding;

pub use regions::{region_props, BoundingBox, RegionProps};
pub use thresholding::{
    apply_threshold, connected_components, fill_holes, otsu_threshold, Connectivity,
};
