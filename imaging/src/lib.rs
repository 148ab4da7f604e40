//! Image-processing substrate for planar radiographic phantom analysis.
//!
//! Holds the pieces the phantom analysis composes: the image adapter with its
//! in-place mutators, Gaussian smoothing and Canny edge extraction,
//! connected-component labeling and region properties, intensity-weighted
//! centroids, disk apertures, 1-D intensity profiles and basic statistics.

pub mod algo;
pub mod image_proc;
