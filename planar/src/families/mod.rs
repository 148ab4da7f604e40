//! Configuration of every supported phantom family.
//!
//! ROI angles are degrees added to the phantom angle, distances and radii
//! are multiples of the phantom radius.

pub mod doselab;
pub mod imt;
pub mod las_vegas;
pub mod leeds;
pub mod ptw;
pub mod snc;
pub mod standard_imaging;
