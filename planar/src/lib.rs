//! Planar radiographic phantom QA.
//!
//! Locates a physical test phantom in a 2-D radiograph, corrects its
//! polarity and left/right orientation, resolves its center, scale and
//! angle, samples regions at per-family positions and reports contrast,
//! noise and resolution figures.
//!
//! Outline-based families run through [`analysis::PlanarAnalyzer`];
//! marker-based light/radiation phantoms through
//! [`light_rad::LightRadAnalyzer`]. Each family is a
//! [`registry::PhantomFamily`] whose definition composes shared hooks with
//! its own tables.

pub mod analysis;
pub mod config;
pub mod contrast;
pub mod error;
pub mod families;
pub mod geometry;
pub mod light_rad;
pub mod orientation;
pub mod outline;
pub mod registry;
pub mod resolution;
pub mod result;
pub mod roi;

pub use crate::analysis::{PlanarAnalysis, PlanarAnalyzer};
pub use crate::config::{AnalysisConfig, LightRadConfig};
pub use crate::error::{ErrorKind, PlanarError};
pub use crate::light_rad::{LightRadAnalysis, LightRadAnalyzer};
pub use crate::registry::{FamilyDefinition, PhantomDefinition, PhantomFamily};
pub use crate::result::{LightRadResult, PlanarResult};
