//! Phantom outline detection.
//!
//! Candidates are the 8-connected components of a Canny edge map. Each
//! family lists the predicates a candidate must satisfy; among the
//! survivors the one with the largest bounding box is taken as the phantom.
//! The bounding-box midpoint rather than the centroid is used for
//! centering because a partly clipped outline drags its centroid.

use imaging::image_proc::detection::{
    connected_components, region_props, Connectivity, RegionProps,
};
use imaging::image_proc::edges::{canny, CannySettings};
use nalgebra::Point2;
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::error::PlanarError;
use crate::geometry::PhantomGeometry;

/// Relative tolerance of the centering predicate.
pub const CENTERED_RTOL: f64 = 0.3;

/// Relative tolerance of the size predicate.
pub const RIGHT_SIZE_RTOL: f64 = 0.1;

/// Nominal source-to-detector distance the phantom sizes are quoted at.
pub const NOMINAL_SSD_MM: f64 = 1000.0;

/// Absolute slack added to every relative comparison.
const ATOL: f64 = 1e-8;

/// A predicate a candidate region must satisfy to be the phantom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DetectionCondition {
    /// Bounding-box midpoint within `rtol` of the image center on both axes
    Centered { rtol: f64 },
    /// Bounding-box area within `rtol` of the expected area
    RightSize { rtol: f64 },
}

impl DetectionCondition {
    pub const CENTERED: Self = DetectionCondition::Centered { rtol: CENTERED_RTOL };
    pub const RIGHT_SIZE: Self = DetectionCondition::RightSize { rtol: RIGHT_SIZE_RTOL };

    pub fn accepts(&self, region: &RegionProps, ctx: &DetectionContext) -> bool {
        match *self {
            DetectionCondition::Centered { rtol } => {
                let (x, y) = region.bbox.center();
                let (cx, cy) = ctx.image_center;
                is_close(x, cx, rtol) && is_close(y, cy, rtol)
            }
            DetectionCondition::RightSize { rtol } => {
                is_close(region.bbox_area() as f64, ctx.expected_bbox_area, rtol)
            }
        }
    }
}

/// `|a - b| <= atol + rtol·|b|`
fn is_close(a: f64, b: f64, rtol: f64) -> bool {
    (a - b).abs() <= ATOL + rtol * b.abs()
}

/// What the predicates compare against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionContext {
    /// Image center (x, y) in pixels
    pub image_center: (f64, f64),
    /// Expected outline bounding-box area in pixels²
    pub expected_bbox_area: f64,
}

/// Expected bounding-box area in pixels² of an outline of `bbox_mm2` at
/// `ssd_mm`.
///
/// The physical area scales with the square of the pixel spacing and, for a
/// phantom placed off the nominal distance, inversely with the square of the
/// distance ratio.
pub fn expected_bbox_area(bbox_mm2: f64, dpmm: f64, ssd_mm: f64) -> f64 {
    bbox_mm2 * dpmm * dpmm / (ssd_mm / NOMINAL_SSD_MM).powi(2)
}

/// Connected edge regions of an image.
pub fn detect_candidates(array: &ArrayView2<f64>, settings: &CannySettings) -> Vec<RegionProps> {
    let edges = canny(array, settings);
    let binary = edges.mapv(|e| if e { 1.0 } else { 0.0 });
    let labels = connected_components(&binary.view(), Connectivity::Eight);
    let regions = region_props(&labels.view());
    log::debug!("{} edge regions at sigma {}", regions.len(), settings.sigma);
    regions
}

/// Pick the phantom outline among candidate regions.
///
/// # Returns
/// The largest-bounding-box candidate passing every condition
pub fn select_phantom_region(
    candidates: Vec<RegionProps>,
    conditions: &[DetectionCondition],
    ctx: &DetectionContext,
) -> Result<RegionProps, PlanarError> {
    let total = candidates.len();
    let selected = candidates
        .into_iter()
        .filter(|region| conditions.iter().all(|c| c.accepts(region, ctx)))
        .max_by_key(|region| region.bbox_area());
    match selected {
        Some(region) => {
            log::debug!(
                "phantom outline: label {} bbox area {} of {total} candidates",
                region.label,
                region.bbox_area()
            );
            Ok(region)
        }
        None => Err(PlanarError::PhantomNotFound { candidates: total }),
    }
}

/// Shape a plotter draws around the phantom, relative to its geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OutlineShape {
    Circle { radius_ratio: f64 },
    Rectangle { width_ratio: f64, height_ratio: f64 },
}

/// Outline placed at a resolved geometry, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Outline {
    Circle {
        center: Point2<f64>,
        radius: f64,
    },
    /// Rectangle centered on the phantom, `width` along `angle`
    Rectangle {
        center: Point2<f64>,
        width: f64,
        height: f64,
        angle: f64,
    },
}

impl OutlineShape {
    pub fn place(&self, geometry: &PhantomGeometry) -> Outline {
        match *self {
            OutlineShape::Circle { radius_ratio } => Outline::Circle {
                center: geometry.center,
                radius: geometry.radius * radius_ratio,
            },
            OutlineShape::Rectangle {
                width_ratio,
                height_ratio,
            } => Outline::Rectangle {
                center: geometry.center,
                width: geometry.radius * width_ratio,
                height: geometry.radius * height_ratio,
                angle: geometry.angle,
            },
        }
    }
}
