//! Las Vegas contrast-detail phantom.
//!
//! The details shrink and fade across a grid; whether one is seen is judged
//! by visibility rather than raw contrast.

use crate::contrast::SeenCriterion;
use crate::geometry::AngleStrategy;
use crate::orientation::{DirectionCheck, InversionCheck, ValleyOrder};
use crate::outline::OutlineShape;
use crate::registry::{HookSet, PhantomDefinition, DEFAULT_CANNY, STANDARD_DETECTION};
use crate::roi::RoiDescriptor as R;

const BACKGROUND: [R; 4] = [
    R::disk("roi 1", 0.0, 0.24, 0.03),
    R::disk("roi 2", 90.0, 0.24, 0.03),
    R::disk("roi 3", 180.0, 0.24, 0.03),
    R::disk("roi 4", 270.0, 0.24, 0.03),
];

const LOW_CONTRAST: [R; 20] = [
    R::disk("roi 1", 0.5, 0.107, 0.028),
    R::disk("roi 2", 39.5, 0.141, 0.028),
    R::disk("roi 3", 58.0, 0.205, 0.028),
    R::disk("roi 4", -76.5, 0.179, 0.016),
    R::disk("roi 5", -63.5, 0.095, 0.016),
    R::disk("roi 6", 0.5, 0.042, 0.016),
    R::disk("roi 7", 65.5, 0.097, 0.016),
    R::disk("roi 8", 76.5, 0.178, 0.016),
    R::disk("roi 9", -97.5, 0.174, 0.012),
    R::disk("roi 10", -105.5, 0.088, 0.012),
    R::disk("roi 11", -183.5, 0.024, 0.012),
    R::disk("roi 12", 105.5, 0.091, 0.012),
    R::disk("roi 13", 97.5, 0.179, 0.012),
    R::disk("roi 14", -113.5, 0.189, 0.007),
    R::disk("roi 15", -131.5, 0.113, 0.007),
    R::disk("roi 16", -181.5, 0.0745, 0.007),
    R::disk("roi 17", 130.0, 0.115, 0.007),
    R::disk("roi 18", 113.0, 0.191, 0.007),
    R::disk("roi 19", -124.6, 0.2085, 0.003),
    R::disk("roi 20", -144.3, 0.146, 0.003),
];

pub static LAS_VEGAS: PhantomDefinition = PhantomDefinition {
    common_name: "Las Vegas",
    bbox_size_mm2: 20260.0,
    detection: STANDARD_DETECTION,
    canny: DEFAULT_CANNY,
    radius_scale: 1.626,
    outline: Some(OutlineShape::Rectangle {
        width_ratio: 0.62,
        height_ratio: 0.62,
    }),
    high_contrast: &[],
    low_contrast: &LOW_CONTRAST,
    background: &BACKGROUND,
    hooks: HookSet {
        angle: AngleStrategy::Fixed(0.0),
        inversion: InversionCheck::PhantomPercentiles,
        direction: DirectionCheck::ValleyOrder(ValleyOrder::LAS_VEGAS),
        seen: SeenCriterion::Visibility,
    },
};
