//! Leeds TOR 18FG.

use crate::contrast::SeenCriterion;
use crate::geometry::{AngleStrategy, FiducialProbe};
use crate::orientation::{DirectionCheck, FiducialSweep, InversionCheck};
use crate::outline::OutlineShape;
use crate::registry::{HookSet, PhantomDefinition, DEFAULT_CANNY, STANDARD_DETECTION};
use crate::roi::RoiDescriptor as R;

const HOOKS: HookSet = HookSet {
    angle: AngleStrategy::Fiducial(FiducialProbe::LEEDS),
    inversion: InversionCheck::None,
    direction: DirectionCheck::FiducialSweep(FiducialSweep::LEEDS),
    seen: SeenCriterion::Contrast,
};

const HIGH_CONTRAST: [R; 12] = [
    R::resolution("roi 1", 54.8, 0.3, 0.04, 0.5),
    R::resolution("roi 2", 25.1, 0.187, 0.04, 0.56),
    R::resolution("roi 3", -27.5, 0.187, 0.04, 0.63),
    R::resolution("roi 4", 79.7, 0.252, 0.03, 0.71),
    R::resolution("roi 5", 63.4, 0.092, 0.03, 0.8),
    R::resolution("roi 6", -65.0, 0.094, 0.02, 0.9),
    R::resolution("roi 7", -263.0, 0.252, 0.02, 1.0),
    R::resolution("roi 8", -246.0, 0.094, 0.018, 1.12),
    R::resolution("roi 9", -117.0, 0.0958, 0.018, 1.25),
    R::resolution("roi 10", 112.5, 0.27, 0.015, 1.4),
    R::resolution("roi 11", 145.0, 0.13, 0.015, 1.6),
    R::resolution("roi 12", -142.0, 0.135, 0.011, 1.8),
];

const BACKGROUND: [R; 4] = [
    R::disk("roi 1", 30.0, 0.65, 0.025),
    R::disk("roi 2", 120.0, 0.65, 0.025),
    R::disk("roi 3", 210.0, 0.65, 0.025),
    R::disk("roi 4", 300.0, 0.65, 0.025),
];

/// Two arcs of nine details, 30°..150° and 210°..330° in 15° steps.
const fn contrast_ring(distance: f64) -> [R; 18] {
    [
        R::disk("roi 1", 30.0, distance, 0.025),
        R::disk("roi 2", 45.0, distance, 0.025),
        R::disk("roi 3", 60.0, distance, 0.025),
        R::disk("roi 4", 75.0, distance, 0.025),
        R::disk("roi 5", 90.0, distance, 0.025),
        R::disk("roi 6", 105.0, distance, 0.025),
        R::disk("roi 7", 120.0, distance, 0.025),
        R::disk("roi 8", 135.0, distance, 0.025),
        R::disk("roi 9", 150.0, distance, 0.025),
        R::disk("roi 10", 210.0, distance, 0.025),
        R::disk("roi 11", 225.0, distance, 0.025),
        R::disk("roi 12", 240.0, distance, 0.025),
        R::disk("roi 13", 255.0, distance, 0.025),
        R::disk("roi 14", 270.0, distance, 0.025),
        R::disk("roi 15", 285.0, distance, 0.025),
        R::disk("roi 16", 300.0, distance, 0.025),
        R::disk("roi 17", 315.0, distance, 0.025),
        R::disk("roi 18", 330.0, distance, 0.025),
    ]
}

const LOW_CONTRAST: [R; 18] = contrast_ring(0.785);

const LEEDS: PhantomDefinition = PhantomDefinition {
    common_name: "Leeds",
    bbox_size_mm2: 148.0 * 148.0,
    detection: STANDARD_DETECTION,
    canny: DEFAULT_CANNY,
    radius_scale: 0.515,
    outline: Some(OutlineShape::Circle { radius_ratio: 0.97 }),
    high_contrast: &HIGH_CONTRAST,
    low_contrast: &LOW_CONTRAST,
    background: &BACKGROUND,
    hooks: HOOKS,
};

pub static LEEDS_TOR: PhantomDefinition = LEEDS;

// Older blue-ring discs: the same layout with slightly offset details.

const BLUE_HIGH_CONTRAST: [R; 12] = [
    R::resolution("roi 1", 54.8, 0.3, 0.04, 0.5),
    R::resolution("roi 2", 25.1, 0.187, 0.04, 0.56),
    R::resolution("roi 3", -27.5, 0.187, 0.04, 0.63),
    R::resolution("roi 4", 79.7, 0.252, 0.03, 0.71),
    R::resolution("roi 5", 63.4, 0.092, 0.03, 0.8),
    R::resolution("roi 6", -65.0, 0.094, 0.02, 0.9),
    R::resolution("roi 7", -260.0, 0.252, 0.02, 1.0),
    R::resolution("roi 8", -240.0, 0.094, 0.018, 1.12),
    R::resolution("roi 9", -120.0, 0.0958, 0.018, 1.25),
    R::resolution("roi 10", 115.0, 0.27, 0.015, 1.4),
    R::resolution("roi 11", 150.0, 0.13, 0.011, 1.6),
    R::resolution("roi 12", -150.0, 0.135, 0.011, 1.8),
];

const BLUE_BACKGROUND: [R; 4] = [
    R::disk("roi 1", 30.0, 0.6, 0.025),
    R::disk("roi 2", 120.0, 0.6, 0.025),
    R::disk("roi 3", 210.0, 0.6, 0.025),
    R::disk("roi 4", 300.0, 0.6, 0.025),
];

const BLUE_LOW_CONTRAST: [R; 18] = contrast_ring(0.83);

pub static LEEDS_TOR_BLUE: PhantomDefinition = PhantomDefinition {
    common_name: "Leeds (Blue)",
    high_contrast: &BLUE_HIGH_CONTRAST,
    low_contrast: &BLUE_LOW_CONTRAST,
    background: &BLUE_BACKGROUND,
    ..LEEDS
};
