//! PTW EPID QC phantom.

use imaging::image_proc::edges::CannySettings;

use crate::contrast::SeenCriterion;
use crate::geometry::AngleStrategy;
use crate::orientation::{DirectionCheck, InversionCheck};
use crate::outline::OutlineShape;
use crate::registry::{HookSet, PhantomDefinition, DEFAULT_CANNY, STANDARD_DETECTION};
use crate::roi::RoiDescriptor as R;

const HIGH_CONTRAST: [R; 7] = [
    // angled
    R::resolution("roi 1", -135.0, 1.5, 0.35, 0.15),
    R::resolution("roi 2", -109.0, 3.1, 0.35, 0.21),
    R::resolution("roi 3", -60.0, 3.4, 0.3, 0.27),
    R::resolution("roi 4", -60.0, 1.9, 0.25, 0.33),
    // vertical
    R::resolution("roi 5", -90.0, 3.68, 0.18, 0.5),
    R::resolution("roi 6", -90.0, 2.9, 0.08, 2.0),
    R::resolution("roi 7", -90.0, 2.2, 0.04, 3.0),
];

const LOW_CONTRAST: [R; 9] = [
    R::disk("roi 1", 31.0, 3.87, 0.3),
    R::disk("roi 2", 17.0, 3.48, 0.3),
    R::disk("roi 3", 0.0, 3.3, 0.3),
    R::disk("roi 4", -17.0, 3.48, 0.3),
    R::disk("roi 5", -31.0, 3.87, 0.3),
    R::disk("roi 6", 180.0 - 31.0, 3.87, 0.3),
    R::disk("roi 7", 180.0 - 17.0, 3.48, 0.3),
    R::disk("roi 8", 180.0, 3.3, 0.3),
    R::disk("roi 9", 180.0 + 17.0, 3.48, 0.3),
];

const BACKGROUND: [R; 1] = [R::disk("roi 1", -148.0, 3.85, 0.3)];

/// Line pairs at the top, low contrast at the bottom, no rotation.
pub static EPID_QC: PhantomDefinition = PhantomDefinition {
    common_name: "PTW EPID QC",
    bbox_size_mm2: 250.0 * 250.0,
    detection: STANDARD_DETECTION,
    canny: CannySettings {
        sigma: 4.0,
        ..DEFAULT_CANNY
    },
    radius_scale: 0.116,
    outline: Some(OutlineShape::Rectangle {
        width_ratio: 8.55,
        height_ratio: 8.55,
    }),
    high_contrast: &HIGH_CONTRAST,
    low_contrast: &LOW_CONTRAST,
    background: &BACKGROUND,
    hooks: HookSet {
        angle: AngleStrategy::Fixed(0.0),
        inversion: InversionCheck::None,
        direction: DirectionCheck::None,
        seen: SeenCriterion::Contrast,
    },
};
