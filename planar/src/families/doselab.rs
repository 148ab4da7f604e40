//! Doselab MC2 kV and MV phantoms.

use crate::contrast::SeenCriterion;
use crate::geometry::{AngleStrategy, AxisConstraint};
use crate::orientation::{DirectionCheck, InversionCheck};
use crate::outline::{DetectionCondition, OutlineShape};
use crate::registry::{HookSet, PhantomDefinition, DEFAULT_CANNY};
use crate::roi::RoiDescriptor as R;

const BACKGROUND: [R; 1] = [R::disk("roi 1", 48.5, 0.27, 0.025)];

const LOW_CONTRAST: [R; 7] = [
    R::disk("roi 1", -48.5, 0.27, 0.025),
    R::disk("roi 2", -65.0, 0.225, 0.025),
    R::disk("roi 3", -88.5, 0.205, 0.025),
    R::disk("roi 4", -110.0, 0.22, 0.025),
    R::disk("roi 5", 110.0, 0.22, 0.025),
    R::disk("roi 6", 88.5, 0.205, 0.025),
    R::disk("roi 7", 65.0, 0.225, 0.025),
];

const KV_HIGH_CONTRAST: [R; 4] = [
    R::resolution("roi 1", -20.0, 0.17, 0.013, 0.6),
    R::resolution("roi 2", -2.0, 0.16, 0.007, 1.2),
    R::resolution("roi 3", 12.8, 0.164, 0.005, 1.8),
    R::resolution("roi 4", 24.7, 0.175, 0.0035, 2.4),
];

const MV_HIGH_CONTRAST: [R; 4] = [
    R::resolution("roi 1", -135.3, 0.23, 0.012, 0.1),
    R::resolution("roi 2", 161.0, 0.173, 0.012, 0.2),
    R::resolution("roi 3", 133.0, 0.237, 0.012, 0.4),
    R::resolution("roi 4", 122.9, 0.298, 0.01, 0.8),
];

/// Placed diagonally; the outline's axis plus 90° must be near 45°.
const MC2: PhantomDefinition = PhantomDefinition {
    common_name: "Doselab MC2 kV",
    bbox_size_mm2: 26300.0,
    // The MC2 sits off center on the panel
    detection: &[DetectionCondition::RIGHT_SIZE],
    canny: DEFAULT_CANNY,
    radius_scale: 1.214,
    outline: Some(OutlineShape::Rectangle {
        width_ratio: 0.55,
        height_ratio: 0.63,
    }),
    high_contrast: &KV_HIGH_CONTRAST,
    low_contrast: &LOW_CONTRAST,
    background: &BACKGROUND,
    hooks: HookSet {
        angle: AngleStrategy::PrincipalAxis(AxisConstraint {
            offset: 90.0,
            canonical: &[45.0],
            tolerance: 5.0,
            snap: false,
        }),
        inversion: InversionCheck::None,
        direction: DirectionCheck::None,
        seen: SeenCriterion::Contrast,
    },
};

pub static MC2_KV: PhantomDefinition = MC2;

pub static MC2_MV: PhantomDefinition = PhantomDefinition {
    common_name: "Doselab MC2 MV",
    high_contrast: &MV_HIGH_CONTRAST,
    ..MC2
};
