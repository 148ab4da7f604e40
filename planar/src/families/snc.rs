//! Sun Nuclear kV-QA, MV-QA and FSQA.

use crate::contrast::SeenCriterion;
use crate::geometry::AngleStrategy;
use crate::light_rad::{CenterStrategy, LayoutSelection, Marker, MarkerDefinition, MarkerLayout};
use crate::orientation::{DirectionCheck, InversionCheck};
use crate::outline::OutlineShape;
use crate::registry::{HookSet, PhantomDefinition, DEFAULT_CANNY, STANDARD_DETECTION};
use crate::roi::RoiDescriptor as R;

/// The stand holds the phantom at a fixed angle.
const fn stand_hooks(angle: f64) -> HookSet {
    HookSet {
        angle: AngleStrategy::Fixed(angle),
        inversion: InversionCheck::None,
        direction: DirectionCheck::None,
        seen: SeenCriterion::Contrast,
    }
}

const KV_HIGH_CONTRAST: [R; 4] = [
    R::resolution("roi 1", 0.0, 1.8, 0.7, 0.6),
    R::resolution("roi 2", 90.0, -1.8, 0.7, 1.2),
    R::resolution("roi 3", 0.0, -1.8, 0.7, 1.8),
    R::resolution("roi 4", 90.0, 1.8, 0.7, 2.4),
];

const KV_LOW_CONTRAST: [R; 4] = [
    R::disk("roi 1", -45.0, 2.6, 0.6),
    R::disk("roi 2", -135.0, 2.6, 0.6),
    R::disk("roi 3", 45.0, 2.6, 0.6),
    R::disk("roi 4", 135.0, 2.6, 0.6),
];

const KV_BACKGROUND: [R; 2] = [
    R::disk("roi 1", 90.0, 0.5, 0.25),
    R::disk("roi 2", -90.0, 0.5, 0.25),
];

pub static KV_QA: PhantomDefinition = PhantomDefinition {
    common_name: "SNC kV-QA",
    bbox_size_mm2: 134.0 * 134.0,
    detection: STANDARD_DETECTION,
    canny: DEFAULT_CANNY,
    radius_scale: 0.1071,
    outline: Some(OutlineShape::Rectangle {
        width_ratio: 7.7,
        height_ratio: 5.6,
    }),
    high_contrast: &KV_HIGH_CONTRAST,
    low_contrast: &KV_LOW_CONTRAST,
    background: &KV_BACKGROUND,
    hooks: stand_hooks(135.0),
};

const MV_HIGH_CONTRAST: [R; 4] = [
    R::resolution("roi 1", 0.0, -2.3, 0.8, 0.1),
    R::resolution("roi 2", 90.0, 2.3, 0.8, 0.2),
    R::resolution("roi 3", 0.0, 2.3, 0.8, 0.5),
    R::resolution("roi 4", 90.0, -2.3, 0.8, 1.0),
];

const MV_LOW_CONTRAST: [R; 4] = [
    R::disk("roi 1", -45.0, 3.4, 0.7),
    R::disk("roi 2", 45.0, 3.4, 0.7),
    R::disk("roi 3", 135.0, 3.4, 0.7),
    R::disk("roi 4", -135.0, 3.4, 0.7),
];

const MV_BACKGROUND: [R; 2] = [
    R::disk("roi 1", 0.0, 0.7, 0.2),
    R::disk("roi 2", 0.0, -0.7, 0.2),
];

pub static MV_QA: PhantomDefinition = PhantomDefinition {
    common_name: "SNC MV-QA",
    bbox_size_mm2: 118.0 * 118.0,
    detection: STANDARD_DETECTION,
    canny: DEFAULT_CANNY,
    radius_scale: 0.1071,
    outline: Some(OutlineShape::Rectangle {
        width_ratio: 7.5,
        height_ratio: 7.5,
    }),
    high_contrast: &MV_HIGH_CONTRAST,
    low_contrast: &MV_LOW_CONTRAST,
    background: &MV_BACKGROUND,
    hooks: stand_hooks(45.0),
};

// The FSQA edge markers sit in the penumbra, so only the marker 40 mm up
// and right of the phantom center is detected.

static FSQA_TOP_RIGHT: MarkerLayout = MarkerLayout {
    name: "top right",
    markers: &[Marker::new("TR", 40.0, -40.0)],
};

pub static FSQA: MarkerDefinition = MarkerDefinition {
    common_name: "SNC FSQA",
    layouts: LayoutSelection::Fixed(&FSQA_TOP_RIGHT),
    window_mm: 12.0,
    strip_width_mm: 5.0,
    center: CenterStrategy::VirtualCenter {
        marker: "TR",
        offset_mm: (40.0, -40.0),
    },
};
