//! Standard Imaging QC-3, QC-kV and FC-2.

use crate::contrast::SeenCriterion;
use crate::geometry::{AngleStrategy, AxisConstraint};
use crate::light_rad::{CenterStrategy, LayoutSelection, Marker, MarkerDefinition, MarkerLayout};
use crate::orientation::{DirectionCheck, InversionCheck};
use crate::outline::OutlineShape;
use crate::registry::{HookSet, PhantomDefinition, DEFAULT_CANNY, STANDARD_DETECTION};
use crate::roi::RoiDescriptor as R;

/// The QC stand holds the phantom at ±45°.
const HOOKS: HookSet = HookSet {
    angle: AngleStrategy::PrincipalAxis(AxisConstraint {
        offset: 0.0,
        canonical: &[45.0, -45.0],
        tolerance: 5.0,
        snap: true,
    }),
    inversion: InversionCheck::None,
    direction: DirectionCheck::None,
    seen: SeenCriterion::Contrast,
};

/// Five line-pair blocks along the long axis.
const fn line_pairs(lp_mm: [f64; 5]) -> [R; 5] {
    [
        R::resolution("roi 1", 0.0, 2.8, 0.5, lp_mm[0]),
        R::resolution("roi 2", 0.0, -2.8, 0.5, lp_mm[1]),
        R::resolution("roi 3", 0.0, 1.45, 0.5, lp_mm[2]),
        R::resolution("roi 4", 0.0, -1.45, 0.5, lp_mm[3]),
        R::resolution("roi 5", 0.0, 0.0, 0.5, lp_mm[4]),
    ]
}

const QC3_HIGH_CONTRAST: [R; 5] = line_pairs([0.1, 0.2, 0.25, 0.45, 0.76]);
const QC_KV_HIGH_CONTRAST: [R; 5] = line_pairs([0.66, 0.98, 1.5, 2.0, 2.46]);

const LOW_CONTRAST: [R; 5] = [
    R::disk("roi 1", -90.0, 2.0, 0.5),
    R::disk("roi 2", 55.0, 2.4, 0.5),
    R::disk("roi 3", -55.0, 2.4, 0.5),
    R::disk("roi 4", 128.0, 2.4, 0.5),
    R::disk("roi 5", -128.0, 2.4, 0.5),
];

const BACKGROUND: [R; 1] = [R::disk("roi 1", 90.0, 2.0, 0.5)];

pub static QC3: PhantomDefinition = PhantomDefinition {
    common_name: "SI QC-3",
    bbox_size_mm2: 168.0 * 168.0,
    detection: STANDARD_DETECTION,
    canny: DEFAULT_CANNY,
    radius_scale: 0.0896,
    outline: Some(OutlineShape::Rectangle {
        width_ratio: 7.5,
        height_ratio: 6.0,
    }),
    high_contrast: &QC3_HIGH_CONTRAST,
    low_contrast: &LOW_CONTRAST,
    background: &BACKGROUND,
    hooks: HOOKS,
};

pub static QC_KV: PhantomDefinition = PhantomDefinition {
    common_name: "SI QC-kV",
    bbox_size_mm2: 142.0 * 142.0,
    detection: STANDARD_DETECTION,
    canny: DEFAULT_CANNY,
    radius_scale: 0.0989,
    outline: Some(OutlineShape::Rectangle {
        width_ratio: 7.8,
        height_ratio: 6.4,
    }),
    high_contrast: &QC_KV_HIGH_CONTRAST,
    low_contrast: &LOW_CONTRAST,
    background: &BACKGROUND,
    hooks: HOOKS,
};

// Marker offsets are mm from the image center, +y down.

static FC2_10X10: MarkerLayout = MarkerLayout {
    name: "10x10",
    markers: &[
        Marker::new("TL", -40.0, -40.0),
        Marker::new("BL", -40.0, 40.0),
        Marker::new("TR", 40.0, -40.0),
        Marker::new("BR", 40.0, 40.0),
    ],
};

static FC2_15X15: MarkerLayout = MarkerLayout {
    name: "15x15",
    markers: &[
        Marker::new("TL", -65.0, -65.0),
        Marker::new("BL", -65.0, 65.0),
        Marker::new("TR", 65.0, -65.0),
        Marker::new("BR", 65.0, 65.0),
    ],
};

pub static FC2: MarkerDefinition = MarkerDefinition {
    common_name: "SI FC-2",
    layouts: LayoutSelection::ByFieldWidth {
        small: &FC2_10X10,
        large: &FC2_15X15,
        threshold_mm: 140.0,
        tolerance_mm: 10.0,
    },
    window_mm: 10.0,
    strip_width_mm: 5.0,
    center: CenterStrategy::MarkerMean,
};
