//! Synthetic phantoms shared by the integration tests.

#![allow(dead_code)]

use imaging::image_proc::test_patterns::{
    draw_disk, draw_polar_block, draw_polar_disk, draw_rectangle, draw_rotated_rectangle,
};
use imaging::image_proc::PlanarImage;
use ndarray::Array2;
use planar::contrast::SeenCriterion;
use planar::geometry::{AngleStrategy, AxisConstraint, FiducialProbe};
use planar::orientation::{DirectionCheck, FiducialSweep, InversionCheck};
use planar::outline::OutlineShape;
use planar::registry::{HookSet, PhantomDefinition, DEFAULT_CANNY, STANDARD_DETECTION};
use planar::roi::RoiDescriptor as R;

pub const SIZE: usize = 400;
pub const CENTER: (f64, f64) = (199.5, 199.5);

pub const OUTSIDE: f64 = 0.2;
pub const BODY: f64 = 0.5;
pub const DETAIL: f64 = 0.8;

const BACKGROUND: [R; 4] = [
    R::disk("roi 1", 0.0, 0.5, 0.1),
    R::disk("roi 2", 90.0, 0.5, 0.1),
    R::disk("roi 3", 180.0, 0.5, 0.1),
    R::disk("roi 4", 270.0, 0.5, 0.1),
];

const CENTER_DETAIL: [R; 1] = [R::disk("roi 1", 0.0, 0.0, 0.1)];

const HOOKS: HookSet = HookSet {
    angle: AngleStrategy::Fixed(0.0),
    inversion: InversionCheck::None,
    direction: DirectionCheck::None,
    seen: SeenCriterion::Contrast,
};

/// A 200 mm square slab with one bright detail at its center. Its edge
/// ridge makes a bounding box of about 202², inside the 10 % band.
pub static SQUARE_SLAB: PhantomDefinition = PhantomDefinition {
    common_name: "Square slab",
    bbox_size_mm2: 40_000.0,
    detection: STANDARD_DETECTION,
    canny: DEFAULT_CANNY,
    radius_scale: 0.5,
    outline: Some(OutlineShape::Rectangle {
        width_ratio: 2.0,
        height_ratio: 2.0,
    }),
    high_contrast: &[],
    low_contrast: &CENTER_DETAIL,
    background: &BACKGROUND,
    hooks: HOOKS,
};

/// Same slab, with polarity judged from the intensity distribution inside
/// the outline.
pub static SQUARE_SLAB_PERCENTILES: PhantomDefinition = PhantomDefinition {
    common_name: "Square slab (percentiles)",
    hooks: HookSet {
        inversion: InversionCheck::PhantomPercentiles,
        ..HOOKS
    },
    ..SQUARE_SLAB
};

/// A 240 x 120 plate that must sit on a diagonal.
pub static DIAGONAL_PLATE: PhantomDefinition = PhantomDefinition {
    common_name: "Diagonal plate",
    bbox_size_mm2: 65_000.0,
    radius_scale: 0.3,
    hooks: HookSet {
        angle: AngleStrategy::PrincipalAxis(AxisConstraint {
            offset: 0.0,
            canonical: &[45.0, -45.0],
            tolerance: 5.0,
            snap: true,
        }),
        ..HOOKS
    },
    ..SQUARE_SLAB
};

/// The slab without any background regions to reference contrast against.
pub static SQUARE_SLAB_NO_BACKGROUND: PhantomDefinition = PhantomDefinition {
    common_name: "Square slab (no background)",
    background: &[],
    ..SQUARE_SLAB
};

/// Radius of the Leeds-like disc in pixels.
pub const DISC_RADIUS: f64 = 150.0;

/// Distance of the disc details from its center; 0.79 of the ~100 px radius.
pub const DISC_DETAIL_RING: f64 = 79.0;

/// Angle of the dark angular fiducial on an upright disc.
pub const DISC_FIDUCIAL_ANGLE: f64 = 60.0;

/// A 300 mm disc whose angle comes from a dark fiducial and whose
/// left/right orientation comes from the details following it.
/// Its edge ridge spans about 302 px, and 302 · 0.331 ≈ 100.
pub static LEEDS_DISC: PhantomDefinition = PhantomDefinition {
    common_name: "Leeds disc",
    bbox_size_mm2: 302.0 * 302.0,
    radius_scale: 0.331,
    outline: Some(OutlineShape::Circle { radius_ratio: 1.0 }),
    hooks: HookSet {
        angle: AngleStrategy::Fiducial(FiducialProbe::LEEDS),
        direction: DirectionCheck::FiducialSweep(FiducialSweep::LEEDS),
        ..HOOKS
    },
    ..SQUARE_SLAB
};

/// Square slab at 1 px/mm with a detail of `detail` at its center.
pub fn square_slab(detail: f64) -> Array2<f64> {
    let mut image = Array2::from_elem((SIZE, SIZE), OUTSIDE);
    draw_rectangle(&mut image, CENTER, 200.0, 200.0, BODY);
    draw_disk(&mut image, CENTER, 20.0, detail);
    image
}

/// A plain `side` px square slab with no details.
pub fn bare_slab(side: f64) -> PlanarImage {
    let mut image = Array2::from_elem((SIZE, SIZE), OUTSIDE);
    draw_rectangle(&mut image, CENTER, side, side, BODY);
    PlanarImage::new(image, 1.0).unwrap()
}

/// 240 x 120 plate with its long side drawn at `angle_deg`.
pub fn diagonal_plate(angle_deg: f64) -> PlanarImage {
    let mut image = Array2::from_elem((SIZE, SIZE), OUTSIDE);
    draw_rotated_rectangle(&mut image, CENTER, 240.0, 120.0, angle_deg, BODY);
    draw_disk(&mut image, CENTER, 15.0, DETAIL);
    PlanarImage::new(image, 1.0).unwrap()
}

/// Leeds-like disc: fiducial block at 60°, the strong detail at 120° and
/// the faint one at 310°. A mirrored disc has every angle `a` at `180 - a`.
pub fn leeds_disc(mirrored: bool) -> PlanarImage {
    let place = |angle: f64| if mirrored { 180.0 - angle } else { angle };
    let mut image = Array2::from_elem((SIZE, SIZE), OUTSIDE);
    draw_disk(&mut image, CENTER, DISC_RADIUS, BODY);
    draw_polar_block(&mut image, CENTER, DISC_DETAIL_RING, place(DISC_FIDUCIAL_ANGLE), 12.0, 0.0);
    draw_polar_disk(&mut image, CENTER, DISC_DETAIL_RING, place(120.0), 4.0, 0.2);
    draw_polar_disk(&mut image, CENTER, DISC_DETAIL_RING, place(310.0), 4.0, 0.4);
    PlanarImage::new(image, 1.0).unwrap()
}

/// Open field of `width` x `height` mm at 1 px/mm with marker disks at the
/// given offsets (mm) from the image center.
pub fn open_field(width: f64, height: f64, markers: &[(f64, f64)]) -> PlanarImage {
    let mut image = Array2::from_elem((SIZE, SIZE), 0.1);
    draw_rectangle(&mut image, CENTER, width, height, 1.0);
    for &(dx, dy) in markers {
        draw_disk(&mut image, (CENTER.0 + dx, CENTER.1 + dy), 3.0, 0.5);
    }
    PlanarImage::new(image, 1.0).unwrap()
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
