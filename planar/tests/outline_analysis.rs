//! End-to-end analysis of synthetic outline phantoms.

mod common;

use approx::assert_relative_eq;
use common::{
    bare_slab, diagonal_plate, init_logging, leeds_disc, square_slab, CENTER, DIAGONAL_PLATE,
    DISC_DETAIL_RING, DISC_FIDUCIAL_ANGLE, LEEDS_DISC, SQUARE_SLAB, SQUARE_SLAB_NO_BACKGROUND,
    SQUARE_SLAB_PERCENTILES,
};
use imaging::image_proc::{ImageAdapter, PlanarImage};
use planar::contrast::ContrastMethod;
use planar::outline::Outline;
use planar::{AnalysisConfig, ErrorKind, PlanarAnalyzer, PlanarError};

fn analyze(image: PlanarImage, config: &AnalysisConfig) -> planar::PlanarAnalysis {
    PlanarAnalyzer::new(image, &SQUARE_SLAB, false)
        .analyze(config)
        .unwrap()
}

fn slab() -> PlanarImage {
    PlanarImage::new(square_slab(common::DETAIL), 1.0).unwrap()
}

#[test]
fn test_seen_count_follows_threshold() {
    init_logging();
    // Michelson contrast of 0.8 against 0.5 is 0.3 / 1.3 ≈ 0.231
    let below = AnalysisConfig {
        low_contrast_threshold: 0.2,
        ..AnalysisConfig::default()
    };
    let analysis = analyze(slab(), &below);
    assert_relative_eq!(analysis.background_value.unwrap(), 0.5, epsilon = 1e-12);
    assert_relative_eq!(analysis.median_contrast(), 0.3 / 1.3, epsilon = 1e-12);
    assert_eq!(analysis.results_data(None).num_contrast_rois_seen, 1);

    let above = AnalysisConfig {
        low_contrast_threshold: 0.25,
        ..AnalysisConfig::default()
    };
    assert_eq!(analyze(slab(), &above).num_seen(), 0);
}

#[test]
fn test_contrast_method_is_configurable() {
    let config = AnalysisConfig {
        low_contrast_method: ContrastMethod::Weber,
        ..AnalysisConfig::default()
    };
    let analysis = analyze(slab(), &config);
    assert_relative_eq!(analysis.median_contrast(), 0.6, epsilon = 1e-12);
}

#[test]
fn test_geometry_from_outline() {
    let analysis = analyze(slab(), &AnalysisConfig::default());
    let geometry = analysis.geometry;
    assert!((geometry.center.x - 199.5).abs() <= 1.0);
    assert!((geometry.center.y - 199.5).abs() <= 1.0);
    // sqrt(bbox area) · 0.5 for a box of roughly 200 px
    assert!((geometry.radius - 100.0).abs() < 3.0);
    assert_eq!(geometry.angle, 0.0);

    let Some(Outline::Rectangle { width, height, .. }) = analysis.outline else {
        panic!("expected a rectangle outline");
    };
    assert_relative_eq!(width, geometry.radius * 2.0);
    assert_relative_eq!(height, geometry.radius * 2.0);

    let result = analysis.results_data(None);
    assert_eq!(result.analysis_type, "Square slab");
    assert_eq!(result.phantom_center_x_y, (geometry.center.x, geometry.center.y));
}

#[test]
fn test_forced_invert() {
    let config = AnalysisConfig {
        invert: true,
        ..AnalysisConfig::default()
    };
    // Inverted over [0.2, 0.8]: the detail becomes 0.2 on a 0.5 body
    let analysis = analyze(slab(), &config);
    assert_relative_eq!(analysis.median_contrast(), 0.3 / 0.7, epsilon = 1e-12);
}

#[test]
fn test_percentile_check_restores_polarity() {
    let mut flipped = slab();
    flipped.invert();
    let mut analyzer = PlanarAnalyzer::new(flipped, &SQUARE_SLAB_PERCENTILES, false);
    let analysis = analyzer.analyze(&AnalysisConfig::default()).unwrap();
    assert_relative_eq!(analyzer.image().array()[[199, 199]], common::DETAIL, epsilon = 1e-12);
    assert_relative_eq!(analysis.median_contrast(), 0.3 / 1.3, epsilon = 1e-12);

    // Correct polarity is left alone
    let mut analyzer = PlanarAnalyzer::new(slab(), &SQUARE_SLAB_PERCENTILES, false);
    analyzer.analyze(&AnalysisConfig::default()).unwrap();
    assert_eq!(analyzer.image().generation(), 0);
}

#[test]
fn test_normalize_on_load() {
    let analyzer = PlanarAnalyzer::new(slab(), &SQUARE_SLAB, true);
    let array = analyzer.image().array();
    assert_relative_eq!(array[[0, 0]], 0.0);
    assert_relative_eq!(array[[199, 199]], 1.0);
}

#[test]
fn test_detector_size_tolerance() {
    // Squares at 1 px/mm against a 200 mm x 200 mm expectation, ±10 % in area
    for side in [196.0, 200.0, 203.0] {
        let result = PlanarAnalyzer::new(bare_slab(side), &SQUARE_SLAB, false)
            .phantom_region(1000.0);
        assert!(result.is_ok(), "side {side} should be accepted");
    }
    for side in [170.0, 230.0] {
        let err = PlanarAnalyzer::new(bare_slab(side), &SQUARE_SLAB, false)
            .phantom_region(1000.0)
            .unwrap_err();
        assert!(matches!(err, PlanarError::PhantomNotFound { .. }), "side {side}");
        assert_eq!(err.kind(), ErrorKind::Detection);
    }
}

#[test]
fn test_distance_setting_scales_expected_size() {
    // At 1250 mm a 200 mm slab shows 160 px wide
    let config = AnalysisConfig {
        ssd_mm: 1250.0,
        ..AnalysisConfig::default()
    };
    let mut analyzer = PlanarAnalyzer::new(bare_slab(160.0), &SQUARE_SLAB, false);
    assert!(analyzer.phantom_region(config.ssd_mm).is_ok());
    assert!(analyzer.phantom_region(1000.0).is_err());
}

#[test]
fn test_principal_axis_snaps_to_diagonal() {
    let analysis = PlanarAnalyzer::new(diagonal_plate(45.0), &DIAGONAL_PLATE, false)
        .analyze(&AnalysisConfig::default())
        .unwrap();
    assert_eq!(analysis.geometry.angle, 45.0);

    // Orientation is reported from the row axis: a plate drawn at 133° reads -43°
    let analysis = PlanarAnalyzer::new(diagonal_plate(133.0), &DIAGONAL_PLATE, false)
        .analyze(&AnalysisConfig::default())
        .unwrap();
    assert_eq!(analysis.geometry.angle, -45.0);
}

#[test]
fn test_off_diagonal_plate_is_geometry_error() {
    let err = PlanarAnalyzer::new(diagonal_plate(60.0), &DIAGONAL_PLATE, false)
        .analyze(&AnalysisConfig::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Geometry);

    // An angle override bypasses the check entirely
    let config = AnalysisConfig {
        angle_override: Some(30.0),
        ..AnalysisConfig::default()
    };
    let analysis = PlanarAnalyzer::new(diagonal_plate(60.0), &DIAGONAL_PLATE, false)
        .analyze(&config)
        .unwrap();
    assert_eq!(analysis.geometry.angle, 30.0);
}

#[test]
fn test_invalid_config_is_rejected_before_analysis() {
    let config = AnalysisConfig {
        size_override: Some(-1.0),
        ..AnalysisConfig::default()
    };
    let err = PlanarAnalyzer::new(slab(), &SQUARE_SLAB, false)
        .analyze(&config)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_low_contrast_without_background_is_config_error() {
    let err = PlanarAnalyzer::new(slab(), &SQUARE_SLAB_NO_BACKGROUND, false)
        .analyze(&AnalysisConfig::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(matches!(err, PlanarError::InvalidConfig(_)));
    assert!(err.to_string().contains("no background"));
}

fn angular_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

/// Pixel under the fiducial of an upright disc.
fn fiducial_pixel() -> [usize; 2] {
    let (sin, cos) = DISC_FIDUCIAL_ANGLE.to_radians().sin_cos();
    let x = CENTER.0 + DISC_DETAIL_RING * cos;
    let y = CENTER.1 + DISC_DETAIL_RING * sin;
    [y.round() as usize, x.round() as usize]
}

#[test]
fn test_upright_disc_is_left_alone() {
    init_logging();
    let mut analyzer = PlanarAnalyzer::new(leeds_disc(false), &LEEDS_DISC, false);
    let analysis = analyzer.analyze(&AnalysisConfig::default()).unwrap();
    assert_eq!(analyzer.image().generation(), 0);
    let angle = analysis.geometry.angle;
    assert!(angular_distance(angle, DISC_FIDUCIAL_ANGLE) < 2.0, "angle {angle}");
}

#[test]
fn test_mirrored_disc_is_flipped_before_geometry() {
    init_logging();
    let mut analyzer = PlanarAnalyzer::new(leeds_disc(true), &LEEDS_DISC, false);
    let analysis = analyzer.analyze(&AnalysisConfig::default()).unwrap();

    // One mutation: the left/right flip
    assert_eq!(analyzer.image().generation(), 1);
    assert_eq!(analyzer.image().array()[fiducial_pixel()], 0.0);

    // Geometry was re-detected on the flipped image
    let angle = analysis.geometry.angle;
    assert!(angular_distance(angle, DISC_FIDUCIAL_ANGLE) < 2.0, "angle {angle}");
    assert!((analysis.geometry.center.x - CENTER.0).abs() <= 1.0);
    assert!((analysis.geometry.center.y - CENTER.1).abs() <= 1.0);
    assert!((analysis.geometry.radius - 100.0).abs() < 3.0);
    assert!(matches!(analysis.outline, Some(Outline::Circle { .. })));
}
