//! Marker-based light/radiation analysis on synthetic open fields.

mod common;

use approx::assert_relative_eq;
use common::{init_logging, open_field};
use imaging::image_proc::ImageAdapter;
use planar::families::{imt, standard_imaging};
use planar::{ErrorKind, LightRadAnalyzer, LightRadConfig, PlanarError};

const FC2_SMALL: [(f64, f64); 4] = [(-40.0, -40.0), (-40.0, 40.0), (40.0, -40.0), (40.0, 40.0)];
const FC2_LARGE: [(f64, f64); 4] = [(-65.0, -65.0), (-65.0, 65.0), (65.0, -65.0), (65.0, 65.0)];

#[test]
fn test_fc2_large_field_uses_wide_layout() {
    init_logging();
    let image = open_field(150.0, 150.0, &FC2_LARGE);
    let analysis = LightRadAnalyzer::new(image, &standard_imaging::FC2)
        .analyze(&LightRadConfig::default())
        .unwrap();
    assert_eq!(analysis.layout, "15x15");
    let names: Vec<&str> = analysis.markers.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["TL", "BL", "TR", "BR"]);

    let result = analysis.results_data();
    assert_relative_eq!(result.field_size_x_mm, 150.0, epsilon = 1e-6);
    assert_relative_eq!(result.field_size_y_mm, 150.0, epsilon = 1e-6);
    assert!(result.field_bb_offset_x_mm.abs() < 0.1);
    assert!(result.field_bb_offset_y_mm.abs() < 0.1);
}

#[test]
fn test_fc2_mismatched_field_is_geometry_error() {
    let image = open_field(100.0, 130.0, &FC2_SMALL);
    let err = LightRadAnalyzer::new(image, &standard_imaging::FC2)
        .analyze(&LightRadConfig::default())
        .unwrap_err();
    assert!(matches!(err, PlanarError::FieldWidthMismatch { .. }));
    assert_eq!(err.kind(), ErrorKind::Geometry);
}

#[test]
fn test_inverted_field_is_corrected() {
    let mut image = open_field(100.0, 100.0, &FC2_SMALL);
    image.invert();
    let mut analyzer = LightRadAnalyzer::new(image, &standard_imaging::FC2);
    let analysis = analyzer.analyze(&LightRadConfig::default()).unwrap();
    // Corners are dark again
    assert!(analyzer.image().array()[[0, 0]] < 0.5);
    assert_relative_eq!(analysis.results_data().field_size_x_mm, 100.0, epsilon = 1e-6);
    assert_eq!(analysis.markers.len(), 4);
}

#[test]
fn test_lrad_center_marker() {
    let image = open_field(120.0, 120.0, &[(0.0, 0.0)]);
    let analysis = LightRadAnalyzer::new(image, &imt::L_RAD)
        .analyze(&LightRadConfig::default())
        .unwrap();
    assert_eq!(analysis.markers.len(), 1);
    assert_relative_eq!(analysis.marker_center.x, 199.5, epsilon = 0.1);
    assert_relative_eq!(analysis.marker_center.y, 199.5, epsilon = 0.1);

    let map = analysis.results_data().to_map().unwrap();
    assert_eq!(map.len(), 6);
    assert!(map["field_epid_offset_x_mm"].as_f64().unwrap().abs() < 1e-6);
}

#[test]
fn test_lower_fwxm_widens_sloped_field() {
    // A ramp edge: FW25%M sits further out than FW50%M
    let mut image = open_field(100.0, 100.0, &[(0.0, 0.0)]).into_array();
    // The field covers pixels 150..=249
    for (offset, value) in [(1, 0.7), (2, 0.4)] {
        let lo = 150 - offset;
        let hi = 249 + offset;
        image.row_mut(lo).fill(value);
        image.row_mut(hi).fill(value);
        image.column_mut(lo).fill(value);
        image.column_mut(hi).fill(value);
    }
    let image = imaging::image_proc::PlanarImage::new(image, 1.0).unwrap();
    let at = |fwxm: f64| {
        LightRadAnalyzer::new(image.clone(), &imt::L_RAD)
            .analyze(&LightRadConfig { fwxm, ..LightRadConfig::default() })
            .unwrap()
            .field
            .width_x_mm
    };
    assert!(at(25.0) > at(50.0));
}
