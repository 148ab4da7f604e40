//! Edge, region and profile measurements on synthetic shapes.

use approx::assert_relative_eq;
use imaging::image_proc::centroid::compute_centroid_from_mask;
use imaging::image_proc::detection::{
    apply_threshold, connected_components, fill_holes, otsu_threshold, region_props, Connectivity,
};
use imaging::image_proc::edges::{canny, CannySettings};
use imaging::image_proc::profile::{CircleProfileParams, Profile};
use imaging::image_proc::test_patterns::{add_gaussian_noise, draw_disk, draw_rectangle};
use ndarray::Array2;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_disk_outline_is_centered() {
    init_logging();
    let mut image = Array2::from_elem((160, 160), 0.1);
    draw_disk(&mut image, (80.0, 80.0), 40.0, 0.9);
    let edges = canny(&image.view(), &CannySettings::default());
    let binary = edges.mapv(|e| if e { 1.0 } else { 0.0 });
    let labels = connected_components(&binary.view(), Connectivity::Eight);
    let outline = region_props(&labels.view())
        .into_iter()
        .max_by_key(|r| r.bbox_area())
        .unwrap();

    let (x, y) = outline.bbox.center();
    assert!((x - 80.5).abs() <= 1.0, "x = {x}");
    assert!((y - 80.5).abs() <= 1.0, "y = {y}");
    assert!(outline.bbox.width() >= 80 && outline.bbox.width() <= 84);
    assert!(outline.eccentricity < 0.2);
}

#[test]
fn test_otsu_segments_noisy_blob() {
    let mut image = Array2::from_elem((40, 40), 0.2);
    draw_disk(&mut image, (18.0, 22.0), 6.0, 0.8);
    add_gaussian_noise(&mut image, 0.02, 7);
    image.mapv_inplace(|v| v.clamp(0.0, 1.0));

    let threshold = otsu_threshold(&image.view());
    assert!(threshold > 0.3 && threshold < 0.7, "threshold = {threshold}");
    let mask = fill_holes(&apply_threshold(&image.view(), threshold).view());
    let centroid = compute_centroid_from_mask(&image.view(), &mask.view()).unwrap();
    assert_relative_eq!(centroid.x, 18.0, epsilon = 0.2);
    assert_relative_eq!(centroid.y, 22.0, epsilon = 0.2);
}

#[test]
fn test_field_profile_widths() {
    let mut image = Array2::from_elem((120, 120), 0.0);
    draw_rectangle(&mut image, (59.5, 59.5), 60.0, 40.0, 1.0);
    let x = Profile::horizontal(&image.view(), 60, 2).fwxm_edges(50.0).unwrap();
    let y = Profile::vertical(&image.view(), 60, 2).fwxm_edges(50.0).unwrap();
    assert_relative_eq!(x.width(), 60.0, epsilon = 1e-9);
    assert_relative_eq!(y.width(), 40.0, epsilon = 1e-9);
    assert_relative_eq!(x.center(), 59.5, epsilon = 1e-9);
}

#[test]
fn test_circle_profile_finds_dark_block() {
    let mut image = Array2::from_elem((200, 200), 1.0);
    // Dark block straight below the center (+y, 90°)
    draw_rectangle(&mut image, (100.0, 150.0), 10.0, 10.0, 0.0);
    let params = CircleProfileParams::new((100.0, 100.0), 50.0);
    let profile = Profile::circle(&image.view(), &params);
    let darkest = profile.argmin().unwrap();
    let angle = 360.0 * darkest as f64 / profile.len() as f64;
    assert!((angle - 90.0).abs() < 8.0, "angle = {angle}");
}
