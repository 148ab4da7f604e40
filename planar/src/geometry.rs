//! Phantom center, radius and angle.
//!
//! The radius is a scale factor, not a physical size: ROI tables express
//! distances and disk radii as multiples of it. Angles are in degrees with
//! 0 pointing right and positive angles turning toward +y (down the image).
//!
//! # Angle strategies
//! - [`AngleStrategy::Fixed`]: the phantom sits in a stand at a known angle.
//! - [`AngleStrategy::Fiducial`]: a dark angular fiducial is located on a
//!   collapsed circular profile around the center.
//! - [`AngleStrategy::PrincipalAxis`]: the outline's own major axis, which
//!   must lie near one of a few canonical angles.

use std::f64::consts::TAU;

use imaging::image_proc::detection::RegionProps;
use imaging::image_proc::profile::{CircleProfileParams, Profile};
use nalgebra::Point2;
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::error::PlanarError;

/// Resolved placement of a phantom in the image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhantomGeometry {
    /// Center (x, y) in pixels
    pub center: Point2<f64>,
    /// Scale factor for ROI placement, always positive
    pub radius: f64,
    /// Degrees
    pub angle: f64,
}

/// Caller-supplied geometry that replaces detection.
///
/// An overridden component is never computed, so a fully overridden
/// geometry never touches the edge detector.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeometryOverrides {
    pub center: Option<Point2<f64>>,
    pub radius: Option<f64>,
    pub angle: Option<f64>,
}

impl GeometryOverrides {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            center: config.center_override.map(|(x, y)| Point2::new(x, y)),
            radius: config.size_override,
            angle: config.angle_override,
        }
    }
}

/// Collapsed circular profile used to find an angular fiducial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiducialProbe {
    /// Profile radius as a multiple of the phantom radius
    pub radius_ratio: f64,
    /// Relative half-width of the sampled annulus
    pub width_ratio: f64,
    pub num_profiles: usize,
    /// Median filter window as a fraction of the profile length
    pub filter_size: f64,
    /// Percent of maximum at which the fiducial peak is measured
    pub fwxm_percent: f64,
}

impl FiducialProbe {
    /// Ring through the lead fiducial of the Leeds TOR disc.
    pub const LEEDS: Self = Self {
        radius_ratio: 0.79,
        width_ratio: 0.04,
        num_profiles: 20,
        filter_size: 0.01,
        fwxm_percent: 60.0,
    };

    /// Sample the ring and shape it so the fiducial is the dominant peak:
    /// grounded, normalized, median filtered and inverted.
    pub fn profile(
        &self,
        array: &ArrayView2<f64>,
        center: Point2<f64>,
        radius: f64,
        start_deg: f64,
        ccw: bool,
    ) -> Profile {
        let params = CircleProfileParams::new((center.x, center.y), radius * self.radius_ratio)
            .collapsed(self.width_ratio, self.num_profiles)
            .start_angle(start_deg.to_radians())
            .ccw(ccw);
        let mut profile = Profile::circle(array, &params);
        profile
            .ground()
            .normalize()
            .median_filter(self.filter_size)
            .invert();
        profile
    }

    /// Sample index of the strongest fiducial peak.
    pub fn peak_index(&self, profile: &Profile, radius: f64) -> Result<f64, PlanarError> {
        profile
            .find_fwxm_peaks(self.fwxm_percent, Some(1))
            .first()
            .copied()
            .ok_or(PlanarError::FiducialNotFound {
                radius: radius * self.radius_ratio,
            })
    }
}

/// Angle accepted from an outline's principal axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisConstraint {
    /// Degrees added to the measured axis angle before comparison
    pub offset: f64,
    /// Angles the phantom stand allows
    pub canonical: &'static [f64],
    /// Allowed deviation in degrees
    pub tolerance: f64,
    /// Report the matching canonical angle instead of the measurement
    pub snap: bool,
}

/// How a family determines its angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AngleStrategy {
    Fixed(f64),
    Fiducial(FiducialProbe),
    PrincipalAxis(AxisConstraint),
}

/// Bounding-box midpoint of the outline region.
pub fn region_center(region: &RegionProps) -> Point2<f64> {
    let (x, y) = region.bbox.center();
    Point2::new(x, y)
}

/// `sqrt(bbox_area) · scale`.
pub fn region_radius(region: &RegionProps, scale: f64) -> f64 {
    (region.bbox_area() as f64).sqrt() * scale
}

/// Start angle for the fiducial scan.
///
/// A fiducial near 0° straddles the start of a profile that begins at 0°
/// and shows up as peaks at both ends. Probe at 0° for up to four peaks;
/// when they fall in both halves of the profile, scan from 90° instead.
pub fn fiducial_start_angle(
    array: &ArrayView2<f64>,
    center: Point2<f64>,
    radius: f64,
    probe: &FiducialProbe,
) -> Result<f64, PlanarError> {
    let profile = probe.profile(array, center, radius, 0.0, false);
    let peaks = profile.find_fwxm_peaks(probe.fwxm_percent, Some(4));
    if peaks.is_empty() {
        return Err(PlanarError::FiducialNotFound {
            radius: radius * probe.radius_ratio,
        });
    }
    let half = profile.len() as f64 / 2.0;
    let left = peaks.iter().filter(|&&idx| idx < half).count();
    let split = left > 0 && left < peaks.len();
    Ok(if split { 90.0 } else { 0.0 })
}

/// Phantom angle from the fiducial position on a counter-clockwise scan.
pub fn fiducial_angle(
    array: &ArrayView2<f64>,
    center: Point2<f64>,
    radius: f64,
    probe: &FiducialProbe,
) -> Result<f64, PlanarError> {
    let start = fiducial_start_angle(array, center, radius, probe)?;
    let profile = probe.profile(array, center, radius, start, true);
    let idx = probe.peak_index(&profile, radius)?;
    let shift = TAU * idx / profile.len() as f64;
    let angle = (TAU - shift).to_degrees() + start;
    log::debug!("fiducial at sample {idx:.1}/{} (start {start}°): angle {angle:.2}°", profile.len());
    Ok(angle)
}

/// Phantom angle from the outline's major axis.
pub fn principal_axis_angle(
    region: &RegionProps,
    constraint: &AxisConstraint,
) -> Result<f64, PlanarError> {
    let measured = region.orientation.to_degrees() + constraint.offset;
    let matched = constraint
        .canonical
        .iter()
        .copied()
        .find(|c| (measured - c).abs() <= constraint.tolerance);
    match matched {
        Some(canonical) if constraint.snap => Ok(canonical),
        Some(_) => Ok(measured),
        None => Err(PlanarError::AngleOutOfTolerance {
            measured,
            canonical: constraint.canonical.to_vec(),
            tolerance: constraint.tolerance,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use imaging::image_proc::detection::{connected_components, region_props, Connectivity};
    use imaging::image_proc::test_patterns::{draw_polar_block, draw_rotated_rectangle};
    use ndarray::Array2;

    const DIAGONALS: AxisConstraint = AxisConstraint {
        offset: 0.0,
        canonical: &[45.0, -45.0],
        tolerance: 5.0,
        snap: true,
    };

    fn angular_distance(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    }

    fn fiducial_image(angle: f64) -> Array2<f64> {
        let mut image = Array2::from_elem((400, 400), 0.5);
        draw_polar_block(&mut image, (200.0, 200.0), 79.0, angle, 12.0, 0.0);
        image
    }

    /// Orientation is measured from the row axis, so a rectangle drawn with
    /// its long side at `angle` reports `90 - angle`.
    fn rectangle_region(angle: f64) -> RegionProps {
        let mut mask = Array2::zeros((200, 200));
        draw_rotated_rectangle(&mut mask, (100.0, 100.0), 120.0, 40.0, angle, 1.0);
        let labels = connected_components(&mask.view(), Connectivity::Eight);
        region_props(&labels.view()).remove(0)
    }

    #[test]
    fn test_fiducial_angle() {
        for angle in [30.0, 100.0, 200.0, 315.0] {
            let image = fiducial_image(angle);
            let found =
                fiducial_angle(&image.view(), Point2::new(200.0, 200.0), 100.0, &FiducialProbe::LEEDS)
                    .unwrap();
            assert!(
                angular_distance(found, angle) < 1.5,
                "expected {angle}, found {found}"
            );
        }
    }

    #[test]
    fn test_fiducial_near_zero_rescans_from_ninety() {
        let image = fiducial_image(0.0);
        let center = Point2::new(200.0, 200.0);
        let start = fiducial_start_angle(&image.view(), center, 100.0, &FiducialProbe::LEEDS).unwrap();
        assert_eq!(start, 90.0);
        let found = fiducial_angle(&image.view(), center, 100.0, &FiducialProbe::LEEDS).unwrap();
        assert!(angular_distance(found, 0.0) < 1.5, "found {found}");

        let image = fiducial_image(120.0);
        let start = fiducial_start_angle(&image.view(), center, 100.0, &FiducialProbe::LEEDS).unwrap();
        assert_eq!(start, 0.0);
    }

    #[test]
    fn test_missing_fiducial() {
        let image = Array2::from_elem((100, 100), 0.5);
        let err = fiducial_angle(&image.view(), Point2::new(50.0, 50.0), 30.0, &FiducialProbe::LEEDS)
            .unwrap_err();
        assert!(matches!(err, PlanarError::FiducialNotFound { .. }));
    }

    #[test]
    fn test_principal_axis_snaps_to_canonical() {
        assert_eq!(principal_axis_angle(&rectangle_region(47.0), &DIAGONALS).unwrap(), 45.0);
        assert_eq!(principal_axis_angle(&rectangle_region(-43.0), &DIAGONALS).unwrap(), -45.0);
    }

    #[test]
    fn test_principal_axis_out_of_tolerance() {
        let err = principal_axis_angle(&rectangle_region(70.0), &DIAGONALS).unwrap_err();
        match err {
            PlanarError::AngleOutOfTolerance { measured, .. } => {
                assert!((measured - 20.0).abs() < 2.0)
            }
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn test_principal_axis_with_offset_reports_measurement() {
        let constraint = AxisConstraint {
            offset: 90.0,
            canonical: &[45.0],
            tolerance: 5.0,
            snap: false,
        };
        // Long side at 134° reports an orientation of -44°
        let angle = principal_axis_angle(&rectangle_region(134.0), &constraint).unwrap();
        assert!((angle - 46.0).abs() < 1.0, "angle {angle}");
    }

    #[test]
    fn test_region_center_and_radius() {
        let region = rectangle_region(0.0);
        let center = region_center(&region);
        assert_relative_eq!(center.x, 100.5);
        assert_relative_eq!(center.y, 100.5);
        assert_relative_eq!(
            region_radius(&region, 0.5),
            (region.bbox_area() as f64).sqrt() * 0.5
        );
    }

    #[test]
    fn test_overrides_from_config() {
        let config = AnalysisConfig {
            center_override: Some((10.0, 20.0)),
            angle_override: Some(5.0),
            ..Default::default()
        };
        let overrides = GeometryOverrides::from_config(&config);
        assert_eq!(overrides.center, Some(Point2::new(10.0, 20.0)));
        assert_eq!(overrides.radius, None);
        assert_eq!(overrides.angle, Some(5.0));
    }
}
