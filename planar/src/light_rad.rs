//! Light/radiation field coincidence from fiducial markers.
//!
//! These phantoms have no outline to detect. Geometry comes from small
//! radio-opaque markers at known offsets from the image center, and the
//! open field is measured from FWXM profiles through the image center.
//!
//! All positions are (x, y) pixels; offsets in layout tables are mm with
//! +y pointing down the image.

use imaging::image_proc::centroid::compute_centroid_from_mask;
use imaging::image_proc::detection::{
    apply_threshold, connected_components, fill_holes, otsu_threshold, region_props,
    Connectivity, RegionProps,
};
use imaging::image_proc::image::{inverted, min_max, DEFAULT_INVERSION_BOX};
use imaging::image_proc::profile::Profile;
use imaging::image_proc::{ImageAdapter, PlanarImage};
use nalgebra::{Point2, Vector2};
use ndarray::{s, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::config::LightRadConfig;
use crate::error::PlanarError;
use crate::result::LightRadResult;
use crate::roi::RectangleRoi;

/// Components smaller than this (pixels) are speckle.
pub const MIN_MARKER_AREA: usize = 20;

/// Components more eccentric than this are line artifacts.
pub const MAX_MARKER_ECCENTRICITY: f64 = 0.9;

/// One marker's nominal position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub name: &'static str,
    /// Offset (x, y) from the image center in mm
    pub offset_mm: (f64, f64),
}

impl Marker {
    pub const fn new(name: &'static str, x_mm: f64, y_mm: f64) -> Self {
        Self {
            name,
            offset_mm: (x_mm, y_mm),
        }
    }
}

/// A named set of nominal marker positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerLayout {
    pub name: &'static str,
    pub markers: &'static [Marker],
}

/// How the marker layout is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutSelection {
    /// Always the same markers
    Fixed(&'static MarkerLayout),
    /// Markers spaced for the field size in use
    ByFieldWidth {
        small: &'static MarkerLayout,
        large: &'static MarkerLayout,
        /// Fields wider than this (mm) use the large layout
        threshold_mm: f64,
        /// Allowed x/y width disagreement in mm
        tolerance_mm: f64,
    },
}

/// How the phantom center is derived from detected markers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CenterStrategy {
    /// Unweighted mean of every detected marker
    MarkerMean,
    /// One marker at a known physical offset from the phantom center.
    /// The center is the marker position minus `offset_mm`.
    VirtualCenter {
        marker: &'static str,
        offset_mm: (f64, f64),
    },
}

/// Immutable configuration of a marker-based phantom family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerDefinition {
    pub common_name: &'static str,
    pub layouts: LayoutSelection,
    /// Side of the square window searched for each marker, mm
    pub window_mm: f64,
    /// Width of the strip averaged into the field profiles, mm
    pub strip_width_mm: f64,
    pub center: CenterStrategy,
}

/// Choose a layout from the field widths along each axis.
pub fn select_layout(
    selection: &LayoutSelection,
    x_width_mm: f64,
    y_width_mm: f64,
) -> Result<&'static MarkerLayout, PlanarError> {
    match *selection {
        LayoutSelection::Fixed(layout) => Ok(layout),
        LayoutSelection::ByFieldWidth {
            small,
            large,
            threshold_mm,
            tolerance_mm,
        } => {
            if (x_width_mm - y_width_mm).abs() > tolerance_mm {
                return Err(PlanarError::FieldWidthMismatch {
                    x_mm: x_width_mm,
                    y_mm: y_width_mm,
                    tolerance_mm,
                });
            }
            Ok(if x_width_mm > threshold_mm { large } else { small })
        }
    }
}

/// Open field center (pixels) and widths (mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub center: Point2<f64>,
    pub width_x_mm: f64,
    pub width_y_mm: f64,
}

fn fwxm_edges(
    profile: &Profile,
    fwxm: f64,
    axis: &'static str,
) -> Result<imaging::image_proc::profile::FwxmEdges, PlanarError> {
    profile
        .fwxm_edges(fwxm)
        .map_err(|source| PlanarError::FieldNotFound { axis, source })
}

/// Field widths from single profiles through the image center.
///
/// Only used to pick a marker layout; the reported field comes from
/// [`measure_field`].
pub fn center_line_widths(
    array: &ArrayView2<f64>,
    dpmm: f64,
    fwxm: f64,
) -> Result<(f64, f64), PlanarError> {
    let (rows, cols) = array.dim();
    let row = (((rows as f64 - 1.0) / 2.0) as usize).min(rows.saturating_sub(1));
    let col = (((cols as f64 - 1.0) / 2.0) as usize).min(cols.saturating_sub(1));
    let x = fwxm_edges(&Profile::horizontal(array, row, 0), fwxm, "x")?;
    let y = fwxm_edges(&Profile::vertical(array, col, 0), fwxm, "y")?;
    Ok((x.width() / dpmm, y.width() / dpmm))
}

/// Field center and widths from strips averaged through the image center.
pub fn measure_field(
    array: &ArrayView2<f64>,
    dpmm: f64,
    strip_width_mm: f64,
    fwxm: f64,
) -> Result<FieldInfo, PlanarError> {
    let (rows, cols) = array.dim();
    let (cx, cy) = ((cols as f64 - 1.0) / 2.0, (rows as f64 - 1.0) / 2.0);
    let half = strip_width_mm / 2.0 * dpmm;
    let bounds = |c: f64, len: usize| {
        let lo = ((c - half).max(0.0) as usize).min(len.saturating_sub(1));
        let hi = ((c + half) as usize).clamp(lo + 1, len);
        (lo, hi)
    };

    let (c0, c1) = bounds(cx, cols);
    let y_values = array
        .slice(s![.., c0..c1])
        .mean_axis(Axis(1))
        .map(|a| a.to_vec())
        .unwrap_or_default();
    let (r0, r1) = bounds(cy, rows);
    let x_values = array
        .slice(s![r0..r1, ..])
        .mean_axis(Axis(0))
        .map(|a| a.to_vec())
        .unwrap_or_default();

    let x = fwxm_edges(&Profile::new(x_values), fwxm, "x")?;
    let y = fwxm_edges(&Profile::new(y_values), fwxm, "y")?;
    Ok(FieldInfo {
        center: Point2::new(x.center(), y.center()),
        width_x_mm: x.width() / dpmm,
        width_y_mm: y.width() / dpmm,
    })
}

/// Locate one marker inside a square window of an image where markers are
/// bright.
///
/// The window is grounded and scaled on its own, Otsu-thresholded and
/// hole-filled; of the components that are large and round enough, the one
/// nearest (L1) the window center wins.
pub fn detect_marker(
    array: &ArrayView2<f64>,
    name: &str,
    nominal: Point2<f64>,
    window_px: f64,
    window_mm: f64,
) -> Result<Point2<f64>, PlanarError> {
    let not_found = || PlanarError::MarkerNotFound {
        name: name.to_string(),
        window_mm,
    };
    let window = RectangleRoi::new(nominal, window_px, window_px, array.dim());
    if window.is_empty() {
        return Err(not_found());
    }
    let mut sample = window.view(array).to_owned();
    let (min, max) = min_max(&sample.view());
    if max - min <= f64::EPSILON {
        return Err(not_found());
    }
    sample.mapv_inplace(|v| (v - min) / (max - min));

    let threshold = otsu_threshold(&sample.view());
    let mask = fill_holes(&apply_threshold(&sample.view(), threshold).view());
    let binary = mask.mapv(|m| if m { 1.0 } else { 0.0 });
    let labels = connected_components(&binary.view(), Connectivity::Eight);

    let (rows, cols) = sample.dim();
    let middle = (cols as f64 / 2.0, rows as f64 / 2.0);
    let l1 = |r: &RegionProps| (r.centroid.0 - middle.0).abs() + (r.centroid.1 - middle.1).abs();
    let chosen = region_props(&labels.view())
        .into_iter()
        .filter(|r| r.area > MIN_MARKER_AREA && r.eccentricity < MAX_MARKER_ECCENTRICITY)
        .min_by(|a, b| l1(a).total_cmp(&l1(b)))
        .ok_or_else(not_found)?;

    let region_mask = labels.mapv(|label| label == chosen.label);
    let centroid =
        compute_centroid_from_mask(&sample.view(), &region_mask.view()).ok_or_else(not_found)?;
    let (x0, y0) = window.top_left;
    let position = Point2::new(centroid.x + x0 as f64, centroid.y + y0 as f64);
    log::debug!("marker {name} at ({:.2}, {:.2})", position.x, position.y);
    Ok(position)
}

/// A detected marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerPosition {
    pub name: String,
    pub position: Point2<f64>,
}

/// Marker-based light/radiation analysis over an owned image.
#[derive(Debug)]
pub struct LightRadAnalyzer<I: ImageAdapter = PlanarImage> {
    image: I,
    definition: MarkerDefinition,
}

impl<I: ImageAdapter> LightRadAnalyzer<I> {
    pub fn new(image: I, definition: &MarkerDefinition) -> Self {
        Self {
            image,
            definition: *definition,
        }
    }

    pub fn image(&self) -> &I {
        &self.image
    }

    pub fn definition(&self) -> &MarkerDefinition {
        &self.definition
    }

    /// Correct polarity, find the markers and measure the field.
    pub fn analyze(&mut self, config: &LightRadConfig) -> Result<LightRadAnalysis, PlanarError> {
        config.validate()?;
        let def = self.definition;

        // Open fields leave the corners dark
        self.image.check_inversion(DEFAULT_INVERSION_BOX);
        if config.invert {
            self.image.invert();
        }

        let array = self.image.array();
        let dpmm = self.image.dpmm();
        let (cx, cy) = self.image.center();
        let image_center = Point2::new(cx, cy);

        let layout = match def.layouts {
            LayoutSelection::Fixed(layout) => layout,
            ref selection => {
                let (x_mm, y_mm) = center_line_widths(&array, dpmm, config.fwxm)?;
                log::debug!("center-line field widths x={x_mm:.1} mm, y={y_mm:.1} mm");
                select_layout(selection, x_mm, y_mm)?
            }
        };
        log::info!("{}: using {} marker layout", def.common_name, layout.name);

        // Markers are dark on the radiograph
        let bright_markers = inverted(&array);
        let window_px = def.window_mm * dpmm;
        let markers = layout
            .markers
            .iter()
            .map(|marker| {
                let nominal = image_center
                    + Vector2::new(marker.offset_mm.0, marker.offset_mm.1) * dpmm;
                detect_marker(&bright_markers.view(), marker.name, nominal, window_px, def.window_mm)
                    .map(|position| MarkerPosition {
                        name: marker.name.to_string(),
                        position,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let marker_center = match def.center {
            CenterStrategy::MarkerMean => {
                let sum = markers
                    .iter()
                    .fold(Vector2::zeros(), |acc, m| acc + m.position.coords);
                Point2::from(sum / markers.len() as f64)
            }
            CenterStrategy::VirtualCenter { marker, offset_mm } => {
                let anchor = markers
                    .iter()
                    .find(|m| m.name == marker)
                    .ok_or_else(|| PlanarError::MarkerNotFound {
                        name: marker.to_string(),
                        window_mm: def.window_mm,
                    })?;
                anchor.position - Vector2::new(offset_mm.0, offset_mm.1) * dpmm
            }
        };

        let field = measure_field(&array, dpmm, def.strip_width_mm, config.fwxm)?;
        log::info!(
            "field {:.1} x {:.1} mm centered at ({:.2}, {:.2})",
            field.width_x_mm,
            field.width_y_mm,
            field.center.x,
            field.center.y
        );

        Ok(LightRadAnalysis {
            common_name: def.common_name.to_string(),
            layout: layout.name.to_string(),
            dpmm,
            markers,
            marker_center,
            field,
            image_center,
        })
    }
}

/// Outcome of a light/radiation analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightRadAnalysis {
    pub common_name: String,
    pub layout: String,
    pub dpmm: f64,
    pub markers: Vec<MarkerPosition>,
    pub marker_center: Point2<f64>,
    pub field: FieldInfo,
    /// Geometric image center, the detector axis
    pub image_center: Point2<f64>,
}

impl LightRadAnalysis {
    /// Image center minus field center, mm.
    pub fn field_epid_offset_mm(&self) -> Vector2<f64> {
        (self.image_center - self.field.center) / self.dpmm
    }

    /// Marker center minus field center, mm.
    pub fn field_marker_offset_mm(&self) -> Vector2<f64> {
        (self.marker_center - self.field.center) / self.dpmm
    }

    pub fn results_data(&self) -> LightRadResult {
        let epid = self.field_epid_offset_mm();
        let marker = self.field_marker_offset_mm();
        LightRadResult {
            field_size_x_mm: self.field.width_x_mm,
            field_size_y_mm: self.field.width_y_mm,
            field_epid_offset_x_mm: epid.x,
            field_epid_offset_y_mm: epid.y,
            field_bb_offset_x_mm: marker.x,
            field_bb_offset_y_mm: marker.y,
        }
    }

    /// Human-readable summary.
    pub fn results(&self) -> String {
        let r = self.results_data();
        [
            format!("{} results:", self.common_name),
            format!("The detected inplane field size was {:.1}mm", r.field_size_y_mm),
            format!("The detected crossplane field size was {:.1}mm", r.field_size_x_mm),
            format!("The inplane field was {:.1}mm from the EPID CAX", r.field_epid_offset_y_mm),
            format!(
                "The crossplane field was {:.1}mm from the EPID CAX",
                r.field_epid_offset_x_mm
            ),
            format!(
                "The inplane field was {:.1}mm from the marker inplane center",
                r.field_bb_offset_y_mm
            ),
            format!(
                "The crossplane field was {:.1}mm from the marker crossplane center",
                r.field_bb_offset_x_mm
            ),
        ]
        .join("\n")
    }
}
