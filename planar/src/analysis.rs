//! Shared analysis of outline-based phantoms.
//!
//! Every family runs the same sequence; only the hooks and tables of its
//! [`PhantomDefinition`] differ:
//!
//! 1. inversion check, then the caller's forced invert
//! 2. direction check (may mirror the image)
//! 3. geometry: center and radius from the outline, angle per family
//! 4. high-contrast sampling
//! 5. background sampling, whose mean median is the contrast reference
//! 6. low-contrast sampling against that reference
//!
//! The detected outline is cached against the image generation and the
//! distance setting, so any mutation forces a fresh detection.

use imaging::algo::stats;
use imaging::image_proc::detection::RegionProps;
use imaging::image_proc::image::DEFAULT_INVERSION_BOX;
use imaging::image_proc::{ImageAdapter, PlanarImage};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::contrast::SeenCriterion;
use crate::error::PlanarError;
use crate::geometry::{
    fiducial_angle, principal_axis_angle, region_center, region_radius, AngleStrategy,
    GeometryOverrides, PhantomGeometry,
};
use crate::orientation::{percentile_inversion_needed, DirectionCheck, InversionCheck};
use crate::outline::{
    detect_candidates, expected_bbox_area, select_phantom_region, DetectionContext, Outline,
};
use crate::registry::PhantomDefinition;
use crate::resolution::{self, ResolutionModel};
use crate::result::PlanarResult;
use crate::roi::{
    sample_high_contrast, DiskRoi, HighContrastSample, LowContrastCriteria,
    LowContrastMeasurement, LowContrastRoi, RoiStats,
};

#[derive(Debug, Clone)]
struct CachedRegion {
    generation: u64,
    ssd_mm: f64,
    region: RegionProps,
}

/// Runs the shared analysis over an owned image.
///
/// The analyzer owns the image for the whole call; orientation corrections
/// mutate it in place.
#[derive(Debug)]
pub struct PlanarAnalyzer<I: ImageAdapter = PlanarImage> {
    image: I,
    definition: PhantomDefinition,
    region: Option<CachedRegion>,
}

impl<I: ImageAdapter> PlanarAnalyzer<I> {
    /// Take ownership of `image`, grounding and normalizing it first when
    /// `normalize` is set.
    pub fn new(mut image: I, definition: &PhantomDefinition, normalize: bool) -> Self {
        if normalize {
            image.ground();
            image.normalize();
        }
        Self {
            image,
            definition: *definition,
            region: None,
        }
    }

    pub fn image(&self) -> &I {
        &self.image
    }

    pub fn definition(&self) -> &PhantomDefinition {
        &self.definition
    }

    pub fn into_image(self) -> I {
        self.image
    }

    /// The detected phantom outline.
    ///
    /// Detection reruns whenever the image changed or the distance setting
    /// differs from the cached one.
    pub fn phantom_region(&mut self, ssd_mm: f64) -> Result<RegionProps, PlanarError> {
        let generation = self.image.generation();
        if let Some(cached) = &self.region {
            if cached.generation == generation && cached.ssd_mm == ssd_mm {
                return Ok(cached.region.clone());
            }
        }

        let def = &self.definition;
        let ctx = DetectionContext {
            image_center: self.image.center(),
            expected_bbox_area: expected_bbox_area(def.bbox_size_mm2, self.image.dpmm(), ssd_mm),
        };
        let candidates = detect_candidates(&self.image.array(), &def.canny);
        let region = select_phantom_region(candidates, def.detection, &ctx)?;
        self.region = Some(CachedRegion {
            generation,
            ssd_mm,
            region: region.clone(),
        });
        Ok(region)
    }

    /// Center and radius, detecting the outline only when one of them is
    /// not overridden.
    fn center_and_radius(
        &mut self,
        overrides: &GeometryOverrides,
        ssd_mm: f64,
    ) -> Result<(Point2<f64>, f64), PlanarError> {
        match (overrides.center, overrides.radius) {
            (Some(center), Some(radius)) => Ok((center, radius)),
            (center, radius) => {
                let region = self.phantom_region(ssd_mm)?;
                let scale = self.definition.radius_scale;
                Ok((
                    center.unwrap_or_else(|| region_center(&region)),
                    radius.unwrap_or_else(|| region_radius(&region, scale)),
                ))
            }
        }
    }

    fn check_inversion(&mut self, ssd_mm: f64) -> Result<(), PlanarError> {
        match self.definition.hooks.inversion {
            InversionCheck::None => {}
            InversionCheck::Corners => {
                self.image.check_inversion(DEFAULT_INVERSION_BOX);
            }
            InversionCheck::PhantomPercentiles => {
                let region = self.phantom_region(ssd_mm)?;
                if percentile_inversion_needed(&self.image.array(), &region.bbox)? {
                    log::info!("dark tail inside the phantom outline; inverting");
                    self.image.invert();
                }
            }
        }
        Ok(())
    }

    /// Resolve the phantom placement, honoring every override.
    pub fn resolve_geometry(
        &mut self,
        overrides: &GeometryOverrides,
        ssd_mm: f64,
    ) -> Result<PhantomGeometry, PlanarError> {
        let (center, radius) = self.center_and_radius(overrides, ssd_mm)?;
        let angle = match (overrides.angle, self.definition.hooks.angle) {
            (Some(angle), _) => angle,
            (None, AngleStrategy::Fixed(angle)) => angle,
            (None, AngleStrategy::Fiducial(probe)) => {
                fiducial_angle(&self.image.array(), center, radius, &probe)?
            }
            (None, AngleStrategy::PrincipalAxis(constraint)) => {
                let region = self.phantom_region(ssd_mm)?;
                principal_axis_angle(&region, &constraint)?
            }
        };
        let geometry = PhantomGeometry {
            center,
            radius,
            angle,
        };
        log::debug!(
            "{}: center ({:.2}, {:.2}), radius {:.3}, angle {:.2}°",
            self.definition.common_name,
            center.x,
            center.y,
            radius,
            angle
        );
        Ok(geometry)
    }

    /// Correct orientation, resolve geometry and sample every region.
    pub fn analyze(&mut self, config: &AnalysisConfig) -> Result<PlanarAnalysis, PlanarError> {
        config.validate()?;
        let overrides = GeometryOverrides::from_config(config);
        let hooks = self.definition.hooks;

        self.check_inversion(config.ssd_mm)?;
        if config.invert {
            self.image.invert();
        }
        if !matches!(hooks.direction, DirectionCheck::None) {
            let (center, radius) = self.center_and_radius(&overrides, config.ssd_mm)?;
            hooks.direction.apply(&mut self.image, center, radius)?;
        }

        let geometry = self.resolve_geometry(&overrides, config.ssd_mm)?;
        let def = &self.definition;
        let array = self.image.array();

        let high_contrast = def
            .high_contrast
            .iter()
            .filter_map(|d| d.lp_mm.map(|lp_mm| (d, lp_mm)))
            .map(|(d, lp_mm)| {
                let disk = DiskRoi::from_descriptor(array.view(), d, &geometry);
                sample_high_contrast(&disk, lp_mm, config.high_contrast_threshold)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let background = def
            .background
            .iter()
            .map(|d| {
                let disk = DiskRoi::from_descriptor(array.view(), d, &geometry);
                let center = disk.center();
                Ok(BackgroundSample {
                    name: d.name.to_string(),
                    center: (center.x, center.y),
                    radius: disk.radius(),
                    stats: *disk.stats()?,
                })
            })
            .collect::<Result<Vec<_>, PlanarError>>()?;
        let medians: Vec<f64> = background.iter().map(|b| b.stats.median).collect();
        let background_value = stats::mean(&medians).ok();

        let low_contrast = match background_value {
            Some(reference) => {
                let criteria = LowContrastCriteria {
                    method: config.low_contrast_method,
                    contrast_threshold: config.low_contrast_threshold,
                    visibility_threshold: config.visibility_threshold,
                };
                def.low_contrast
                    .iter()
                    .map(|d| {
                        let disk = DiskRoi::from_descriptor(array.view(), d, &geometry);
                        LowContrastRoi::new(disk, reference, criteria).measure()
                    })
                    .collect::<Result<Vec<_>, _>>()?
            }
            None if def.low_contrast.is_empty() => Vec::new(),
            None => {
                return Err(PlanarError::InvalidConfig(format!(
                    "{} has low-contrast regions but no background regions to reference",
                    def.common_name
                )))
            }
        };

        let outline = def.outline.map(|shape| shape.place(&geometry));
        if outline.is_none() {
            log::warn!("{} has no outline to display", def.common_name);
        }

        Ok(PlanarAnalysis {
            common_name: def.common_name.to_string(),
            geometry,
            seen_criterion: hooks.seen,
            high_contrast,
            background,
            background_value,
            low_contrast,
            outline,
        })
    }
}

/// A sampled background region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundSample {
    pub name: String,
    pub center: (f64, f64),
    pub radius: f64,
    pub stats: RoiStats,
}

/// Immutable outcome of one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanarAnalysis {
    pub common_name: String,
    pub geometry: PhantomGeometry,
    pub seen_criterion: SeenCriterion,
    /// Line-pair samples in descriptor order
    pub high_contrast: Vec<HighContrastSample>,
    pub background: Vec<BackgroundSample>,
    /// Mean of the background medians
    pub background_value: Option<f64>,
    pub low_contrast: Vec<LowContrastMeasurement>,
    pub outline: Option<Outline>,
}

fn median_or_nan(values: &[f64]) -> f64 {
    stats::median(values).unwrap_or(f64::NAN)
}

impl PlanarAnalysis {
    /// Median low-contrast contrast, NaN without low-contrast regions.
    pub fn median_contrast(&self) -> f64 {
        let values: Vec<f64> = self.low_contrast.iter().map(|m| m.contrast).collect();
        median_or_nan(&values)
    }

    /// Median low-contrast CNR, NaN without low-contrast regions.
    pub fn median_cnr(&self) -> f64 {
        let values: Vec<f64> = self.low_contrast.iter().map(|m| m.cnr).collect();
        median_or_nan(&values)
    }

    pub fn is_seen(&self, measurement: &LowContrastMeasurement) -> bool {
        match self.seen_criterion {
            SeenCriterion::Contrast => measurement.passed_contrast,
            SeenCriterion::Visibility => measurement.passed_visibility,
        }
    }

    pub fn num_seen(&self) -> usize {
        self.low_contrast.iter().filter(|m| self.is_seen(m)).count()
    }

    /// Flat result record. The MTF triplet is filled only when a model is
    /// given and the phantom has line-pair regions.
    pub fn results_data(&self, model: Option<&dyn ResolutionModel>) -> PlanarResult {
        let mtf_lp_mm = model
            .filter(|_| !self.high_contrast.is_empty())
            .map(|m| resolution::summarize(m, &self.high_contrast));
        PlanarResult {
            analysis_type: self.common_name.clone(),
            median_contrast: self.median_contrast(),
            median_cnr: self.median_cnr(),
            num_contrast_rois_seen: self.num_seen(),
            phantom_center_x_y: (self.geometry.center.x, self.geometry.center.y),
            mtf_lp_mm,
        }
    }

    /// Human-readable summary.
    pub fn results(&self, model: Option<&dyn ResolutionModel>) -> String {
        let data = self.results_data(model);
        let mut lines = vec![format!("{} results:", self.common_name)];
        if !self.low_contrast.is_empty() {
            lines.push(format!("Median Contrast: {:.2}", data.median_contrast));
            lines.push(format!("Median CNR: {:.1}", data.median_cnr));
            lines.push(format!(
                "# Low contrast ROIs \"seen\": {} of {}",
                data.num_contrast_rois_seen,
                self.low_contrast.len()
            ));
        }
        if let Some(mtf) = data.mtf_lp_mm {
            let fmt = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"));
            lines.push(format!("MTF 80% (lp/mm): {}", fmt(mtf.mtf_80)));
            lines.push(format!("MTF 50% (lp/mm): {}", fmt(mtf.mtf_50)));
            lines.push(format!("MTF 30% (lp/mm): {}", fmt(mtf.mtf_30)));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{HookSet, DEFAULT_CANNY, STANDARD_DETECTION};
    use crate::resolution::tests::LinearModel;
    use crate::roi::RoiDescriptor as R;
    use approx::assert_relative_eq;
    use imaging::image_proc::test_patterns::{draw_disk, draw_rectangle};
    use ndarray::Array2;

    const BACKGROUND: [R; 4] = [
        R::disk("bg 1", 0.0, 0.5, 0.1),
        R::disk("bg 2", 90.0, 0.5, 0.1),
        R::disk("bg 3", 180.0, 0.5, 0.1),
        R::disk("bg 4", 270.0, 0.5, 0.1),
    ];
    const LOW_CONTRAST: [R; 1] = [R::disk("roi 1", 0.0, 0.0, 0.1)];
    const HIGH_CONTRAST: [R; 1] = [R::resolution("lp 1", 45.0, 0.5, 0.1, 0.5)];

    static SQUARE: PhantomDefinition = PhantomDefinition {
        common_name: "Square",
        bbox_size_mm2: 40_000.0,
        detection: STANDARD_DETECTION,
        canny: DEFAULT_CANNY,
        radius_scale: 0.5,
        outline: None,
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

    fn square_phantom() -> PlanarImage {
        let mut image = Array2::from_elem((400, 400), 0.2);
        draw_rectangle(&mut image, (199.5, 199.5), 200.0, 200.0, 0.5);
        draw_disk(&mut image, (199.5, 199.5), 20.0, 0.8);
        PlanarImage::new(image, 1.0).unwrap()
    }

    #[test]
    fn test_full_overrides_skip_detection() {
        // Nothing to detect: only the overrides can place the regions
        let mut image = Array2::from_elem((200, 200), 0.5);
        draw_disk(&mut image, (60.0, 80.0), 6.0, 0.8);
        let image = PlanarImage::new(image, 1.0).unwrap();
        let config = AnalysisConfig {
            center_override: Some((60.0, 80.0)),
            size_override: Some(40.0),
            angle_override: Some(10.0),
            ..AnalysisConfig::default()
        };
        let analysis = PlanarAnalyzer::new(image, &SQUARE, false)
            .analyze(&config)
            .unwrap();
        assert_eq!(analysis.geometry.center, Point2::new(60.0, 80.0));
        assert_eq!(analysis.geometry.radius, 40.0);
        assert_eq!(analysis.geometry.angle, 10.0);
        assert_eq!(analysis.background_value, Some(0.5));
        assert_relative_eq!(analysis.median_contrast(), 0.3 / 1.3, epsilon = 1e-12);
    }

    #[test]
    fn test_partial_override_keeps_detected_radius() {
        let config = AnalysisConfig {
            center_override: Some((190.0, 210.0)),
            ..AnalysisConfig::default()
        };
        let analysis = PlanarAnalyzer::new(square_phantom(), &SQUARE, false)
            .analyze(&config)
            .unwrap();
        assert_eq!(analysis.geometry.center, Point2::new(190.0, 210.0));
        // About sqrt(202²)·0.5
        assert!((analysis.geometry.radius - 101.0).abs() < 2.0);
    }

    #[test]
    fn test_region_cache_follows_generation() {
        let mut analyzer = PlanarAnalyzer::new(square_phantom(), &SQUARE, false);
        let first = analyzer.phantom_region(1000.0).unwrap();
        assert_eq!(analyzer.region.as_ref().unwrap().generation, 0);
        assert_eq!(analyzer.phantom_region(1000.0).unwrap(), first);

        analyzer.image.fliplr();
        let again = analyzer.phantom_region(1000.0).unwrap();
        assert_eq!(analyzer.region.as_ref().unwrap().generation, 1);
        assert_eq!(again.bbox_area(), first.bbox_area());
    }

    #[test]
    fn test_wrong_distance_is_detection_error() {
        let config = AnalysisConfig {
            ssd_mm: 1500.0,
            ..AnalysisConfig::default()
        };
        let err = PlanarAnalyzer::new(square_phantom(), &SQUARE, false)
            .analyze(&config)
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Detection);
    }

    #[test]
    fn test_results_text_and_mtf() {
        let analysis = PlanarAnalyzer::new(square_phantom(), &SQUARE, false)
            .analyze(&AnalysisConfig::default())
            .unwrap();
        assert_eq!(analysis.high_contrast.len(), 1);
        assert!(analysis.outline.is_none());

        let plain = analysis.results_data(None);
        assert!(plain.mtf_lp_mm.is_none());
        let with_model = analysis.results_data(Some(&LinearModel));
        assert_eq!(with_model.mtf_lp_mm.unwrap().mtf_50, Some(0.5));

        let text = analysis.results(Some(&LinearModel));
        assert!(text.starts_with("Square results:"));
        assert!(text.contains("# Low contrast ROIs \"seen\": 1 of 1"));
        assert!(text.contains("MTF 50% (lp/mm): 0.50"));
    }

    #[test]
    fn test_empty_low_contrast_medians_are_nan() {
        let analysis = PlanarAnalysis {
            common_name: "none".to_string(),
            geometry: PhantomGeometry {
                center: Point2::new(0.0, 0.0),
                radius: 1.0,
                angle: 0.0,
            },
            seen_criterion: SeenCriterion::Contrast,
            high_contrast: Vec::new(),
            background: Vec::new(),
            background_value: None,
            low_contrast: Vec::new(),
            outline: None,
        };
        assert!(analysis.median_contrast().is_nan());
        assert!(analysis.median_cnr().is_nan());
        assert_eq!(analysis.num_seen(), 0);
        assert_eq!(analysis.results(None), "none results:");
    }
}
