//! Seam to the external resolution-curve (MTF) component.
//!
//! The analysis only samples the extremes of each line-pair region; turning
//! them into a modulation transfer curve is left to an implementation of
//! [`ResolutionModel`].

use crate::result::MtfSummary;
use crate::roi::HighContrastSample;

/// Relative resolution from high-contrast samples.
pub trait ResolutionModel {
    /// Spatial frequency (lp/mm) at which the relative modulation falls to
    /// `percent`, or `None` when it never does within the samples.
    fn relative_resolution(&self, samples: &[HighContrastSample], percent: f64) -> Option<f64>;
}

/// Query a model at the three reported MTF levels.
pub fn summarize(model: &dyn ResolutionModel, samples: &[HighContrastSample]) -> MtfSummary {
    MtfSummary {
        mtf_80: model.relative_resolution(samples, 80.0),
        mtf_50: model.relative_resolution(samples, 50.0),
        mtf_30: model.relative_resolution(samples, 30.0),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Frequency equal to `percent / 100`, for checking plumbing only.
    pub(crate) struct LinearModel;

    impl ResolutionModel for LinearModel {
        fn relative_resolution(&self, samples: &[HighContrastSample], percent: f64) -> Option<f64> {
            (!samples.is_empty()).then_some(percent / 100.0)
        }
    }

    fn sample(lp_mm: f64) -> HighContrastSample {
        HighContrastSample {
            name: "roi".to_string(),
            center: (0.0, 0.0),
            radius: 1.0,
            lp_mm,
            max: 1.0,
            min: 0.0,
            contrast_threshold: 0.5,
        }
    }

    #[test]
    fn test_summarize_queries_each_level() {
        let summary = summarize(&LinearModel, &[sample(0.5), sample(1.0)]);
        assert_eq!(summary.mtf_80, Some(0.8));
        assert_eq!(summary.mtf_50, Some(0.5));
        assert_eq!(summary.mtf_30, Some(0.3));
        assert_eq!(summarize(&LinearModel, &[]).mtf_50, None);
    }
}
