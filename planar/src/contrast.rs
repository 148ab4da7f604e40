//! Contrast, noise and visibility metrics for low-contrast sampling regions.
//!
//! With `v` the ROI median and `r` the reference (background) value:
//!
//! | method    | contrast          |
//! |-----------|-------------------|
//! | Michelson | `|v − r| / (v + r)` |
//! | Weber     | `|v − r| / r`       |
//! | Ratio     | `v / r`             |
//!
//! Visibility follows the Rose model, `contrast · sqrt(π·radius²) / std`.
//! It is a perceptual detectability figure and is only meaningful for
//! low-contrast regions.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Formula used to turn a ROI value and reference into a contrast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContrastMethod {
    #[default]
    Michelson,
    Weber,
    Ratio,
}

impl ContrastMethod {
    pub fn contrast(self, value: f64, reference: f64) -> f64 {
        match self {
            ContrastMethod::Michelson => (value - reference).abs() / (value + reference),
            ContrastMethod::Weber => (value - reference).abs() / reference,
            ContrastMethod::Ratio => value / reference,
        }
    }
}

impl std::fmt::Display for ContrastMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ContrastMethod::Michelson => "Michelson",
            ContrastMethod::Weber => "Weber",
            ContrastMethod::Ratio => "Ratio",
        };
        f.write_str(name)
    }
}

/// Contrast-to-noise ratio.
pub fn cnr(contrast: f64, std: f64) -> f64 {
    contrast / std
}

/// Signal-to-noise ratio.
pub fn snr(value: f64, std: f64) -> f64 {
    value / std
}

/// Rose-model visibility of a disk of `radius` pixels.
pub fn visibility(contrast: f64, radius: f64, std: f64) -> f64 {
    contrast * (PI * radius * radius).sqrt() / std
}

/// Which pass predicate decides whether a low-contrast ROI counts as seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeenCriterion {
    /// Contrast above the low-contrast threshold
    Contrast,
    /// Visibility above the visibility threshold
    Visibility,
}
