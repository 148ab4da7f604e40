//! Caller-facing analysis options.
//!
//! Both records deserialize from JSON with every field optional; missing
//! fields take the defaults listed on each field.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::contrast::ContrastMethod;
use crate::error::PlanarError;

/// Options for outline-based phantom analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Contrast above which a low-contrast ROI passes (default 0.05)
    pub low_contrast_threshold: f64,
    /// Relative modulation threshold carried on high-contrast ROIs (default 0.5)
    pub high_contrast_threshold: f64,
    /// Force an inversion after the automatic inversion check
    pub invert: bool,
    /// Phantom angle in degrees; bypasses angle detection
    pub angle_override: Option<f64>,
    /// Phantom center (x, y) in pixels; bypasses outline-based centering
    pub center_override: Option<(f64, f64)>,
    /// Phantom radius scale; bypasses outline-based sizing
    pub size_override: Option<f64>,
    /// Source-to-detector distance in mm used to scale the expected outline (default 1000)
    pub ssd_mm: f64,
    /// Contrast formula for low-contrast ROIs (default Michelson)
    pub low_contrast_method: ContrastMethod,
    /// Visibility above which a low-contrast ROI passes (default 100)
    pub visibility_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            low_contrast_threshold: 0.05,
            high_contrast_threshold: 0.5,
            invert: false,
            angle_override: None,
            center_override: None,
            size_override: None,
            ssd_mm: 1000.0,
            low_contrast_method: ContrastMethod::Michelson,
            visibility_threshold: 100.0,
        }
    }
}

impl AnalysisConfig {
    /// Read a JSON configuration file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PlanarError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make detection or metrics meaningless.
    pub fn validate(&self) -> Result<(), PlanarError> {
        let finite = [
            ("low_contrast_threshold", self.low_contrast_threshold),
            ("high_contrast_threshold", self.high_contrast_threshold),
            ("visibility_threshold", self.visibility_threshold),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(PlanarError::InvalidConfig(format!("{name} must be finite, got {value}")));
        }
        if !(self.ssd_mm.is_finite() && self.ssd_mm > 0.0) {
            return Err(PlanarError::InvalidConfig(format!(
                "ssd_mm must be positive, got {}",
                self.ssd_mm
            )));
        }
        if let Some(size) = self.size_override {
            if !(size.is_finite() && size > 0.0) {
                return Err(PlanarError::InvalidConfig(format!(
                    "size_override must be positive, got {size}"
                )));
            }
        }
        if let Some(angle) = self.angle_override {
            if !angle.is_finite() {
                return Err(PlanarError::InvalidConfig(format!(
                    "angle_override must be finite, got {angle}"
                )));
            }
        }
        if let Some((x, y)) = self.center_override {
            if !(x.is_finite() && y.is_finite()) {
                return Err(PlanarError::InvalidConfig(format!(
                    "center_override must be finite, got ({x}, {y})"
                )));
            }
        }
        Ok(())
    }
}

/// Options for marker-based light/radiation field analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightRadConfig {
    /// Force an inversion after the corner inversion check
    pub invert: bool,
    /// Percentage of maximum at which field edges are measured (default 50)
    pub fwxm: f64,
}

impl Default for LightRadConfig {
    fn default() -> Self {
        Self {
            invert: false,
            fwxm: 50.0,
        }
    }
}

impl LightRadConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PlanarError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PlanarError> {
        if !(self.fwxm > 0.0 && self.fwxm < 100.0) {
            return Err(PlanarError::InvalidConfig(format!(
                "fwxm must lie in (0, 100), got {}",
                self.fwxm
            )));
        }
        Ok(())
    }
}
