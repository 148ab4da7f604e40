//! Flat result records for reporting and serialization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Serialize a record into a flat key-value map.
fn flatten<T: Serialize>(record: &T) -> Result<Map<String, Value>, serde_json::Error> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(<serde_json::Error as serde::de::Error>::custom(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// Summary of an outline-based phantom analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanarResult {
    pub analysis_type: String,
    pub median_contrast: f64,
    pub median_cnr: f64,
    pub num_contrast_rois_seen: usize,
    pub phantom_center_x_y: (f64, f64),
    /// Only present when a resolution model was supplied and the phantom
    /// has line-pair regions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtf_lp_mm: Option<MtfSummary>,
}

/// Spatial frequencies at which the relative MTF falls to 80, 50 and 30 %.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MtfSummary {
    pub mtf_80: Option<f64>,
    pub mtf_50: Option<f64>,
    pub mtf_30: Option<f64>,
}

impl PlanarResult {
    pub fn to_map(&self) -> Result<Map<String, Value>, serde_json::Error> {
        flatten(self)
    }
}

/// Summary of a light/radiation coincidence analysis. All values are mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightRadResult {
    pub field_size_x_mm: f64,
    pub field_size_y_mm: f64,
    /// Image center minus field center
    pub field_epid_offset_x_mm: f64,
    pub field_epid_offset_y_mm: f64,
    /// Marker center minus field center
    pub field_bb_offset_x_mm: f64,
    pub field_bb_offset_y_mm: f64,
}

impl LightRadResult {
    pub fn to_map(&self) -> Result<Map<String, Value>, serde_json::Error> {
        flatten(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planar() -> PlanarResult {
        PlanarResult {
            analysis_type: "Leeds".to_string(),
            median_contrast: 0.12,
            median_cnr: 3.5,
            num_contrast_rois_seen: 9,
            phantom_center_x_y: (512.0, 384.5),
            mtf_lp_mm: None,
        }
    }

    #[test]
    fn test_planar_map_skips_missing_mtf() {
        let map = planar().to_map().unwrap();
        assert_eq!(map["analysis_type"], "Leeds");
        assert_eq!(map["num_contrast_rois_seen"], 9);
        assert_eq!(map["phantom_center_x_y"][1], 384.5);
        assert!(!map.contains_key("mtf_lp_mm"));
    }

    #[test]
    fn test_planar_map_with_mtf() {
        let result = PlanarResult {
            mtf_lp_mm: Some(MtfSummary {
                mtf_80: Some(0.5),
                mtf_50: Some(0.8),
                mtf_30: None,
            }),
            ..planar()
        };
        let map = result.to_map().unwrap();
        assert_eq!(map["mtf_lp_mm"]["mtf_50"], 0.8);
        assert!(map["mtf_lp_mm"]["mtf_30"].is_null());
    }

    #[test]
    fn test_light_rad_map() {
        let result = LightRadResult {
            field_size_x_mm: 100.0,
            field_size_y_mm: 99.5,
            field_epid_offset_x_mm: 0.25,
            field_epid_offset_y_mm: -0.5,
            field_bb_offset_x_mm: 0.0,
            field_bb_offset_y_mm: 1.0,
        };
        let map = result.to_map().unwrap();
        assert_eq!(map.len(), 6);
        assert_eq!(map["field_size_y_mm"], 99.5);
        let back: LightRadResult = serde_json::from_value(Value::Object(map)).unwrap();
        assert_eq!(back, result);
    }
}
