//! Phantom families: configuration records composed with hook selections.
//!
//! Every outline-based family is an immutable [`PhantomDefinition`] that the
//! shared analysis in [`crate::analysis`] runs over. Marker-based families
//! are [`MarkerDefinition`]s consumed by [`crate::light_rad`].

use std::fmt;
use std::str::FromStr;

use imaging::image_proc::edges::CannySettings;

use crate::contrast::SeenCriterion;
use crate::error::PlanarError;
use crate::families;
use crate::geometry::AngleStrategy;
use crate::light_rad::MarkerDefinition;
use crate::orientation::{DirectionCheck, InversionCheck};
use crate::outline::{DetectionCondition, OutlineShape};
use crate::roi::RoiDescriptor;

/// Canny settings shared by most families.
pub const DEFAULT_CANNY: CannySettings = CannySettings {
    sigma: 2.0,
    low_quantile: 0.001,
    high_quantile: 0.01,
};

/// Centered and right-sized.
pub const STANDARD_DETECTION: &[DetectionCondition] =
    &[DetectionCondition::CENTERED, DetectionCondition::RIGHT_SIZE];

/// Per-family overrides of the shared algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HookSet {
    pub angle: AngleStrategy,
    pub inversion: InversionCheck,
    pub direction: DirectionCheck,
    pub seen: SeenCriterion,
}

/// Immutable configuration of an outline-based phantom family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhantomDefinition {
    pub common_name: &'static str,
    /// Outline bounding-box area at the nominal distance, mm²
    pub bbox_size_mm2: f64,
    pub detection: &'static [DetectionCondition],
    pub canny: CannySettings,
    /// Radius is `sqrt(bbox_area) · radius_scale`
    pub radius_scale: f64,
    pub outline: Option<OutlineShape>,
    /// Line-pair regions in order of increasing frequency
    pub high_contrast: &'static [RoiDescriptor],
    pub low_contrast: &'static [RoiDescriptor],
    /// Regions averaged into the low-contrast reference
    pub background: &'static [RoiDescriptor],
    pub hooks: HookSet,
}

/// A family's configuration, by analysis kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FamilyDefinition {
    Outline(&'static PhantomDefinition),
    Marker(&'static MarkerDefinition),
}

/// Every supported phantom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhantomFamily {
    LeedsTor,
    LeedsTorBlue,
    StandardImagingQc3,
    StandardImagingQcKv,
    LasVegas,
    DoselabMc2Kv,
    DoselabMc2Mv,
    SncKv,
    SncMv,
    PtwEpidQc,
    StandardImagingFc2,
    ImtLRad,
    SncFsqa,
}

impl PhantomFamily {
    pub const ALL: [PhantomFamily; 13] = [
        PhantomFamily::LeedsTor,
        PhantomFamily::LeedsTorBlue,
        PhantomFamily::StandardImagingQc3,
        PhantomFamily::StandardImagingQcKv,
        PhantomFamily::LasVegas,
        PhantomFamily::DoselabMc2Kv,
        PhantomFamily::DoselabMc2Mv,
        PhantomFamily::SncKv,
        PhantomFamily::SncMv,
        PhantomFamily::PtwEpidQc,
        PhantomFamily::StandardImagingFc2,
        PhantomFamily::ImtLRad,
        PhantomFamily::SncFsqa,
    ];

    pub fn definition(self) -> FamilyDefinition {
        use FamilyDefinition::{Marker, Outline};
        match self {
            PhantomFamily::LeedsTor => Outline(&families::leeds::LEEDS_TOR),
            PhantomFamily::LeedsTorBlue => Outline(&families::leeds::LEEDS_TOR_BLUE),
            PhantomFamily::StandardImagingQc3 => Outline(&families::standard_imaging::QC3),
            PhantomFamily::StandardImagingQcKv => Outline(&families::standard_imaging::QC_KV),
            PhantomFamily::LasVegas => Outline(&families::las_vegas::LAS_VEGAS),
            PhantomFamily::DoselabMc2Kv => Outline(&families::doselab::MC2_KV),
            PhantomFamily::DoselabMc2Mv => Outline(&families::doselab::MC2_MV),
            PhantomFamily::SncKv => Outline(&families::snc::KV_QA),
            PhantomFamily::SncMv => Outline(&families::snc::MV_QA),
            PhantomFamily::PtwEpidQc => Outline(&families::ptw::EPID_QC),
            PhantomFamily::StandardImagingFc2 => Marker(&families::standard_imaging::FC2),
            PhantomFamily::ImtLRad => Marker(&families::imt::L_RAD),
            PhantomFamily::SncFsqa => Marker(&families::snc::FSQA),
        }
    }

    /// Name used in reports.
    pub fn common_name(self) -> &'static str {
        match self.definition() {
            FamilyDefinition::Outline(def) => def.common_name,
            FamilyDefinition::Marker(def) => def.common_name,
        }
    }

    /// Short identifier accepted on the command line.
    pub fn id(self) -> &'static str {
        match self {
            PhantomFamily::LeedsTor => "leeds",
            PhantomFamily::LeedsTorBlue => "leeds-blue",
            PhantomFamily::StandardImagingQc3 => "qc3",
            PhantomFamily::StandardImagingQcKv => "qckv",
            PhantomFamily::LasVegas => "las-vegas",
            PhantomFamily::DoselabMc2Kv => "mc2-kv",
            PhantomFamily::DoselabMc2Mv => "mc2-mv",
            PhantomFamily::SncKv => "snc-kv",
            PhantomFamily::SncMv => "snc-mv",
            PhantomFamily::PtwEpidQc => "ptw-epid-qc",
            PhantomFamily::StandardImagingFc2 => "fc2",
            PhantomFamily::ImtLRad => "imt-lrad",
            PhantomFamily::SncFsqa => "snc-fsqa",
        }
    }
}

impl fmt::Display for PhantomFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.common_name())
    }
}

impl FromStr for PhantomFamily {
    type Err = PlanarError;

    /// Accepts the short identifier or the common name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PhantomFamily::ALL
            .into_iter()
            .find(|f| f.id().eq_ignore_ascii_case(wanted) || f.common_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let known: Vec<&str> = PhantomFamily::ALL.iter().map(|f| f.id()).collect();
                PlanarError::InvalidConfig(format!(
                    "unknown phantom {wanted:?}; expected one of {}",
                    known.join(", ")
                ))
            })
    }
}
