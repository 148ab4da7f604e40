use imaging::algo::stats::StatsError;
use imaging::image_proc::profile::ProfileError;
use imaging::image_proc::ImageError;
use thiserror::Error;

/// Broad category of a failure, for callers deciding how to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No phantom or fiducial could be found.
    Detection,
    /// A geometric sanity check failed.
    Geometry,
    /// An expected marker was absent from its sampling window.
    Marker,
    /// The caller supplied an unusable configuration.
    Config,
    /// Reading configuration or image data failed.
    Io,
}

/// Errors produced by phantom analysis.
///
/// All are fatal to the current call; supply overrides or adjust the
/// configuration and analyze again.
#[derive(Error, Debug)]
pub enum PlanarError {
    /// No candidate region passed every detection predicate.
    #[error(
        "unable to find the phantom in the image ({candidates} candidate regions examined). \
         Check that the distance (SSD) setting is correct, that the phantom is centered \
         along the beam axis, and that it is not clipped by the edge of the field"
    )]
    PhantomNotFound {
        /// Number of edge regions examined.
        candidates: usize,
    },

    /// The angular fiducial did not show up on its circular profile.
    #[error("no angular fiducial found on the circular profile at radius {radius:.1} px")]
    FiducialNotFound {
        /// Profile radius in pixels.
        radius: f64,
    },

    /// Principal-axis angle is not near any canonical angle.
    #[error(
        "phantom angle {measured:.1}° is not within {tolerance}° of any of {canonical:?}; \
         realign the phantom or pass an angle override"
    )]
    AngleOutOfTolerance {
        /// Measured angle in degrees.
        measured: f64,
        /// Accepted angles in degrees.
        canonical: Vec<f64>,
        /// Allowed deviation in degrees.
        tolerance: f64,
    },

    /// Field widths measured along x and y disagree.
    #[error("field widths disagree: x={x_mm:.1} mm, y={y_mm:.1} mm (tolerance {tolerance_mm} mm)")]
    FieldWidthMismatch {
        /// Width along x in mm.
        x_mm: f64,
        /// Width along y in mm.
        y_mm: f64,
        /// Allowed difference in mm.
        tolerance_mm: f64,
    },

    /// The open field could not be measured on one axis.
    #[error("could not measure the field along the {axis} axis: {source}")]
    FieldNotFound {
        /// "x" or "y".
        axis: &'static str,
        #[source]
        source: ProfileError,
    },

    /// A fiducial marker was not found in its sampling window.
    #[error("did not find the {name} marker in its {window_mm} mm sampling window")]
    MarkerNotFound {
        /// Marker name from the layout table.
        name: String,
        /// Window side in mm.
        window_mm: f64,
    },

    /// Caller configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A sampling region produced no usable pixels.
    #[error("ROI {name} has no pixels inside the image")]
    EmptyRoi {
        /// Descriptor name.
        name: String,
        #[source]
        source: StatsError,
    },

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl PlanarError {
    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlanarError::PhantomNotFound { .. }
            | PlanarError::FiducialNotFound { .. }
            | PlanarError::EmptyRoi { .. } => ErrorKind::Detection,
            PlanarError::AngleOutOfTolerance { .. }
            | PlanarError::FieldWidthMismatch { .. }
            | PlanarError::FieldNotFound { .. } => ErrorKind::Geometry,
            PlanarError::MarkerNotFound { .. } => ErrorKind::Marker,
            PlanarError::InvalidConfig(_) | PlanarError::Image(_) | PlanarError::Json(_) => {
                ErrorKind::Config
            }
            PlanarError::Io(_) => ErrorKind::Io,
        }
    }
}
