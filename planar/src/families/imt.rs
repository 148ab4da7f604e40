//! IMT L-Rad light/radiation coincidence phantom.

use crate::light_rad::{CenterStrategy, LayoutSelection, Marker, MarkerDefinition, MarkerLayout};

static CENTER_ONLY: MarkerLayout = MarkerLayout {
    name: "center",
    markers: &[Marker::new("Center", 0.0, 0.0)],
};

pub static L_RAD: MarkerDefinition = MarkerDefinition {
    common_name: "IMT L-Rad",
    layouts: LayoutSelection::Fixed(&CENTER_ONLY),
    window_mm: 12.0,
    strip_width_mm: 5.0,
    center: CenterStrategy::MarkerMean,
};
