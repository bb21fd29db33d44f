use serde::{Deserialize, Serialize};

use crate::math::geo::{Bounds, LatLon};

/// Whether an event has already been through alert evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AlertState {
    #[default]
    Unalerted,
    Alerted,
}

/// Pipeline-owned metadata attached to each event.
///
/// The enrichment block is computed once on arrival; `time_ago` and `distance`
/// are refreshed every cycle; `alert_state` and `selected` persist across cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Derived {
    pub is_important: bool,
    pub is_tor_related: bool,
    pub parsed_dt: Option<String>,
    pub link: Option<String>,
    pub point: Option<LatLon>,
    pub bounds: Option<Bounds>,
    pub half_edge_distance: Option<f64>,
    pub time_ago: Option<String>,
    pub distance: Option<String>,
    pub selected: bool,
    pub alert_state: AlertState,
}
