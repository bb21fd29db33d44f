use serde::{Deserialize, Serialize};
use swarecore::feed::Event;
use swarecore::math::LatLon;
use swarecore::prelude::Settings;
use swarecore::telemetry::PipelineCounters;

/// Read-only snapshot published after every refresh cycle.
#[derive(Debug, Clone, Serialize, Default)]
pub struct DisplayModel {
    pub events: Vec<Event>,
    pub clock: String,
    pub settings: Settings,
    pub observer: Option<LatLon>,
    pub counters: PipelineCounters,
}

/// Body of a manual-coordinates update.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualLocationBody {
    pub manual_lat: Option<f64>,
    pub manual_lon: Option<f64>,
}
