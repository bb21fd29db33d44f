use crate::feed::{Event, EventType};
use crate::math::geo::{GeoHelper, LatLon};
use crate::prelude::{
    CycleContext, PipelineLimits, ProcessingStage, StageInput, StageMetadata, StageOutput, Toggles,
};

/// Chase-mode proximity check.
///
/// A reported point is held to `max_miles`; a polygon-only event gets its half-diagonal
/// as extra margin. Events with nothing to measure, or no observer, pass.
fn within_chase_range(event: &Event, observer: Option<LatLon>, max_miles: f64) -> bool {
    let Some(observer) = observer else {
        return true;
    };
    if let Some(point) = event.point() {
        return f64::from(GeoHelper::distance_miles(observer, point)) <= max_miles;
    }
    match (event.derived.point, event.derived.half_edge_distance) {
        (Some(center), Some(margin)) => {
            f64::from(GeoHelper::distance_miles(observer, center)) <= max_miles + margin
        }
        _ => true,
    }
}

/// Whether `event` belongs in the display view. Filters AND together.
pub fn include(
    event: &Event,
    observer: Option<LatLon>,
    toggles: &Toggles,
    limits: &PipelineLimits,
) -> bool {
    if toggles.chase_mode && !within_chase_range(event, observer, limits.chase_distance_miles) {
        return false;
    }
    if toggles.hide_afds && event.event_type == EventType::NwsAfd {
        return false;
    }
    true
}

#[derive(Default)]
pub struct FilterStage;

impl FilterStage {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessingStage for FilterStage {
    fn name(&self) -> &'static str {
        "filter"
    }

    fn execute(&mut self, ctx: &CycleContext, input: StageInput) -> StageOutput {
        let total = input.events.len();
        let events: Vec<Event> = input
            .events
            .into_iter()
            .filter(|event| include(event, ctx.observer, &ctx.settings.toggles, &ctx.limits))
            .collect();

        StageOutput {
            metadata: StageMetadata {
                dropped: total - events.len(),
                ..Default::default()
            },
            events,
        }
    }
}
