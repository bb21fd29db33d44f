use crate::feed::Event;
use crate::math::geo::{GeoHelper, LatLon};
use crate::math::time::TimeHelper;
use crate::prelude::{CycleContext, ProcessingStage, StageInput, StageOutput};

/// Refreshes the presentation-relative fields: age bucket and live distance.
pub fn massage(mut event: Event, now_us: i64, observer: Option<LatLon>) -> Event {
    event.derived.time_ago = Some(TimeHelper::time_ago(now_us, event.ingest_ts));
    event.derived.distance = match (observer, event.point()) {
        (Some(observer), Some(point)) => {
            Some(format!("{}mi", GeoHelper::distance_miles(observer, point)))
        }
        _ => None,
    };
    event
}

#[derive(Default)]
pub struct MassageStage;

impl MassageStage {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessingStage for MassageStage {
    fn name(&self) -> &'static str {
        "massage"
    }

    fn execute(&mut self, ctx: &CycleContext, input: StageInput) -> StageOutput {
        StageOutput {
            events: input
                .events
                .into_iter()
                .map(|event| massage(event, ctx.now_us, ctx.observer))
                .collect(),
            ..Default::default()
        }
    }
}
