use crate::feed::Event;
use crate::prelude::{CycleContext, ProcessingStage, StageInput, StageMetadata, StageOutput};
use crate::telemetry::log::LogManager;

/// Cuts a newest-first working set at the first event ingested before `now - retention`.
///
/// Everything after that event is dropped without inspection, so an out-of-order
/// `ingest_ts` further up the list ends retention early.
pub fn truncate(mut events: Vec<Event>, now_us: i64, retention_us: i64) -> Vec<Event> {
    let cutoff = now_us.saturating_sub(retention_us);
    if let Some(at) = events.iter().position(|e| e.ingest_ts < cutoff) {
        events.truncate(at);
    }
    events
}

pub struct RetentionStage {
    logger: LogManager,
}

impl RetentionStage {
    pub fn new() -> Self {
        Self {
            logger: LogManager::new("retention"),
        }
    }
}

impl Default for RetentionStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for RetentionStage {
    fn name(&self) -> &'static str {
        "retention"
    }

    fn execute(&mut self, ctx: &CycleContext, input: StageInput) -> StageOutput {
        let before = input.events.len();
        let events = truncate(input.events, ctx.now_us, ctx.limits.retention_us);
        let dropped = before - events.len();
        if dropped > 0 {
            self.logger
                .record(&format!("dropped {} expired events, {} retained", dropped, events.len()));
        }

        StageOutput {
            events,
            metadata: StageMetadata {
                dropped,
                ..Default::default()
            },
        }
    }
}
