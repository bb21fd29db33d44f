use crate::alert::build_alert;
use crate::prelude::{CycleContext, ProcessingStage, StageInput, StageMetadata, StageOutput};
use crate::telemetry::log::LogManager;

/// Latches every unalerted event and collects the resulting intents in working-set order.
pub struct AlertStage {
    logger: LogManager,
}

impl AlertStage {
    pub fn new() -> Self {
        Self {
            logger: LogManager::new("alert"),
        }
    }
}

impl Default for AlertStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for AlertStage {
    fn name(&self) -> &'static str {
        "alert"
    }

    fn execute(&mut self, _ctx: &CycleContext, input: StageInput) -> StageOutput {
        let mut alerts = Vec::new();
        let events = input
            .events
            .into_iter()
            .map(|event| {
                let (event, intent) = build_alert(event);
                if let Some(intent) = intent {
                    self.logger.record(&format!("{} -> {}", event.key(), intent.render()));
                    alerts.push(intent);
                }
                event
            })
            .collect();

        StageOutput {
            events,
            metadata: StageMetadata {
                alerts,
                ..Default::default()
            },
        }
    }
}
