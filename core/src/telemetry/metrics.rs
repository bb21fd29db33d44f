use std::sync::Mutex;

use serde::Serialize;

/// Running totals for the ingestion pipeline, shareable across tasks.
pub struct MetricsRecorder {
    inner: Mutex<PipelineCounters>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineCounters {
    pub cycles: usize,
    pub merged: usize,
    pub dropped: usize,
    pub alerts: usize,
    pub fetch_errors: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(PipelineCounters::default()),
        }
    }

    fn update(&self, f: impl FnOnce(&mut PipelineCounters)) {
        if let Ok(mut counters) = self.inner.lock() {
            f(&mut counters);
        }
    }

    pub fn record_cycle(&self, dropped: usize, alerts: usize) {
        self.update(|c| {
            c.cycles += 1;
            c.dropped += dropped;
            c.alerts += alerts;
        });
    }

    pub fn record_merged(&self, count: usize) {
        self.update(|c| c.merged += count);
    }

    pub fn record_fetch_error(&self) {
        self.update(|c| c.fetch_errors += 1);
    }

    pub fn snapshot(&self) -> PipelineCounters {
        self.inner.lock().map(|c| *c).unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
