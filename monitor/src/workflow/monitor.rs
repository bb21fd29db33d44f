use crate::feed::{FeedBatch, FeedClient};
use crate::gui_bridge::model::DisplayModel;
use crate::location::PositionSource;
use crate::settings::{SettingsStore, ToggleId};
use crate::workflow::runner::{EventDetails, Runner};
use anyhow::anyhow;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use swarecore::alert::AudioHandle;
use swarecore::feed::Event;
use swarecore::math::TimeHelper;
use swarecore::prelude::Settings;
use swarecore::telemetry::MetricsRecorder;

/// Ties the runner to its collaborators: feed, settings store, audio queue and display view.
///
/// Cloning shares the same state. The runner lock is never held across an await.
#[derive(Clone)]
pub struct Monitor {
    runner: Arc<Mutex<Runner>>,
    view: Arc<RwLock<DisplayModel>>,
    feed: FeedClient,
    store: Arc<SettingsStore>,
    audio: AudioHandle,
    metrics: Arc<MetricsRecorder>,
}

impl Monitor {
    pub fn new(runner: Runner, feed: FeedClient, store: SettingsStore, audio: AudioHandle) -> Self {
        let monitor = Self {
            runner: Arc::new(Mutex::new(runner)),
            view: Arc::new(RwLock::new(DisplayModel::default())),
            feed,
            store: Arc::new(store),
            audio,
            metrics: Arc::new(MetricsRecorder::new()),
        };
        monitor.tick_clock();
        monitor
    }

    fn runner(&self) -> anyhow::Result<MutexGuard<'_, Runner>> {
        self.runner.lock().map_err(|_| anyhow!("runner lock poisoned"))
    }

    pub fn view(&self) -> DisplayModel {
        self.view.read().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn metrics(&self) -> Arc<MetricsRecorder> {
        self.metrics.clone()
    }

    /// One poll cycle: fetch, merge, then refresh. A failed fetch keeps `since_ts` and still refreshes.
    pub async fn poll(&self) -> anyhow::Result<()> {
        let since_ts = self.runner()?.since_ts();
        match self.feed.fetch_since(since_ts).await {
            Ok(batch) => {
                self.ingest(batch)?;
            }
            Err(err) => {
                self.metrics.record_fetch_error();
                log::warn!("feed poll failed, retrying next cycle: {:#}", err);
            }
        }
        self.refresh()
    }

    /// Merges a decoded reply. `since_ts` still advances past records that failed to decode.
    pub fn ingest(&self, batch: FeedBatch) -> anyhow::Result<usize> {
        if batch.skipped > 0 {
            log::warn!("{} feed records could not be decoded", batch.skipped);
        }
        let added = self.merge(batch.events)?;
        if let Some(ingest_ts) = batch.latest_ingest_ts {
            self.runner()?.advance_since(ingest_ts);
        }
        Ok(added)
    }

    pub fn merge(&self, batch: Vec<Event>) -> anyhow::Result<usize> {
        let added = self.runner()?.merge(batch, TimeHelper::now_us());
        self.metrics.record_merged(added);
        if added > 0 {
            log::info!("merged {} new events", added);
        }
        Ok(added)
    }

    /// Runs the pipeline over the working set, announces new alerts and publishes the view.
    pub fn refresh(&self) -> anyhow::Result<()> {
        let mut runner = self.runner()?;
        let report = runner.process(TimeHelper::now_us());
        self.metrics.record_cycle(report.dropped, report.alerts.len());

        for intent in &report.alerts {
            if let Err(err) = self.audio.announce(intent) {
                log::warn!("could not queue alert: {}", err);
            }
        }

        let mut view = self
            .view
            .write()
            .map_err(|_| anyhow!("display view lock poisoned"))?;
        view.events = runner.display().to_vec();
        view.settings = runner.settings();
        view.observer = runner.observer();
        view.counters = self.metrics.snapshot();
        Ok(())
    }

    pub async fn refresh_location(&self, source: &dyn PositionSource) -> anyhow::Result<()> {
        if self.runner()?.settings().toggles.manual_location {
            return Ok(());
        }
        if let Some(fix) = source.current().await {
            self.runner()?.set_fix(Some(fix));
        }
        Ok(())
    }

    pub fn tick_clock(&self) {
        let clock = TimeHelper::zulu_hhmm(TimeHelper::now_us()).unwrap_or_default();
        if let Ok(mut view) = self.view.write() {
            view.clock = clock;
        }
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        Ok(self.runner()?.settings())
    }

    /// Flips a named toggle. Audio takes effect at once; filters on the next refresh.
    pub fn toggle(&self, id: &str) -> anyhow::Result<Settings> {
        let toggle = ToggleId::parse(id).ok_or_else(|| anyhow!("unknown toggle {}", id))?;
        let mut runner = self.runner()?;
        let mut settings = runner.settings();
        let value = toggle.flip(&mut settings.toggles);
        runner.set_settings(settings);

        if toggle == ToggleId::AudioAlerts {
            self.audio.set_enabled(value)?;
        }
        log::info!("{} -> {}", toggle.label(), value);
        Ok(settings)
    }

    pub fn set_manual_location(
        &self,
        lat: Option<f64>,
        lon: Option<f64>,
    ) -> anyhow::Result<Settings> {
        let mut runner = self.runner()?;
        let mut settings = runner.settings();
        settings.manual.lat = lat;
        settings.manual.lon = lon;
        runner.set_settings(settings);
        Ok(settings)
    }

    /// Closing the configuration panel persists settings and reprocesses.
    pub fn close_config(&self) -> anyhow::Result<()> {
        let settings = self.settings()?;
        if let Err(err) = self.store.save(&settings) {
            log::error!("Error saving config: {:#}", err);
        }
        self.refresh()
    }

    /// Selects an event, fetching narrative text on demand for AFDs that lack it.
    pub async fn details(&self, key: &str) -> anyhow::Result<Option<EventDetails>> {
        let Some(mut details) = self.runner()?.select(key) else {
            return Ok(None);
        };

        if let Some(uri) = details.narrative_uri.take() {
            match self.feed.fetch_narrative(&uri).await {
                Ok(Some(text)) => {
                    self.runner()?.attach_text(key, text.clone());
                    details.text = Some(text);
                }
                Ok(None) => {}
                Err(err) => log::warn!("narrative fetch failed: {:#}", err),
            }
        }
        Ok(Some(details))
    }
}
