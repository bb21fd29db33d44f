use crate::workflow::config::WorkflowConfig;
use serde::Serialize;
use std::collections::HashSet;
use swarecore::alert::AlertIntent;
use swarecore::feed::{Event, EventType};
use swarecore::math::LatLon;
use swarecore::prelude::{
    CycleContext, PipelineLimits, ProcessingStage, Settings, StageInput,
};
use swarecore::processing::{AlertStage, EnrichStage, FilterStage, MassageStage, RetentionStage};

/// Result of one refresh cycle.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub alerts: Vec<AlertIntent>,
    pub dropped: usize,
    pub displayed: usize,
}

/// Detail panel contents for a selected event.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EventDetails {
    pub key: String,
    pub source: String,
    pub text: Option<String>,
    pub link: Option<String>,
    pub time: String,
    #[serde(skip)]
    pub narrative_uri: Option<String>,
}

/// Owns the working event set and runs the pipeline stages over it.
pub struct Runner {
    limits: PipelineLimits,
    settings: Settings,
    fix: Option<LatLon>,
    events: Vec<Event>,
    display: Vec<Event>,
    since_ts: i64,
    enrich: EnrichStage,
    alert: AlertStage,
    retention: RetentionStage,
    massage: MassageStage,
    filter: FilterStage,
}

impl Runner {
    pub fn new(config: &WorkflowConfig, settings: Settings) -> Self {
        Self {
            limits: config.to_limits(),
            settings,
            fix: None,
            events: Vec::new(),
            display: Vec::new(),
            since_ts: 0,
            enrich: EnrichStage::new(),
            alert: AlertStage::new(),
            retention: RetentionStage::new(),
            massage: MassageStage::new(),
            filter: FilterStage::new(),
        }
    }

    /// `ingest_ts` of the newest merged event; 0 before the first merge.
    pub fn since_ts(&self) -> i64 {
        self.since_ts
    }

    /// Moves `since_ts` past records that were served but never merged.
    pub fn advance_since(&mut self, ingest_ts: i64) {
        if ingest_ts > self.since_ts {
            self.since_ts = ingest_ts;
        }
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn set_fix(&mut self, fix: Option<LatLon>) {
        self.fix = fix;
    }

    pub fn observer(&self) -> Option<LatLon> {
        self.settings.observer(self.fix)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn display(&self) -> &[Event] {
        &self.display
    }

    fn context(&self, now_us: i64) -> CycleContext {
        CycleContext::new(now_us, self.observer(), self.settings).with_limits(self.limits)
    }

    /// Merges a feed batch (oldest-first, as served) ahead of the working set.
    ///
    /// Returns how many events were new.
    pub fn merge(&mut self, mut batch: Vec<Event>, now_us: i64) -> usize {
        batch.reverse();
        let Some(newest) = batch.first() else {
            return 0;
        };
        self.since_ts = newest.ingest_ts;

        if batch.windows(2).any(|w| w[0].ingest_ts < w[1].ingest_ts) {
            log::warn!("feed batch is not ordered by ingest time; retention may cut early");
        }

        let known: HashSet<String> = self.events.iter().map(Event::key).collect();
        let fresh: Vec<Event> = batch
            .into_iter()
            .filter(|event| !known.contains(&event.key()))
            .collect();

        let ctx = self.context(now_us);
        let mut merged = self
            .enrich
            .execute(&ctx, StageInput { events: fresh })
            .events;
        let added = merged.len();
        merged.append(&mut self.events);
        self.events = merged;
        added
    }

    /// alert -> truncate -> massage -> filter, then publish the display view.
    pub fn process(&mut self, now_us: i64) -> CycleReport {
        let ctx = self.context(now_us);
        let events = std::mem::take(&mut self.events);

        let alerted = self.alert.execute(&ctx, StageInput { events });
        let retained = self.retention.execute(
            &ctx,
            StageInput {
                events: alerted.events,
            },
        );
        let massaged = self.massage.execute(
            &ctx,
            StageInput {
                events: retained.events,
            },
        );
        self.events = massaged.events;

        let shown = self.filter.execute(
            &ctx,
            StageInput {
                events: self.events.clone(),
            },
        );
        self.display = shown.events;

        CycleReport {
            alerts: alerted.metadata.alerts,
            dropped: retained.metadata.dropped,
            displayed: self.display.len(),
        }
    }

    /// Marks `key` as the only selected event and returns its details.
    pub fn select(&mut self, key: &str) -> Option<EventDetails> {
        for event in self.events.iter_mut().chain(self.display.iter_mut()) {
            event.derived.selected = event.key() == key;
        }
        let event = self.events.iter().find(|e| e.key() == key)?;
        let narrative_uri = match (&event.event_type, &event.text) {
            (EventType::NwsAfd, None) => event.ext_uri.clone(),
            _ => None,
        };

        Some(EventDetails {
            key: key.to_string(),
            source: format!("Source: {}", event.event_type),
            text: event.text.clone(),
            link: event.derived.link.clone(),
            time: format!(
                "Time: {}",
                event.derived.parsed_dt.as_deref().unwrap_or_default()
            ),
            narrative_uri,
        })
    }

    /// Caches narrative text fetched for `key`.
    pub fn attach_text(&mut self, key: &str, text: String) {
        for event in self
            .events
            .iter_mut()
            .chain(self.display.iter_mut())
            .filter(|e| e.key() == key)
        {
            event.text = Some(text.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarecore::feed::{AlertState, Location, Report, Warning, Hazard};
    use swarecore::prelude::{Toggles, HOUR_US, MINUTE_US};

    const NOW: i64 = 1_716_000_000_000_000;

    fn tor(ingest_ts: i64, area: &str) -> Event {
        Event {
            event_type: EventType::NwsTor,
            event_ts: ingest_ts - MINUTE_US,
            ingest_ts,
            warning: Some(Warning {
                issued_for: area.into(),
                is_pds: false,
            }),
            ..Default::default()
        }
    }

    fn runner() -> Runner {
        Runner::new(&WorkflowConfig::default(), Settings::default())
    }

    #[test]
    fn merge_reverses_batch_and_tracks_since_ts() {
        let mut runner = runner();
        let added = runner.merge(
            vec![tor(NOW - 2 * HOUR_US, "old"), tor(NOW - HOUR_US, "new")],
            NOW,
        );
        assert_eq!(added, 2);
        assert_eq!(runner.since_ts(), NOW - HOUR_US);
        assert_eq!(runner.events()[0].ingest_ts, NOW - HOUR_US);
        assert!(runner.events()[0].derived.parsed_dt.is_some());

        let added = runner.merge(vec![tor(NOW - HOUR_US, "new"), tor(NOW, "newest")], NOW);
        assert_eq!(added, 1);
        assert_eq!(runner.events().len(), 3);
        assert_eq!(runner.events()[0].ingest_ts, NOW);
    }

    #[test]
    fn empty_batch_leaves_since_ts() {
        let mut runner = runner();
        runner.merge(vec![tor(NOW, "a")], NOW);
        assert_eq!(runner.merge(Vec::new(), NOW), 0);
        assert_eq!(runner.since_ts(), NOW);
    }

    #[test]
    fn advance_since_only_moves_forward() {
        let mut runner = runner();
        runner.merge(vec![tor(NOW, "a")], NOW);
        runner.advance_since(NOW - MINUTE_US);
        assert_eq!(runner.since_ts(), NOW);
        runner.advance_since(NOW + MINUTE_US);
        assert_eq!(runner.since_ts(), NOW + MINUTE_US);
    }

    #[test]
    fn process_alerts_once_and_drops_expired() {
        let mut runner = runner();
        runner.merge(
            vec![tor(NOW - 4 * HOUR_US, "Expired County"), tor(NOW - 30 * MINUTE_US, "Smith County")],
            NOW,
        );

        let report = runner.process(NOW);
        assert_eq!(report.alerts.len(), 2);
        assert_eq!(report.dropped, 1);
        assert_eq!(runner.events().len(), 1);
        assert_eq!(runner.events()[0].derived.time_ago.as_deref(), Some("30m"));
        assert_eq!(runner.events()[0].derived.alert_state, AlertState::Alerted);

        let report = runner.process(NOW + MINUTE_US);
        assert!(report.alerts.is_empty());
        assert_eq!(runner.events()[0].derived.time_ago.as_deref(), Some("31m"));
    }

    #[test]
    fn chase_mode_shapes_display_but_not_working_set() {
        let settings = Settings {
            toggles: Toggles {
                chase_mode: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut runner = Runner::new(&WorkflowConfig::default(), settings);
        runner.set_fix(Some(LatLon::new(35.0, -97.0)));

        let near = Event {
            event_type: EventType::NwsLsr,
            ingest_ts: NOW,
            event_ts: NOW,
            report: Some(Report {
                hazard: Hazard::Hail,
                magnitude: Some(1.0),
                ..Default::default()
            }),
            location: Some(Location {
                point: Some(LatLon::new(35.5, -97.0)),
                ..Default::default()
            }),
            ..Default::default()
        };
        let mut far = near.clone();
        far.event_ts -= 1;
        far.location = Some(Location {
            point: Some(LatLon::new(40.0, -97.0)),
            ..Default::default()
        });

        runner.merge(vec![far, near], NOW);
        let report = runner.process(NOW);
        assert_eq!(report.displayed, 1);
        assert_eq!(runner.events().len(), 2);
        assert_eq!(runner.display()[0].derived.distance.as_deref(), Some("34mi"));
    }

    #[test]
    fn selecting_an_afd_requests_its_narrative() {
        let mut runner = runner();
        let afd = Event {
            event_type: EventType::NwsAfd,
            event_ts: NOW,
            ingest_ts: NOW,
            ext_uri: Some("https://api.weather.gov/products/abc".into()),
            ..Default::default()
        };
        let other = tor(NOW - MINUTE_US, "Smith County");
        runner.merge(vec![other.clone(), afd.clone()], NOW);
        runner.process(NOW);

        let details = runner.select(&afd.key()).unwrap();
        assert_eq!(details.source, "Source: NwsAfd");
        assert_eq!(
            details.narrative_uri.as_deref(),
            Some("https://api.weather.gov/products/abc")
        );
        assert!(runner.events().iter().filter(|e| e.derived.selected).count() == 1);

        runner.attach_text(&afd.key(), "Forecast discussion".into());
        let details = runner.select(&afd.key()).unwrap();
        assert_eq!(details.text.as_deref(), Some("Forecast discussion"));
        assert_eq!(details.narrative_uri, None);

        runner.select(&other.key());
        assert!(!runner.events()[0].derived.selected);
        assert!(runner.select("missing").is_none());
    }
}
