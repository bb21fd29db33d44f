use crate::alert::SEVERE_HAIL_INCHES;
use crate::feed::{Event, EventType, Hazard, WatchStatus, WatchType};
use crate::math::geo::GeoHelper;
use crate::math::time::TimeHelper;
use crate::prelude::{CycleContext, ProcessingStage, StageInput, StageMetadata, StageOutput};
use crate::telemetry::log::LogManager;

const SPC_WATCH_URL: &str = "https://www.spc.noaa.gov/products/watch";
const SPC_MD_URL: &str = "https://www.spc.noaa.gov/products/md";

pub fn is_important(event: &Event) -> bool {
    match event.event_type {
        EventType::NwsSwo => {
            event.md.as_ref().map(|md| md.is_new()).unwrap_or(false)
                || event.outlook.as_ref().map(|o| o.is_day_one()).unwrap_or(false)
        }
        EventType::SnReport | EventType::NwsLsr => event
            .report
            .as_ref()
            .map(|report| match report.hazard {
                Hazard::Tornado | Hazard::WallCloud => true,
                Hazard::Hail => report
                    .magnitude
                    .map(|mag| mag > SEVERE_HAIL_INCHES)
                    .unwrap_or(false),
                _ => false,
            })
            .unwrap_or(false),
        EventType::NwsTor => true,
        EventType::NwsSel => event
            .watch
            .as_ref()
            .map(|w| w.status == WatchStatus::Issued)
            .unwrap_or(false),
        _ => false,
    }
}

pub fn is_tor_related(event: &Event) -> bool {
    if event
        .report
        .as_ref()
        .map(|r| r.hazard.is_tornadic())
        .unwrap_or(false)
    {
        return true;
    }
    match event.event_type {
        EventType::NwsTor | EventType::NwsSvs => true,
        EventType::NwsSel => event
            .watch
            .as_ref()
            .map(|w| w.watch_type == WatchType::Tornado)
            .unwrap_or(false),
        _ => false,
    }
}

/// SPC product page for watches and mesoscale discussions.
pub fn permalink(event: &Event) -> Option<String> {
    match event.event_type {
        EventType::NwsSel => event
            .watch
            .as_ref()
            .map(|w| format!("{}/ww{:04}.html", SPC_WATCH_URL, w.id)),
        EventType::NwsSwo => {
            let md = event.md.as_ref()?;
            let year = TimeHelper::utc_year(event.event_ts).ok()?;
            Some(format!("{}/{}/md{:04}.html", SPC_MD_URL, year, md.id))
        }
        _ => None,
    }
}

/// Recomputes the arrival-time fields of `event.derived`.
///
/// Cycle-volatile fields (`time_ago`, `distance`, `selected`, `alert_state`)
/// are left untouched, so enriching twice gives the same record.
pub fn enrich(mut event: Event) -> Event {
    let is_important = is_important(&event);
    let is_tor_related = is_tor_related(&event);
    let parsed_dt = TimeHelper::zulu_hhmm(event.event_ts).ok();
    let link = permalink(&event);

    let geometry = event.poly().and_then(|poly| {
        let bounds = GeoHelper::bounds_of(poly).ok()?;
        let center = GeoHelper::centroid_approx(poly).ok()?;
        Some((bounds, center))
    });

    let derived = &mut event.derived;
    derived.is_important = is_important;
    derived.is_tor_related = is_tor_related;
    derived.parsed_dt = parsed_dt;
    derived.link = link;
    match geometry {
        Some((bounds, center)) => {
            derived.half_edge_distance = Some(GeoHelper::half_diagonal_miles(&bounds));
            derived.bounds = Some(bounds);
            derived.point = Some(center);
        }
        None => {
            derived.bounds = None;
            derived.point = None;
            derived.half_edge_distance = None;
        }
    }
    event
}

/// Runs [`enrich`] over freshly merged events.
pub struct EnrichStage {
    logger: LogManager,
}

impl EnrichStage {
    pub fn new() -> Self {
        Self {
            logger: LogManager::new("enrich"),
        }
    }
}

impl Default for EnrichStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for EnrichStage {
    fn name(&self) -> &'static str {
        "enrich"
    }

    fn execute(&mut self, _ctx: &CycleContext, input: StageInput) -> StageOutput {
        let events: Vec<Event> = input.events.into_iter().map(enrich).collect();
        let shaped = events.iter().filter(|e| e.derived.bounds.is_some()).count();
        self.logger.trace(&format!(
            "enriched {} events ({} with polygons)",
            events.len(),
            shaped
        ));

        StageOutput {
            events,
            metadata: StageMetadata {
                notes: vec![format!("{} polygons", shaped)],
                ..Default::default()
            },
        }
    }
}
