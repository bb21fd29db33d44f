use serde::{Deserialize, Serialize};

use crate::feed::{AlertState, Event, EventType, Hazard, RiskCategory, WatchStatus, WatchType};

/// Hail at or above this size (inches) is announced; strictly above it marks the event important.
pub const SEVERE_HAIL_INCHES: f64 = 2.0;

/// What an event should announce, before any wording is chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AlertIntent {
    TornadoReport {
        reporter: Option<String>,
        county: Option<String>,
        emergency: bool,
    },
    SevereHail {
        magnitude: f64,
        county: Option<String>,
    },
    DayOneOutlook {
        risk: Option<RiskCategory>,
    },
    MesoscaleDiscussion {
        id: u32,
        watch_probability: Option<u32>,
    },
    TornadoWarning {
        area: String,
        pds: bool,
    },
    WatchIssued {
        watch_type: WatchType,
        pds: bool,
        area: String,
    },
    PdsStatement,
}

impl AlertIntent {
    /// Watches and PDS statements are preceded by the EAS tone.
    pub fn uses_eas(&self) -> bool {
        matches!(
            self,
            AlertIntent::WatchIssued { .. } | AlertIntent::PdsStatement
        )
    }
}

/// Evaluates the alert rules in priority order. Pure: the latch lives in [`build_alert`].
pub fn classify(event: &Event) -> Option<AlertIntent> {
    let county = event.county().map(str::to_string);

    if let Some(report) = &event.report {
        return match report.hazard {
            Hazard::Tornado => Some(AlertIntent::TornadoReport {
                reporter: report.reporter.clone(),
                county,
                emergency: report.is_tor_emergency,
            }),
            Hazard::Hail => report
                .magnitude
                .filter(|mag| *mag >= SEVERE_HAIL_INCHES)
                .map(|magnitude| AlertIntent::SevereHail { magnitude, county }),
            _ => None,
        };
    }

    if let Some(outlook) = event.outlook.as_ref().filter(|o| o.is_day_one()) {
        return Some(AlertIntent::DayOneOutlook {
            risk: outlook.max_risk,
        });
    }

    if let Some(md) = event.md.as_ref().filter(|md| md.is_new()) {
        return Some(AlertIntent::MesoscaleDiscussion {
            id: md.id,
            watch_probability: md
                .watch_issuance_probability
                .filter(|p| p.is_finite() && *p >= 0.5)
                .map(|p| p.round() as u32),
        });
    }

    if event.event_type == EventType::NwsTor {
        let warning = event.warning.clone().unwrap_or_default();
        return Some(AlertIntent::TornadoWarning {
            area: warning.issued_for,
            pds: warning.is_pds,
        });
    }

    if let Some(watch) = event
        .watch
        .as_ref()
        .filter(|w| w.status == WatchStatus::Issued)
    {
        return Some(AlertIntent::WatchIssued {
            watch_type: watch.watch_type.clone(),
            pds: watch.is_pds,
            area: watch.issued_for.clone(),
        });
    }

    if event.event_type == EventType::NwsSvs {
        return Some(AlertIntent::PdsStatement);
    }

    None
}

/// Latches the event as alerted and returns its intent, at most once per event.
pub fn build_alert(mut event: Event) -> (Event, Option<AlertIntent>) {
    if event.derived.alert_state == AlertState::Alerted {
        return (event, None);
    }
    event.derived.alert_state = AlertState::Alerted;
    let intent = classify(&event);
    (event, intent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{Location, MesoscaleDiscussion, Outlook, Report, Warning, Watch};

    fn tornado_warning() -> Event {
        Event {
            event_type: EventType::NwsTor,
            warning: Some(Warning {
                issued_for: "Smith County".into(),
                is_pds: true,
            }),
            ..Default::default()
        }
    }

    fn hail(magnitude: f64) -> Event {
        Event {
            event_type: EventType::NwsLsr,
            report: Some(Report {
                hazard: Hazard::Hail,
                magnitude: Some(magnitude),
                ..Default::default()
            }),
            location: Some(Location {
                county: Some("Travis".into()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn second_evaluation_yields_nothing() {
        let (event, first) = build_alert(tornado_warning());
        assert_eq!(
            first,
            Some(AlertIntent::TornadoWarning {
                area: "Smith County".into(),
                pds: true
            })
        );
        let (again, second) = build_alert(event.clone());
        assert_eq!(second, None);
        assert_eq!(again, event);
    }

    #[test]
    fn unmatched_event_is_still_latched() {
        let afd = Event {
            event_type: EventType::NwsAfd,
            ..Default::default()
        };
        let (afd, intent) = build_alert(afd);
        assert!(intent.is_none());
        assert_eq!(afd.derived.alert_state, AlertState::Alerted);
    }

    #[test]
    fn hail_threshold_is_inclusive_for_alerts() {
        assert_eq!(
            classify(&hail(2.0)),
            Some(AlertIntent::SevereHail {
                magnitude: 2.0,
                county: Some("Travis".into())
            })
        );
        assert_eq!(classify(&hail(1.75)), None);
    }

    #[test]
    fn report_rules_shadow_later_rules() {
        let mut event = hail(1.0);
        event.event_type = EventType::NwsTor;
        assert_eq!(classify(&event), None);
    }

    #[test]
    fn tornado_report_carries_reporter_and_emergency() {
        let event = Event {
            event_type: EventType::SnReport,
            report: Some(Report {
                hazard: Hazard::Tornado,
                reporter: Some("Jane Doe".into()),
                is_tor_emergency: true,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(
            classify(&event),
            Some(AlertIntent::TornadoReport {
                reporter: Some("Jane Doe".into()),
                county: None,
                emergency: true
            })
        );
    }

    #[test]
    fn outlook_outranks_discussion() {
        let event = Event {
            event_type: EventType::NwsSwo,
            outlook: Some(Outlook {
                swo_type: "Day1".into(),
                max_risk: Some(RiskCategory::Moderate),
            }),
            md: Some(MesoscaleDiscussion {
                id: 4,
                concerning: Some(crate::feed::Concerning::Text("New watch".into())),
                watch_issuance_probability: None,
            }),
            ..Default::default()
        };
        assert_eq!(
            classify(&event),
            Some(AlertIntent::DayOneOutlook {
                risk: Some(RiskCategory::Moderate)
            })
        );
    }

    #[test]
    fn discussion_probability_rounds_and_zero_is_dropped() {
        let mut event = Event {
            event_type: EventType::NwsSwo,
            md: Some(MesoscaleDiscussion {
                id: 9,
                concerning: Some(crate::feed::Concerning::Text("New watch".into())),
                watch_issuance_probability: Some(39.6),
            }),
            ..Default::default()
        };
        assert_eq!(
            classify(&event),
            Some(AlertIntent::MesoscaleDiscussion {
                id: 9,
                watch_probability: Some(40)
            })
        );

        if let Some(md) = event.md.as_mut() {
            md.watch_issuance_probability = Some(0.0);
        }
        assert_eq!(
            classify(&event),
            Some(AlertIntent::MesoscaleDiscussion {
                id: 9,
                watch_probability: None
            })
        );
    }

    #[test]
    fn only_issued_watches_alert_and_request_eas() {
        let mut event = Event {
            event_type: EventType::NwsSel,
            watch: Some(Watch {
                id: 123,
                status: WatchStatus::Issued,
                watch_type: WatchType::Tornado,
                is_pds: false,
                issued_for: "central Oklahoma".into(),
            }),
            ..Default::default()
        };
        let intent = classify(&event).unwrap();
        assert!(intent.uses_eas());

        if let Some(watch) = event.watch.as_mut() {
            watch.status = WatchStatus::Other;
        }
        assert_eq!(classify(&event), None);
    }

    #[test]
    fn severe_weather_statement_requests_eas() {
        let event = Event {
            event_type: EventType::NwsSvs,
            ..Default::default()
        };
        let intent = classify(&event).unwrap();
        assert_eq!(intent, AlertIntent::PdsStatement);
        assert!(intent.uses_eas());
        assert!(!AlertIntent::TornadoWarning {
            area: String::new(),
            pds: false
        }
        .uses_eas());
    }
}
