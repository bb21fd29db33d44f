use crate::alert::intent::AlertIntent;
use crate::feed::RiskCategory;

const TOR_EMERGENCY: &str = "The National Weather Service has issued a Tornado Emergency.";
const PDS_STATEMENT: &str =
    "The National Weather Service has issued a PDS severe weather statement.";

fn risk_words(risk: RiskCategory) -> Option<&'static str> {
    match risk {
        RiskCategory::Marginal => Some("there is a Marginal Risk of severe thunderstorms"),
        RiskCategory::Slight => Some("there is a Slight Risk of severe thunderstorms"),
        RiskCategory::Enhanced => Some("there is an Enhanced Risk of severe thunderstorms"),
        RiskCategory::Moderate => Some("there is a Moderate Risk of severe thunderstorms"),
        RiskCategory::High => Some("there is a High Risk of severe thunderstorms"),
        RiskCategory::Unknown => None,
    }
}

/// Joins the non-empty fragments with single spaces.
fn words(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

fn county_clause(county: Option<&str>) -> String {
    county
        .map(|c| format!("for {} county", c))
        .unwrap_or_default()
}

impl AlertIntent {
    /// Spoken wording for the alert.
    pub fn render(&self) -> String {
        match self {
            AlertIntent::TornadoReport {
                reporter,
                county,
                emergency,
            } => {
                let by = reporter
                    .as_deref()
                    .map(|r| format!("by {}", r))
                    .unwrap_or_default();
                let mut text = format!(
                    "{}.",
                    words(&[
                        "A tornado has been reported",
                        &county_clause(county.as_deref()),
                        &by
                    ])
                );
                if *emergency {
                    text.push(' ');
                    text.push_str(TOR_EMERGENCY);
                }
                text
            }
            AlertIntent::SevereHail { magnitude, county } => format!(
                "{}.",
                words(&[
                    &format!("{} inch severe hail has been reported", magnitude),
                    &county_clause(county.as_deref()),
                ])
            ),
            AlertIntent::DayOneOutlook { risk } => {
                match risk.and_then(risk_words) {
                    Some(risk) => format!(
                        "The Storm Prediction Center has issued a new Day 1 outlook, {}.",
                        risk
                    ),
                    None => "The Storm Prediction Center has issued a new Day 1 outlook.".into(),
                }
            }
            AlertIntent::MesoscaleDiscussion {
                id,
                watch_probability,
            } => {
                let chance = watch_probability
                    .filter(|p| *p > 0)
                    .map(|p| format!("with {}% watch chance", p))
                    .unwrap_or_default();
                format!(
                    "{}.",
                    words(&[
                        &format!(
                            "The Storm Prediction Center has issued mesoscale discussion {}",
                            id
                        ),
                        &chance,
                    ])
                )
            }
            AlertIntent::TornadoWarning { area, pds } => format!(
                "{}: {}",
                words(&[
                    "The National Weather Service has issued a",
                    if *pds { "PDS" } else { "" },
                    "Tornado Warning for",
                ]),
                area
            ),
            AlertIntent::WatchIssued {
                watch_type,
                pds,
                area,
            } => format!(
                "{}.",
                words(&[
                    "The Storm Prediction Center has issued a new",
                    if *pds { "PDS" } else { "" },
                    watch_type.spoken(),
                    "watch for",
                    area,
                ])
            ),
            AlertIntent::PdsStatement => PDS_STATEMENT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::WatchType;

    #[test]
    fn pds_tornado_warning_wording() {
        let intent = AlertIntent::TornadoWarning {
            area: "Smith County".into(),
            pds: true,
        };
        assert_eq!(
            intent.render(),
            "The National Weather Service has issued a PDS Tornado Warning for: Smith County"
        );
        assert!(!intent.uses_eas());
    }

    #[test]
    fn plain_tornado_warning_has_no_double_space() {
        let intent = AlertIntent::TornadoWarning {
            area: "Smith County".into(),
            pds: false,
        };
        assert_eq!(
            intent.render(),
            "The National Weather Service has issued a Tornado Warning for: Smith County"
        );
    }

    #[test]
    fn hail_with_and_without_county() {
        let with = AlertIntent::SevereHail {
            magnitude: 2.5,
            county: Some("Travis".into()),
        };
        assert_eq!(
            with.render(),
            "2.5 inch severe hail has been reported for Travis county."
        );
        let without = AlertIntent::SevereHail {
            magnitude: 2.0,
            county: None,
        };
        assert_eq!(without.render(), "2 inch severe hail has been reported.");
    }

    #[test]
    fn tornado_report_names_place_reporter_and_emergency() {
        let intent = AlertIntent::TornadoReport {
            reporter: Some("Storm Chaser".into()),
            county: Some("Grady".into()),
            emergency: true,
        };
        assert_eq!(
            intent.render(),
            "A tornado has been reported for Grady county by Storm Chaser. \
             The National Weather Service has issued a Tornado Emergency."
        );
    }

    #[test]
    fn outlook_risk_prose() {
        let enh = AlertIntent::DayOneOutlook {
            risk: Some(RiskCategory::Enhanced),
        };
        assert_eq!(
            enh.render(),
            "The Storm Prediction Center has issued a new Day 1 outlook, \
             there is an Enhanced Risk of severe thunderstorms."
        );
        let unknown = AlertIntent::DayOneOutlook {
            risk: Some(RiskCategory::Unknown),
        };
        assert_eq!(
            unknown.render(),
            "The Storm Prediction Center has issued a new Day 1 outlook."
        );
    }

    #[test]
    fn discussion_mentions_probability_when_known() {
        let intent = AlertIntent::MesoscaleDiscussion {
            id: 734,
            watch_probability: Some(80),
        };
        assert_eq!(
            intent.render(),
            "The Storm Prediction Center has issued mesoscale discussion 734 with 80% watch chance."
        );
        let intent = AlertIntent::MesoscaleDiscussion {
            id: 735,
            watch_probability: None,
        };
        assert_eq!(
            intent.render(),
            "The Storm Prediction Center has issued mesoscale discussion 735."
        );
        let intent = AlertIntent::MesoscaleDiscussion {
            id: 736,
            watch_probability: Some(0),
        };
        assert_eq!(
            intent.render(),
            "The Storm Prediction Center has issued mesoscale discussion 736."
        );
    }

    #[test]
    fn watch_wording() {
        let intent = AlertIntent::WatchIssued {
            watch_type: WatchType::SevereThunderstorm,
            pds: true,
            area: "parts of Kansas".into(),
        };
        assert_eq!(
            intent.render(),
            "The Storm Prediction Center has issued a new PDS Severe Thunderstorm watch for parts of Kansas."
        );
        let intent = AlertIntent::WatchIssued {
            watch_type: WatchType::Other("Fire Weather".into()),
            pds: false,
            area: "western Texas".into(),
        };
        assert_eq!(
            intent.render(),
            "The Storm Prediction Center has issued a new Fire Weather watch for western Texas."
        );
    }
}
