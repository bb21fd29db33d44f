use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::feed::derived::Derived;
use crate::math::geo::LatLon;

/// Product tag carried by every feed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EventType {
    /// Tornado warning.
    NwsTor,
    /// Severe weather statement.
    NwsSvs,
    /// Local storm report.
    NwsLsr,
    /// Spotter network report.
    SnReport,
    /// SPC watch.
    NwsSel,
    /// SPC outlook or mesoscale discussion.
    NwsSwo,
    /// Area forecast discussion.
    NwsAfd,
    #[default]
    #[serde(other)]
    Other,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            EventType::NwsTor => "NwsTor",
            EventType::NwsSvs => "NwsSvs",
            EventType::NwsLsr => "NwsLsr",
            EventType::SnReport => "SnReport",
            EventType::NwsSel => "NwsSel",
            EventType::NwsSwo => "NwsSwo",
            EventType::NwsAfd => "NwsAfd",
            EventType::Other => "Other",
        };
        f.write_str(tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Hazard {
    Tornado,
    WallCloud,
    Funnel,
    Hail,
    #[default]
    #[serde(other)]
    Other,
}

impl Hazard {
    pub fn is_tornadic(&self) -> bool {
        matches!(self, Hazard::Tornado | Hazard::WallCloud | Hazard::Funnel)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WatchStatus {
    Issued,
    #[default]
    #[serde(other)]
    Other,
}

/// Watch kind. Unrecognized kinds keep the feed's own name so it can still be spoken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WatchType {
    Tornado,
    SevereThunderstorm,
    Other(String),
}

impl Default for WatchType {
    fn default() -> Self {
        WatchType::Other(String::new())
    }
}

impl From<String> for WatchType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Tornado" => WatchType::Tornado,
            "SevereThunderstorm" => WatchType::SevereThunderstorm,
            _ => WatchType::Other(raw),
        }
    }
}

impl From<WatchType> for String {
    fn from(kind: WatchType) -> Self {
        match kind {
            WatchType::Tornado => "Tornado".to_string(),
            WatchType::SevereThunderstorm => "SevereThunderstorm".to_string(),
            WatchType::Other(raw) => raw,
        }
    }
}

impl WatchType {
    pub fn spoken(&self) -> &str {
        match self {
            WatchType::Tornado => "Tornado",
            WatchType::SevereThunderstorm => "Severe Thunderstorm",
            WatchType::Other(raw) => raw,
        }
    }
}

/// Highest categorical risk named by an outlook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RiskCategory {
    #[serde(rename = "MRGL")]
    Marginal,
    #[serde(rename = "SLGT")]
    Slight,
    #[serde(rename = "ENH")]
    Enhanced,
    #[serde(rename = "MDT")]
    Moderate,
    #[serde(rename = "HIGH")]
    High,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Location {
    #[serde(default)]
    pub point: Option<LatLon>,
    #[serde(default)]
    pub poly: Option<Vec<LatLon>>,
    #[serde(default)]
    pub county: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Report {
    #[serde(default)]
    pub hazard: Hazard,
    #[serde(default)]
    pub magnitude: Option<f64>,
    #[serde(default)]
    pub reporter: Option<String>,
    #[serde(default)]
    pub is_tor_emergency: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Watch {
    pub id: u32,
    #[serde(default)]
    pub status: WatchStatus,
    #[serde(default)]
    pub watch_type: WatchType,
    #[serde(default)]
    pub is_pds: bool,
    #[serde(default)]
    pub issued_for: String,
}

/// Reasons an MD was written. The feed sends either a sentence or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Concerning {
    Text(String),
    Reasons(Vec<String>),
}

impl Concerning {
    /// A fresh discussion leads with "New".
    pub fn is_new(&self) -> bool {
        match self {
            Concerning::Text(text) => text.starts_with("New"),
            Concerning::Reasons(reasons) => reasons
                .first()
                .map(|first| first.starts_with("New"))
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MesoscaleDiscussion {
    pub id: u32,
    #[serde(default)]
    pub concerning: Option<Concerning>,
    /// Percent; the feed sends it as an integer or a float.
    #[serde(default)]
    pub watch_issuance_probability: Option<f64>,
}

impl MesoscaleDiscussion {
    pub fn is_new(&self) -> bool {
        self.concerning.as_ref().map(Concerning::is_new).unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Outlook {
    #[serde(default)]
    pub swo_type: String,
    #[serde(default)]
    pub max_risk: Option<RiskCategory>,
}

impl Outlook {
    pub fn is_day_one(&self) -> bool {
        self.swo_type == "Day1"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Warning {
    #[serde(default)]
    pub issued_for: String,
    #[serde(default)]
    pub is_pds: bool,
}

/// One record from the event feed plus the pipeline's derived side-record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Event {
    pub event_type: EventType,
    pub event_ts: i64,
    pub ingest_ts: i64,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub report: Option<Report>,
    #[serde(default)]
    pub watch: Option<Watch>,
    #[serde(default)]
    pub md: Option<MesoscaleDiscussion>,
    #[serde(default)]
    pub outlook: Option<Outlook>,
    #[serde(default)]
    pub warning: Option<Warning>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub ext_uri: Option<String>,
    #[serde(default, skip_deserializing)]
    pub derived: Derived,
}

impl Event {
    /// Stable identity across refresh cycles.
    ///
    /// Records from one product share their timestamps, so the key also carries a
    /// digest of the wire payload. `text` is left out because narratives are filled in later.
    pub fn key(&self) -> String {
        let mut hasher = DefaultHasher::new();
        format!(
            "{:?}|{:?}|{:?}|{:?}|{:?}|{:?}|{:?}",
            self.location, self.report, self.watch, self.md, self.outlook, self.warning, self.ext_uri
        )
        .hash(&mut hasher);
        format!(
            "{}:{}:{}:{:016x}",
            self.event_type,
            self.event_ts,
            self.ingest_ts,
            hasher.finish()
        )
    }

    pub fn point(&self) -> Option<LatLon> {
        self.location.as_ref().and_then(|l| l.point)
    }

    pub fn poly(&self) -> Option<&[LatLon]> {
        self.location.as_ref().and_then(|l| l.poly.as_deref())
    }

    pub fn county(&self) -> Option<&str> {
        self.location.as_ref().and_then(|l| l.county.as_deref())
    }
}
