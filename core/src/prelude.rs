use serde::{Deserialize, Serialize};

use crate::alert::AlertIntent;
use crate::feed::Event;
use crate::math::geo::LatLon;

pub const MINUTE_US: i64 = 60 * 1_000_000;
pub const HOUR_US: i64 = 60 * MINUTE_US;
pub const DAY_US: i64 = 24 * HOUR_US;

/// User-facing switches that shape filtering and audio delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toggles {
    pub manual_location: bool,
    pub hide_afds: bool,
    pub chase_mode: bool,
    pub audio_alerts: bool,
}

impl Default for Toggles {
    fn default() -> Self {
        Self {
            manual_location: false,
            hide_afds: false,
            chase_mode: false,
            audio_alerts: true,
        }
    }
}

/// Observer coordinates typed in by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualLocation {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Process-wide settings. Loaded and saved outside the core; stages only read them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub toggles: Toggles,
    pub manual: ManualLocation,
}

impl Settings {
    /// Resolves where the observer is: manual override first, then the last positioning fix.
    pub fn observer(&self, fix: Option<LatLon>) -> Option<LatLon> {
        if self.toggles.manual_location {
            return match (self.manual.lat, self.manual.lon) {
                (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                    Some(LatLon::new(lat, lon))
                }
                _ => None,
            };
        }
        fix
    }
}

/// Numeric limits applied by the pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineLimits {
    pub retention_us: i64,
    pub chase_distance_miles: f64,
}

impl Default for PipelineLimits {
    fn default() -> Self {
        Self {
            retention_us: 3 * HOUR_US,
            chase_distance_miles: 120.0,
        }
    }
}

/// Everything a stage may read during one refresh cycle.
#[derive(Debug, Clone, Copy)]
pub struct CycleContext {
    pub now_us: i64,
    pub observer: Option<LatLon>,
    pub settings: Settings,
    pub limits: PipelineLimits,
}

impl CycleContext {
    pub fn new(now_us: i64, observer: Option<LatLon>, settings: Settings) -> Self {
        Self {
            now_us,
            observer,
            settings,
            limits: PipelineLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: PipelineLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Working set handed to a stage, newest-first.
#[derive(Debug, Clone, Default)]
pub struct StageInput {
    pub events: Vec<Event>,
}

/// Output produced by each stage.
#[derive(Debug, Clone, Default)]
pub struct StageOutput {
    pub events: Vec<Event>,
    pub metadata: StageMetadata,
}

/// Side results collected while a stage ran.
#[derive(Debug, Clone, Default)]
pub struct StageMetadata {
    pub alerts: Vec<AlertIntent>,
    pub dropped: usize,
    pub notes: Vec<String>,
}

/// Recoverable failures raised by the core helpers.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("polygon has no vertices")]
    EmptyPolygon,
    #[error("timestamp out of range: {0}us")]
    InvalidTimestamp(i64),
    #[error("playback failed: {0}")]
    Playback(String),
    #[error("audio queue is shut down")]
    ChannelClosed,
}

pub type CoreResult<T> = Result<T, CoreError>;

/// One step of the refresh cycle. Stages never abort a cycle; they degrade instead.
pub trait ProcessingStage {
    fn name(&self) -> &'static str;
    fn execute(&mut self, ctx: &CycleContext, input: StageInput) -> StageOutput;
}
