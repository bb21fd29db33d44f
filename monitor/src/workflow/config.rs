use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use swarecore::prelude::{PipelineLimits, HOUR_US};

pub const DEFAULT_FEED_BASE: &str = "https://sigtor.org/v1/events";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkflowConfig {
    pub feed_base: String,
    pub poll_interval_secs: u64,
    pub location_interval_secs: u64,
    pub retention_hours: u32,
    pub chase_distance_miles: f64,
    pub settle_delay_ms: u64,
    pub settings_dir: PathBuf,
    pub bind: String,
    /// Speech program plus leading arguments; the utterance is appended.
    pub speech_command: Option<String>,
    /// Clip player plus leading arguments; the clip path is appended.
    pub clip_command: Option<String>,
    pub clip_dir: PathBuf,
    /// JSON `{"lat": .., "lon": ..}` file kept current by an external GPS daemon.
    pub position_file: Option<PathBuf>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            feed_base: DEFAULT_FEED_BASE.to_string(),
            poll_interval_secs: 60,
            location_interval_secs: 60,
            retention_hours: 3,
            chase_distance_miles: 120.0,
            settle_delay_ms: 2000,
            settings_dir: PathBuf::from("."),
            bind: "127.0.0.1:9000".to_string(),
            speech_command: None,
            clip_command: None,
            clip_dir: PathBuf::from("assets"),
            position_file: None,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(feed_base: String, poll_interval_secs: u64, settings_dir: PathBuf) -> Self {
        Self {
            feed_base,
            poll_interval_secs,
            settings_dir,
            ..Default::default()
        }
    }

    pub fn to_limits(&self) -> PipelineLimits {
        PipelineLimits {
            retention_us: i64::from(self.retention_hours) * HOUR_US,
            chase_distance_miles: self.chase_distance_miles,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn location_interval(&self) -> Duration {
        Duration::from_secs(self.location_interval_secs.max(1))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        self.bind
            .parse()
            .with_context(|| format!("parsing bind address {}", self.bind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_keeps_pipeline_defaults() {
        let cfg = WorkflowConfig::from_args("http://localhost/v1/events".into(), 30, ".".into());
        assert_eq!(cfg.poll_interval(), Duration::from_secs(30));
        assert_eq!(cfg.to_limits(), PipelineLimits::default());
    }

    #[test]
    fn config_load_reads_partial_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"feed_base: http://feed.local/v1/events\nretention_hours: 6\nspeech_command: espeak -s 150\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.feed_base, "http://feed.local/v1/events");
        assert_eq!(cfg.to_limits().retention_us, 6 * HOUR_US);
        assert_eq!(cfg.speech_command.as_deref(), Some("espeak -s 150"));
        assert_eq!(cfg.poll_interval_secs, 60);
    }

    #[test]
    fn bad_bind_address_is_reported() {
        let cfg = WorkflowConfig {
            bind: "not-an-address".into(),
            ..Default::default()
        };
        assert!(cfg.bind_addr().is_err());
    }
}
