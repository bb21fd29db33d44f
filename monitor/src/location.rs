use async_trait::async_trait;
use std::path::PathBuf;
use swarecore::math::LatLon;

/// Positioning capability. Failures are swallowed and simply yield no fix.
#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn current(&self) -> Option<LatLon>;
}

/// Used when no positioning is available; the manual override still works.
pub struct NoPositioning;

#[async_trait]
impl PositionSource for NoPositioning {
    async fn current(&self) -> Option<LatLon> {
        None
    }
}

/// Reads the latest `{"lat": .., "lon": ..}` fix written by an external GPS daemon.
pub struct FilePosition {
    path: PathBuf,
}

impl FilePosition {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl PositionSource for FilePosition {
    async fn current(&self) -> Option<LatLon> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) => {
                log::warn!("position unavailable from {}: {}", self.path.display(), err);
                return None;
            }
        };
        match serde_json::from_str::<LatLon>(&contents) {
            Ok(fix) if fix.lat.is_finite() && fix.lon.is_finite() => Some(fix),
            Ok(_) => None,
            Err(err) => {
                log::warn!("unreadable position fix {}: {}", self.path.display(), err);
                None
            }
        }
    }
}
