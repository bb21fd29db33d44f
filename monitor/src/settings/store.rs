use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use swarecore::prelude::{ManualLocation, Settings, Toggles};

pub const ITEMS_FILE: &str = "sware-config-items.json";
pub const CONFIG_FILE: &str = "sware-config.json";

/// Named switch as shown in the configuration panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleId {
    GpsLocation,
    HideAfds,
    ChaseMode,
    AudioAlerts,
}

impl ToggleId {
    pub const ALL: [ToggleId; 4] = [
        ToggleId::GpsLocation,
        ToggleId::HideAfds,
        ToggleId::ChaseMode,
        ToggleId::AudioAlerts,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ToggleId::GpsLocation => "gpsLocation",
            ToggleId::HideAfds => "hideAfds",
            ToggleId::ChaseMode => "chaseMode",
            ToggleId::AudioAlerts => "audioAlerts",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ToggleId::GpsLocation => "Manual GPS Location",
            ToggleId::HideAfds => "Hide AFDs",
            ToggleId::ChaseMode => "Chase Mode",
            ToggleId::AudioAlerts => "Audio Alerts",
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.id() == id)
    }

    pub fn get(&self, toggles: &Toggles) -> bool {
        match self {
            ToggleId::GpsLocation => toggles.manual_location,
            ToggleId::HideAfds => toggles.hide_afds,
            ToggleId::ChaseMode => toggles.chase_mode,
            ToggleId::AudioAlerts => toggles.audio_alerts,
        }
    }

    pub fn set(&self, toggles: &mut Toggles, value: bool) {
        match self {
            ToggleId::GpsLocation => toggles.manual_location = value,
            ToggleId::HideAfds => toggles.hide_afds = value,
            ToggleId::ChaseMode => toggles.chase_mode = value,
            ToggleId::AudioAlerts => toggles.audio_alerts = value,
        }
    }

    /// Flips the switch and returns its new value.
    pub fn flip(&self, toggles: &mut Toggles) -> bool {
        let value = !self.get(toggles);
        self.set(toggles, value);
        value
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigItem {
    id: String,
    #[serde(default)]
    text: String,
    toggled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManualBlob {
    #[serde(default)]
    manual_lat: Option<f64>,
    #[serde(default)]
    manual_lon: Option<f64>,
}

/// Persists [`Settings`] as the two JSON blobs the panel reads and writes.
pub struct SettingsStore {
    dir: PathBuf,
}

impl SettingsStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn read_blob<T: for<'de> Deserialize<'de>>(&self, name: &str) -> Option<T> {
        let path = self.dir.join(name);
        let contents = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(value) => Some(value),
            Err(err) => {
                log::error!("Error loading config {}: {}", path.display(), err);
                None
            }
        }
    }

    /// Missing or malformed blobs leave the defaults in place.
    pub fn load(&self) -> Settings {
        let mut settings = Settings::default();

        if let Some(items) = self.read_blob::<Vec<ConfigItem>>(ITEMS_FILE) {
            for item in items {
                match ToggleId::parse(&item.id) {
                    Some(toggle) => toggle.set(&mut settings.toggles, item.toggled),
                    None => log::warn!("ignoring unknown config item {}", item.id),
                }
            }
        }
        if let Some(blob) = self.read_blob::<ManualBlob>(CONFIG_FILE) {
            settings.manual = ManualLocation {
                lat: blob.manual_lat,
                lon: blob.manual_lon,
            };
        }

        log::info!("Loaded config.");
        settings
    }

    pub fn save(&self, settings: &Settings) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating settings dir {}", self.dir.display()))?;

        let items: Vec<ConfigItem> = ToggleId::ALL
            .into_iter()
            .map(|t| ConfigItem {
                id: t.id().to_string(),
                text: t.label().to_string(),
                toggled: t.get(&settings.toggles),
            })
            .collect();
        let manual = ManualBlob {
            manual_lat: settings.manual.lat,
            manual_lon: settings.manual.lon,
        };

        for (name, body) in [
            (ITEMS_FILE, serde_json::to_string_pretty(&items)?),
            (CONFIG_FILE, serde_json::to_string_pretty(&manual)?),
        ] {
            let path = self.dir.join(name);
            fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
        }
        Ok(())
    }
}
