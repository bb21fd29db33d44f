pub mod store;

pub use store::{SettingsStore, ToggleId};
