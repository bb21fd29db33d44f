pub mod dispatch;
pub mod intent;
pub mod queue;
pub mod render;

pub use dispatch::{spawn_audio_worker, AudioHandle, AudioOutput};
pub use intent::{build_alert, classify, AlertIntent, SEVERE_HAIL_INCHES};
pub use queue::{AlertItem, AudioAlertQueue, QueueAction, QueueState, DEFAULT_SETTLE_DELAY, EAS_CLIP};
