//! Event ingestion and alert derivation core for the sware severe-weather monitor.
//!
//! Feed records are enriched with geometry and classification on arrival, then
//! every refresh cycle runs alert latching, retention, per-cycle massaging and
//! display filtering. Alert intents drain through a single serialized audio queue.

pub mod alert;
pub mod feed;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use prelude::{CycleContext, ProcessingStage, Settings, StageInput, StageOutput};
