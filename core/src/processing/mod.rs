pub mod alerting;
pub mod enrich;
pub mod filter;
pub mod massage;
pub mod retention;

pub use alerting::AlertStage;
pub use enrich::{enrich, EnrichStage};
pub use filter::{include, FilterStage};
pub use massage::{massage, MassageStage};
pub use retention::{truncate, RetentionStage};
