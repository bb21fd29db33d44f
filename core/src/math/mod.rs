pub mod geo;
pub mod time;

pub use geo::{Bounds, GeoHelper, LatLon};
pub use time::TimeHelper;
