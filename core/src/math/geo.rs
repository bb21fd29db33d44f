use serde::{Deserialize, Serialize};

use crate::prelude::{CoreError, CoreResult};

/// Earth radius in miles, tuned for mid-latitudes (~39°N) rather than a global mean.
pub const EARTH_RADIUS_MILES: f64 = 3961.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Axis-aligned lat/lon rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl Bounds {
    pub fn min_corner(&self) -> LatLon {
        LatLon::new(self.min_lat, self.min_lon)
    }

    pub fn max_corner(&self) -> LatLon {
        LatLon::new(self.max_lat, self.max_lon)
    }
}

pub struct GeoHelper;

impl GeoHelper {
    /// Haversine distance in whole miles, truncated toward zero.
    pub fn distance_miles(a: LatLon, b: LatLon) -> u32 {
        let lat1 = a.lat.to_radians();
        let lat2 = b.lat.to_radians();
        let d_lat = (b.lat - a.lat).to_radians();
        let d_lon = (b.lon - a.lon).to_radians();

        let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

        // `as` saturates, and NaN collapses to zero.
        (EARTH_RADIUS_MILES * c).floor() as u32
    }

    /// Reduces a polygon to the rectangle spanned by its vertex extrema.
    pub fn bounds_of(poly: &[LatLon]) -> CoreResult<Bounds> {
        let first = poly.first().ok_or(CoreError::EmptyPolygon)?;
        let seed = Bounds {
            min_lat: first.lat,
            min_lon: first.lon,
            max_lat: first.lat,
            max_lon: first.lon,
        };

        Ok(poly.iter().fold(seed, |acc, v| Bounds {
            min_lat: acc.min_lat.min(v.lat),
            min_lon: acc.min_lon.min(v.lon),
            max_lat: acc.max_lat.max(v.lat),
            max_lon: acc.max_lon.max(v.lon),
        }))
    }

    /// Inclusive containment test on both axes.
    pub fn point_in_bounds(point: LatLon, bounds: &Bounds) -> bool {
        point.lat >= bounds.min_lat
            && point.lat <= bounds.max_lat
            && point.lon >= bounds.min_lon
            && point.lon <= bounds.max_lon
    }

    /// Mean of the vertex coordinates.
    ///
    /// Cheap and good enough for labelling and distance checks on compact warning
    /// polygons. It is not a true centroid and drifts badly on irregular shapes.
    pub fn centroid_approx(poly: &[LatLon]) -> CoreResult<LatLon> {
        if poly.is_empty() {
            return Err(CoreError::EmptyPolygon);
        }
        let n = poly.len() as f64;
        let (sum_lat, sum_lon) = poly
            .iter()
            .fold((0.0, 0.0), |(lat, lon), v| (lat + v.lat, lon + v.lon));
        Ok(LatLon::new(sum_lat / n, sum_lon / n))
    }

    /// Half of the great-circle diagonal of `bounds`, used as a rough polygon radius.
    pub fn half_diagonal_miles(bounds: &Bounds) -> f64 {
        f64::from(Self::distance_miles(bounds.min_corner(), bounds.max_corner())) / 2.0
    }
}
