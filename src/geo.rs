//! Great-circle distance helper for the minimum-inter-station-distance filter
//!
//! Grounded on the `Haversine` metric space usage in the example pack's
//! geographic-information crate: a point is a `(lat, lon)` pair in decimal
//! degrees, distances are computed on a sphere of mean Earth radius, and
//! callers compare the result against a threshold in meters.

use geo::{Haversine, Distance, Point};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A geographic point, decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinate {
    /// Construct a coordinate from latitude/longitude in decimal degrees.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    fn as_point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// Great-circle distance between two coordinates, in meters.
pub fn distance_m(a: Coordinate, b: Coordinate) -> f64 {
    Haversine::distance(a.as_point(), b.as_point())
}

/// Returns the smallest distance, in meters, from `candidate` to any point
/// in `accepted`. `f64::INFINITY` if `accepted` is empty.
pub fn nearest_distance_m(candidate: Coordinate, accepted: &[Coordinate]) -> f64 {
    accepted
        .iter()
        .map(|p| distance_m(candidate, *p))
        .fold(f64::INFINITY, f64::min)
}
