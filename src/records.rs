//! Record types shared between the live fleet snapshot, the history store,
//! and the analyzers.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A geographic coordinate in degrees. Immutable by convention: producers
/// build new points rather than mutating existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether the coordinates are finite and within WGS-84 bounds.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// One flattened occupancy observation for a bus.
///
/// The timestamp stays a string until aggregation time so that a single bad
/// record can be skipped instead of failing the whole snapshot load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccupancyRecord {
    pub bus_id: String,
    pub timestamp: String,
    pub occupancy: u32,
    pub capacity: u32,
}

/// One flattened travel observation for a route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelRecord {
    pub route_id: String,
    pub timestamp: String,
    /// Estimated duration as `"HH:MM"`.
    pub estimated_time: String,
    /// Distance covered, in kilometers.
    pub distance: f64,
}

/// A single rider rating for a bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub bus_id: String,
    /// 1–5 integer rating.
    pub rating: u8,
}

/// Parses a record timestamp, accepting RFC 3339 as well as the plain
/// formats the fleet snapshots are written with. Returns `None` for anything
/// unparseable; callers skip such records.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}
