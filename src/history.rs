//! Historical record snapshots.
//!
//! The on-disk shape mirrors what the fleet producers append: occupancy
//! samples nested per bus and per hour bucket, travel samples per route.
//! Analyzers never walk the nested maps directly; they consume the flattened
//! record lists, which iterate buses, buckets, and routes in sorted order so
//! that tie-breaks in the reports are deterministic.

use crate::records::{FeedbackRecord, OccupancyRecord, TravelRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One occupancy observation as stored in `history.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccupancySample {
    pub timestamp: String,
    pub occupancy: u32,
    pub capacity: u32,
}

/// One travel observation as stored in `history.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelSample {
    pub timestamp: String,
    /// Estimated duration as `"HH:MM"`.
    pub estimated_time: String,
    /// Distance in kilometers.
    pub distance: f64,
}

/// The append-only history snapshot.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct History {
    /// bus id -> hour bucket ("08", "14", ...) -> samples.
    #[serde(default)]
    pub occupancy_patterns: BTreeMap<String, BTreeMap<String, Vec<OccupancySample>>>,
    /// route id -> samples.
    #[serde(default)]
    pub travel_times: BTreeMap<String, Vec<TravelSample>>,
}

impl History {
    /// Flattens the nested occupancy maps into typed records, buses and
    /// buckets in sorted order.
    pub fn occupancy_records(&self) -> Vec<OccupancyRecord> {
        let mut records = Vec::new();
        for (bus_id, buckets) in &self.occupancy_patterns {
            for samples in buckets.values() {
                for sample in samples {
                    records.push(OccupancyRecord {
                        bus_id: bus_id.clone(),
                        timestamp: sample.timestamp.clone(),
                        occupancy: sample.occupancy,
                        capacity: sample.capacity,
                    });
                }
            }
        }
        records
    }

    /// Flattens the travel map into typed records, routes in sorted order.
    pub fn travel_records(&self) -> Vec<TravelRecord> {
        let mut records = Vec::new();
        for (route_id, samples) in &self.travel_times {
            for sample in samples {
                records.push(TravelRecord {
                    route_id: route_id.clone(),
                    timestamp: sample.timestamp.clone(),
                    estimated_time: sample.estimated_time.clone(),
                    distance: sample.distance,
                });
            }
        }
        records
    }

    /// Appends an occupancy sample under the given hour bucket.
    pub fn record_occupancy(&mut self, bus_id: &str, bucket: &str, sample: OccupancySample) {
        self.occupancy_patterns
            .entry(bus_id.to_string())
            .or_default()
            .entry(bucket.to_string())
            .or_default()
            .push(sample);
    }

    /// Appends a travel sample for a route.
    pub fn record_travel(&mut self, route_id: &str, sample: TravelSample) {
        self.travel_times
            .entry(route_id.to_string())
            .or_default()
            .push(sample);
    }
}

/// The rider feedback snapshot (`feedback.json`).
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct FeedbackLog {
    #[serde(default)]
    pub feedbacks: Vec<FeedbackRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ts: &str, occupancy: u32) -> OccupancySample {
        OccupancySample {
            timestamp: ts.to_string(),
            occupancy,
            capacity: 40,
        }
    }

    #[test]
    fn test_flatten_orders_buses_and_buckets() {
        let mut history = History::default();
        history.record_occupancy("bus_b", "09", sample("2025-03-10 09:00:00", 10));
        history.record_occupancy("bus_a", "14", sample("2025-03-10 14:00:00", 20));
        history.record_occupancy("bus_a", "08", sample("2025-03-10 08:00:00", 30));

        let records = history.occupancy_records();
        let order: Vec<_> = records
            .iter()
            .map(|r| (r.bus_id.as_str(), r.occupancy))
            .collect();
        assert_eq!(order, vec![("bus_a", 30), ("bus_a", 20), ("bus_b", 10)]);
    }

    #[test]
    fn test_travel_records_flatten() {
        let mut history = History::default();
        history.record_travel(
            "mens",
            TravelSample {
                timestamp: "2025-03-10 08:00:00".to_string(),
                estimated_time: "00:15".to_string(),
                distance: 3.2,
            },
        );
        let records = history.travel_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].route_id, "mens");
        assert_eq!(records[0].estimated_time, "00:15");
    }

    #[test]
    fn test_deserialize_missing_sections_defaults() {
        let history: History = serde_json::from_str("{}").unwrap();
        assert!(history.occupancy_patterns.is_empty());
        assert!(history.travel_times.is_empty());
    }
}
