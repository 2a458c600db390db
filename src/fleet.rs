//! Live fleet state (`bus_data.json`).

use crate::records::GeoPoint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current state of one bus, as published to the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusState {
    pub route_id: String,
    pub position: GeoPoint,
    /// Index into the route's stop list the bus is heading for.
    #[serde(default)]
    pub stop_index: usize,
    pub occupancy: u32,
    pub capacity: u32,
    /// Expected arrival at the next stop, `"HH:MM:SS"`.
    #[serde(default)]
    pub eta: String,
    /// Occupancy status label ("Empty", "Moderate", ...).
    #[serde(default)]
    pub status: String,
    #[serde(default = "default_on_time")]
    pub on_time: bool,
    #[serde(default)]
    pub distance_to_destination: f64,
    #[serde(default)]
    pub last_update: String,
}

fn default_on_time() -> bool {
    true
}

/// The full live snapshot: every bus plus the snapshot timestamp.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct FleetState {
    #[serde(default)]
    pub buses: BTreeMap<String, BusState>,
    #[serde(default)]
    pub last_updated: String,
}

impl FleetState {
    pub fn active_buses(&self) -> usize {
        self.buses.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot_has_no_active_buses() {
        let fleet: FleetState = serde_json::from_str("{}").unwrap();
        assert_eq!(fleet.active_buses(), 0);
    }

    #[test]
    fn test_bus_state_tolerates_sparse_json() {
        let json = r#"{
            "buses": {
                "bus_L1": {
                    "route_id": "ladies",
                    "position": {"lat": 12.97, "lon": 79.16},
                    "occupancy": 12,
                    "capacity": 40
                }
            }
        }"#;
        let fleet: FleetState = serde_json::from_str(json).unwrap();
        let bus = &fleet.buses["bus_L1"];
        assert_eq!(bus.occupancy, 12);
        assert!(bus.on_time);
        assert_eq!(bus.eta, "");
        assert_eq!(fleet.active_buses(), 1);
    }
}
