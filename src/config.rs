//! Engine configuration: campus geography, route definitions, traffic
//! profile, and fleet defaults.
//!
//! The built-in defaults describe the VIT Vellore campus the fleet runs on.
//! A JSON file with the same shape can be loaded to override them; loading
//! validates the traffic-profile invariant (every multiplier > 0).

use crate::records::GeoPoint;
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// A named campus stop with its coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stop {
    pub name: String,
    pub coords: GeoPoint,
}

/// A shuttle route: ordered stop keys, a display color, and the buses
/// assigned to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDef {
    pub route_name: String,
    pub stops: Vec<String>,
    pub color: String,
    pub bus_ids: Vec<String>,
}

/// Hour-of-day traffic multipliers, split into weekday and weekend tables.
/// Hours absent from a table fall back to a multiplier of 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficProfile {
    pub weekday: BTreeMap<u32, f64>,
    pub weekend: BTreeMap<u32, f64>,
}

impl TrafficProfile {
    pub fn multiplier(&self, hour: u32, weekend: bool) -> f64 {
        let table = if weekend { &self.weekend } else { &self.weekday };
        table.get(&hour).copied().unwrap_or(1.0)
    }

    fn validate(&self) -> Result<()> {
        for (label, table) in [("weekday", &self.weekday), ("weekend", &self.weekend)] {
            for (hour, factor) in table {
                if *hour > 23 {
                    bail!("traffic profile {label} has out-of-range hour {hour}");
                }
                if *factor <= 0.0 {
                    bail!("traffic profile {label} hour {hour} has non-positive multiplier {factor}");
                }
            }
        }
        Ok(())
    }
}

/// Immutable engine configuration, passed in at construction instead of
/// living as module-level globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub stops: BTreeMap<String, Stop>,
    pub routes: BTreeMap<String, RouteDef>,
    pub traffic: TrafficProfile,
    pub default_speed_kmh: f64,
    pub default_capacity: u32,
    pub max_occupancy: u32,
    /// Live-data refresh interval in seconds, used as the simulator tick.
    pub refresh_interval_secs: u64,
}

impl Config {
    /// Loads a config override from a JSON file at `path` and validates it.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.traffic.validate()?;
        if self.default_speed_kmh <= 0.0 {
            bail!("default_speed_kmh must be positive");
        }
        for (route_id, route) in &self.routes {
            for stop_key in &route.stops {
                if !self.stops.contains_key(stop_key) {
                    warn!(%route_id, %stop_key, "route references unknown stop");
                }
            }
        }
        Ok(())
    }

    /// Fetches a route definition, logging a warning when the id is unknown.
    pub fn route_info(&self, route_id: &str) -> Option<&RouteDef> {
        let route = self.routes.get(route_id);
        if route.is_none() {
            warn!(route_id, "route not found in config");
        }
        route
    }

    /// Returns the display names of a route's first and last stop, with
    /// `"Unknown"` fallbacks for missing routes or stops.
    pub fn start_and_end(&self, route_id: &str) -> (String, String) {
        let Some(route) = self.route_info(route_id) else {
            return ("Unknown".to_string(), "Unknown".to_string());
        };
        let name_of = |key: Option<&String>| {
            key.and_then(|k| self.stops.get(k))
                .map(|s| s.name.clone())
                .unwrap_or_else(|| "Unknown".to_string())
        };
        (name_of(route.stops.first()), name_of(route.stops.last()))
    }

    pub fn stop_coords(&self, key: &str) -> Option<GeoPoint> {
        self.stops.get(key).map(|s| s.coords)
    }
}

impl Default for Config {
    fn default() -> Self {
        let stop = |name: &str, lat: f64, lon: f64| Stop {
            name: name.to_string(),
            coords: GeoPoint::new(lat, lon),
        };

        let stops = BTreeMap::from([
            ("MB".to_string(), stop("Main Building", 12.968778, 79.155930)),
            ("SJT".to_string(), stop("Silver Jubilee Tower", 12.971722, 79.163551)),
            ("TT".to_string(), stop("Technology Tower", 12.971158, 79.159851)),
            ("PRP".to_string(), stop("Pearl Research Park", 12.972297, 79.166208)),
            ("GDN".to_string(), stop("GDN Canteen", 12.969740, 79.155324)),
            ("MG".to_string(), stop("Main Gate", 12.968441, 79.155930)),
            ("C-Block".to_string(), stop("C Block (Ladies Hostel)", 12.973532, 79.167640)),
            ("Q-Block".to_string(), stop("Q Block (Mens Hostel)", 12.973907, 79.164084)),
            ("M-Block".to_string(), stop("M Block (Mens Hostel)", 12.973033, 79.163700)),
            ("K-Block".to_string(), stop("K Block (Mens Hostel)", 12.972634, 79.161377)),
            ("G-Block".to_string(), stop("G Block (Mens Hostel)", 12.974241, 79.158467)),
            ("B-Block".to_string(), stop("B Block (Mens Hostel)", 12.974383, 79.156826)),
            ("P-Block".to_string(), stop("P Block (Mens Hostel)", 12.974891, 79.158670)),
        ]);

        let routes = BTreeMap::from([
            (
                "ladies".to_string(),
                RouteDef {
                    route_name: "Ladies Hostel Shuttle".to_string(),
                    stops: ["PRP", "SJT", "C-Block", "MG"]
                        .map(str::to_string)
                        .to_vec(),
                    color: "#FF69B4".to_string(),
                    bus_ids: ["bus_L1", "bus_L2", "bus_L3", "bus_L4"]
                        .map(str::to_string)
                        .to_vec(),
                },
            ),
            (
                "mens".to_string(),
                RouteDef {
                    route_name: "Mens Hostel Shuttle".to_string(),
                    stops: ["Q-Block", "M-Block", "K-Block", "G-Block", "B-Block", "P-Block", "MG"]
                        .map(str::to_string)
                        .to_vec(),
                    color: "#0066FF".to_string(),
                    bus_ids: ["bus_M1", "bus_M2", "bus_M3", "bus_M4", "bus_M5", "bus_M6"]
                        .map(str::to_string)
                        .to_vec(),
                },
            ),
        ]);

        let weekday = BTreeMap::from([
            (8, 1.5), (9, 1.4), (10, 1.2), (11, 1.0), (12, 1.1), (13, 1.1), (14, 1.0),
            (15, 1.0), (16, 1.2), (17, 1.5), (18, 1.4), (19, 1.2), (20, 1.0),
            (21, 0.9), (22, 0.8),
        ]);
        let weekend = BTreeMap::from([
            (8, 0.9), (9, 0.9), (10, 1.0), (11, 1.1), (12, 1.2), (13, 1.2), (14, 1.1),
            (15, 1.0), (16, 1.0), (17, 1.1), (18, 1.2), (19, 1.1), (20, 1.0),
            (21, 0.9), (22, 0.8),
        ]);

        Config {
            stops,
            routes,
            traffic: TrafficProfile { weekday, weekend },
            default_speed_kmh: 20.0,
            default_capacity: 40,
            max_occupancy: 45,
            refresh_interval_secs: 30,
        }
    }
}
