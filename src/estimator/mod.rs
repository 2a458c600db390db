//! Arrival estimation: geodesic distance, traffic-adjusted travel time,
//! and occupancy classification.

pub mod eta;
pub mod occupancy;
pub mod traffic;

pub use eta::{Eta, EtaEstimator, geodesic_km};
pub use occupancy::{OccupancyColor, OccupancyStatus, apply_boarding, occupancy_color, occupancy_status};
pub use traffic::traffic_factor;
