//! Occupancy arithmetic and classification.

use serde::Serialize;
use std::fmt;

/// Five-band occupancy description shown to riders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OccupancyStatus {
    Unknown,
    Empty,
    Light,
    Moderate,
    Crowded,
    Full,
}

impl fmt::Display for OccupancyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OccupancyStatus::Unknown => "Unknown",
            OccupancyStatus::Empty => "Empty",
            OccupancyStatus::Light => "Light",
            OccupancyStatus::Moderate => "Moderate",
            OccupancyStatus::Crowded => "Crowded",
            OccupancyStatus::Full => "Full",
        };
        f.write_str(s)
    }
}

/// Coarse three-band color for occupancy bars. Intentionally a separate
/// threshold scheme from [`OccupancyStatus`], not derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OccupancyColor {
    Gray,
    Green,
    Orange,
    Red,
}

impl fmt::Display for OccupancyColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OccupancyColor::Gray => "gray",
            OccupancyColor::Green => "green",
            OccupancyColor::Orange => "orange",
            OccupancyColor::Red => "red",
        };
        f.write_str(s)
    }
}

/// Applies a boarding or alighting event to the current occupancy.
///
/// Boarding is clamped at `capacity`, alighting at zero. Unsigned inputs and
/// saturating subtraction make both bounds hold for any arguments.
pub fn apply_boarding(current: u32, capacity: u32, boarding: bool, passengers: u32) -> u32 {
    if boarding {
        current.saturating_add(passengers).min(capacity)
    } else {
        current.saturating_sub(passengers)
    }
}

fn occupancy_pct(occupancy: u32, capacity: u32) -> f64 {
    (occupancy as f64 / capacity as f64) * 100.0
}

/// Classifies occupancy into the five-band status. Thresholds are strict:
/// exactly 50% is already `Moderate`, not `Light`.
pub fn occupancy_status(occupancy: u32, capacity: u32) -> OccupancyStatus {
    if capacity == 0 {
        return OccupancyStatus::Unknown;
    }
    let pct = occupancy_pct(occupancy, capacity);
    match pct {
        p if p < 30.0 => OccupancyStatus::Empty,
        p if p < 50.0 => OccupancyStatus::Light,
        p if p < 80.0 => OccupancyStatus::Moderate,
        p if p < 95.0 => OccupancyStatus::Crowded,
        _ => OccupancyStatus::Full,
    }
}

/// Maps occupancy to a display color using the coarse two-threshold scheme.
pub fn occupancy_color(occupancy: u32, capacity: u32) -> OccupancyColor {
    if capacity == 0 {
        return OccupancyColor::Gray;
    }
    let pct = occupancy_pct(occupancy, capacity);
    match pct {
        p if p < 50.0 => OccupancyColor::Green,
        p if p < 80.0 => OccupancyColor::Orange,
        _ => OccupancyColor::Red,
    }
}
