//! Data types produced by the analytics pipeline.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Fleet-wide occupancy summary over the trailing window.
#[derive(Debug, Serialize)]
pub struct UtilizationReport {
    /// Mean of every individual occupancy percentage in the window, so
    /// buses with more samples weigh more.
    pub average_occupancy: f64,
    /// Hour with the highest average occupancy, as `"8:00"`, or `"N/A"`.
    pub peak_time: String,
    pub peak_occupancy: f64,
    pub busiest_bus: String,
    pub busiest_bus_avg: f64,
    pub least_busy_bus: String,
    pub least_busy_bus_avg: f64,
    /// Average occupancy percentage per hour of day, ascending.
    pub hourly_averages: BTreeMap<u32, f64>,
}

impl UtilizationReport {
    /// The sentinel returned for an empty window.
    pub fn empty() -> Self {
        UtilizationReport {
            average_occupancy: 0.0,
            peak_time: "N/A".to_string(),
            peak_occupancy: 0.0,
            busiest_bus: "N/A".to_string(),
            busiest_bus_avg: 0.0,
            least_busy_bus: "N/A".to_string(),
            least_busy_bus_avg: 0.0,
            hourly_averages: BTreeMap::new(),
        }
    }
}

/// Per-route aggregates over the trailing window.
#[derive(Debug, Serialize)]
pub struct RouteStats {
    pub avg_time_minutes: f64,
    pub avg_distance_km: f64,
    pub avg_speed_kmh: f64,
    pub samples: usize,
}

/// Route comparison summary.
#[derive(Debug, Serialize)]
pub struct RoutePerformanceReport {
    pub routes: BTreeMap<String, RouteStats>,
    pub fastest_route: String,
    pub fastest_route_time: f64,
    pub slowest_route: String,
    pub slowest_route_time: f64,
}

impl RoutePerformanceReport {
    pub fn empty() -> Self {
        RoutePerformanceReport {
            routes: BTreeMap::new(),
            fastest_route: "N/A".to_string(),
            fastest_route_time: 0.0,
            slowest_route: "N/A".to_string(),
            slowest_route_time: 0.0,
        }
    }
}

/// Rider feedback summary.
#[derive(Debug, Serialize)]
pub struct FeedbackReport {
    pub total_feedback: usize,
    pub average_rating: f64,
    pub bus_ratings: BTreeMap<String, f64>,
}

impl FeedbackReport {
    pub fn empty() -> Self {
        FeedbackReport {
            total_feedback: 0,
            average_rating: 0.0,
            bus_ratings: BTreeMap::new(),
        }
    }
}

/// A labeled numeric series handed to the visualization collaborator.
#[derive(Debug, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// The numeric series behind the daily report's charts.
#[derive(Debug, Serialize)]
pub struct ReportCharts {
    pub hourly_utilization: ChartSeries,
    pub route_times: ChartSeries,
    pub route_speeds: ChartSeries,
}

/// The assembled daily report, persisted under `reports/`.
#[derive(Debug, Serialize)]
pub struct DailyReport {
    pub date: String,
    pub generated_at: DateTime<Utc>,
    pub utilization: UtilizationReport,
    pub route_performance: RoutePerformanceReport,
    pub feedback: FeedbackReport,
    pub active_buses: usize,
    pub charts: ReportCharts,
}
