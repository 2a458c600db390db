//! Daily report assembly.
//!
//! Loads the history, feedback, and live fleet snapshots from the data
//! directory, runs the three aggregations, attaches the chart series, and
//! persists the result keyed by date.

use crate::analyzers::types::{ChartSeries, DailyReport, ReportCharts};
use crate::analyzers::{feedback_stats, route_performance, utilization};
use crate::fleet::FleetState;
use crate::history::{FeedbackLog, History};
use crate::store::{DataPaths, load_json, save_json};
use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::info;

/// Builds and persists the daily report over the trailing `days` window.
pub fn generate_daily_report(paths: &DataPaths, days: i64, now: DateTime<Utc>) -> Result<DailyReport> {
    let history: History = load_json(&paths.history());
    let feedback_log: FeedbackLog = load_json(&paths.feedback());
    let fleet: FleetState = load_json(&paths.bus_data());

    let utilization = utilization(&history.occupancy_records(), days, now);
    let route_performance = route_performance(&history.travel_records(), days, now);
    let feedback = feedback_stats(&feedback_log.feedbacks);

    let charts = ReportCharts {
        hourly_utilization: ChartSeries {
            labels: utilization
                .hourly_averages
                .keys()
                .map(|hour| format!("{hour}:00"))
                .collect(),
            values: utilization.hourly_averages.values().copied().collect(),
        },
        route_times: ChartSeries {
            labels: route_performance.routes.keys().cloned().collect(),
            values: route_performance
                .routes
                .values()
                .map(|r| r.avg_time_minutes)
                .collect(),
        },
        route_speeds: ChartSeries {
            labels: route_performance.routes.keys().cloned().collect(),
            values: route_performance
                .routes
                .values()
                .map(|r| r.avg_speed_kmh)
                .collect(),
        },
    };

    let date = now.format("%Y-%m-%d").to_string();
    let report = DailyReport {
        date: date.clone(),
        generated_at: now,
        active_buses: fleet.active_buses(),
        utilization,
        route_performance,
        feedback,
        charts,
    };

    save_json(&paths.report_for(&date), &report)?;

    info!(
        date = %report.date,
        active_buses = report.active_buses,
        average_occupancy = report.utilization.average_occupancy,
        busiest_bus = %report.utilization.busiest_bus,
        peak_time = %report.utilization.peak_time,
        total_feedback = report.feedback.total_feedback,
        average_rating = report.feedback.average_rating,
        "daily report generated"
    );

    Ok(report)
}
