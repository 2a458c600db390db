//! Windowed fleet analytics.
//!
//! This module turns historical occupancy, travel, and feedback snapshots
//! into the utilization, route-performance, and feedback reports, and
//! assembles them into the persisted daily report.

pub mod feedback;
pub mod report;
pub mod route_perf;
pub mod types;
pub mod utilization;
pub mod utility;

pub use feedback::feedback_stats;
pub use report::generate_daily_report;
pub use route_perf::route_performance;
pub use utilization::utilization;
