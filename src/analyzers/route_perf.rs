//! Route performance aggregation.

use crate::analyzers::types::{RoutePerformanceReport, RouteStats};
use crate::analyzers::utility::{mean, round1, round2};
use crate::records::{TravelRecord, parse_timestamp};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use tracing::warn;

/// Parses an estimated duration string as minutes.
///
/// The producers write `"HH:MM"`, and the split keeps those semantics
/// literally: `"15:30"` is 15 hours 30 minutes, i.e. 930 — not 15m30s.
/// Components past the second are ignored. Returns `None` when either of
/// the first two components is missing or not an integer.
fn parse_duration_minutes(value: &str) -> Option<i64> {
    let mut parts = value.split(':');
    let hours: i64 = parts.next()?.trim().parse().ok()?;
    let minutes: i64 = parts.next()?.trim().parse().ok()?;
    Some(hours * 60 + minutes)
}

/// Aggregates travel records over the trailing `days` window ending at
/// `now`. Malformed timestamps or duration strings skip the record with a
/// warning; route ties for fastest/slowest break to the smallest route id.
pub fn route_performance(
    records: &[TravelRecord],
    days: i64,
    now: DateTime<Utc>,
) -> RoutePerformanceReport {
    let cutoff = now - Duration::days(days);

    let mut route_times: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    let mut route_distances: BTreeMap<&str, Vec<f64>> = BTreeMap::new();

    for record in records {
        let Some(timestamp) = parse_timestamp(&record.timestamp) else {
            warn!(
                route_id = %record.route_id,
                timestamp = %record.timestamp,
                "skipping travel record with unparseable timestamp"
            );
            continue;
        };
        if timestamp < cutoff {
            continue;
        }
        let Some(minutes) = parse_duration_minutes(&record.estimated_time) else {
            warn!(
                route_id = %record.route_id,
                estimated_time = %record.estimated_time,
                "skipping travel record with malformed duration"
            );
            continue;
        };

        route_times
            .entry(record.route_id.as_str())
            .or_default()
            .push(minutes as f64);
        route_distances
            .entry(record.route_id.as_str())
            .or_default()
            .push(record.distance);
    }

    if route_times.is_empty() {
        return RoutePerformanceReport::empty();
    }

    let mut routes = BTreeMap::new();
    let mut fastest: Option<(&str, f64)> = None;
    let mut slowest: Option<(&str, f64)> = None;

    for (route_id, times) in &route_times {
        let avg_time = mean(times);
        let avg_distance = mean(&route_distances[route_id]);
        let avg_speed = if avg_time > 0.0 {
            avg_distance / (avg_time / 60.0)
        } else {
            0.0
        };

        match fastest {
            Some((_, current)) if avg_time >= current => {}
            _ => fastest = Some((*route_id, avg_time)),
        }
        match slowest {
            Some((_, current)) if avg_time <= current => {}
            _ => slowest = Some((*route_id, avg_time)),
        }

        routes.insert(
            route_id.to_string(),
            RouteStats {
                avg_time_minutes: round1(avg_time),
                avg_distance_km: round2(avg_distance),
                avg_speed_kmh: round1(avg_speed),
                samples: times.len(),
            },
        );
    }

    let fastest = fastest.unwrap_or(("N/A", 0.0));
    let slowest = slowest.unwrap_or(("N/A", 0.0));

    RoutePerformanceReport {
        routes,
        fastest_route: fastest.0.to_string(),
        fastest_route_time: round1(fastest.1),
        slowest_route: slowest.0.to_string(),
        slowest_route_time: round1(slowest.1),
    }
}
