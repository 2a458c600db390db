//! Occupancy utilization aggregation.

use crate::analyzers::types::UtilizationReport;
use crate::analyzers::utility::{mean, round1};
use crate::records::{OccupancyRecord, parse_timestamp};
use chrono::{DateTime, Duration, Timelike, Utc};
use std::collections::BTreeMap;
use tracing::warn;

/// Aggregates occupancy records over the trailing `days` window ending at
/// `now`.
///
/// Records with unparseable timestamps or zero capacity are skipped with a
/// warning. Bus and hour ties break to the smallest identifier: the input is
/// accumulated into ordered maps, and max/min selection only replaces the
/// current winner on a strictly better value.
pub fn utilization(records: &[OccupancyRecord], days: i64, now: DateTime<Utc>) -> UtilizationReport {
    let cutoff = now - Duration::days(days);

    let mut bus_sums: BTreeMap<&str, (f64, u32)> = BTreeMap::new();
    let mut hourly: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    let mut all_values = Vec::new();

    for record in records {
        let Some(timestamp) = parse_timestamp(&record.timestamp) else {
            warn!(
                bus_id = %record.bus_id,
                timestamp = %record.timestamp,
                "skipping occupancy record with unparseable timestamp"
            );
            continue;
        };
        if timestamp < cutoff {
            continue;
        }
        if record.capacity == 0 {
            warn!(bus_id = %record.bus_id, "skipping occupancy record with zero capacity");
            continue;
        }

        let pct = (record.occupancy as f64 / record.capacity as f64) * 100.0;

        let entry = bus_sums.entry(record.bus_id.as_str()).or_insert((0.0, 0));
        entry.0 += pct;
        entry.1 += 1;

        hourly.entry(timestamp.hour()).or_default().push(pct);
        all_values.push(pct);
    }

    if all_values.is_empty() {
        return UtilizationReport::empty();
    }

    let bus_averages: BTreeMap<&str, f64> = bus_sums
        .iter()
        .map(|(bus_id, (sum, count))| (*bus_id, sum / *count as f64))
        .collect();

    let hourly_averages: BTreeMap<u32, f64> = hourly
        .iter()
        .map(|(hour, values)| (*hour, mean(values)))
        .collect();

    let mut busiest: Option<(&str, f64)> = None;
    let mut least_busy: Option<(&str, f64)> = None;
    for (bus_id, avg) in &bus_averages {
        match busiest {
            Some((_, current)) if *avg <= current => {}
            _ => busiest = Some((*bus_id, *avg)),
        }
        match least_busy {
            Some((_, current)) if *avg >= current => {}
            _ => least_busy = Some((*bus_id, *avg)),
        }
    }
    let busiest = busiest.unwrap_or(("N/A", 0.0));
    let least_busy = least_busy.unwrap_or(("N/A", 0.0));

    let mut peak: Option<(u32, f64)> = None;
    for (hour, avg) in &hourly_averages {
        match peak {
            Some((_, current)) if *avg <= current => {}
            _ => peak = Some((*hour, *avg)),
        }
    }

    let (peak_time, peak_occupancy) = match peak {
        Some((hour, avg)) => (format!("{hour}:00"), round1(avg)),
        None => ("N/A".to_string(), 0.0),
    };

    UtilizationReport {
        average_occupancy: round1(mean(&all_values)),
        peak_time,
        peak_occupancy,
        busiest_bus: busiest.0.to_string(),
        busiest_bus_avg: round1(busiest.1),
        least_busy_bus: least_busy.0.to_string(),
        least_busy_bus_avg: round1(least_busy.1),
        hourly_averages: hourly_averages
            .into_iter()
            .map(|(hour, avg)| (hour, round1(avg)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn record(bus_id: &str, timestamp: &str, occupancy: u32, capacity: u32) -> OccupancyRecord {
        OccupancyRecord {
            bus_id: bus_id.to_string(),
            timestamp: timestamp.to_string(),
            occupancy,
            capacity,
        }
    }

    #[test]
    fn test_empty_input_returns_sentinel() {
        let report = utilization(&[], 7, now());
        assert_eq!(report.average_occupancy, 0.0);
        assert_eq!(report.peak_time, "N/A");
        assert_eq!(report.busiest_bus, "N/A");
        assert!(report.hourly_averages.is_empty());
    }

    #[test]
    fn test_single_morning_sample() {
        let records = vec![record("bus_1", "2025-03-10 08:00:00", 20, 40)];
        let report = utilization(&records, 7, now());

        assert_eq!(report.average_occupancy, 50.0);
        assert_eq!(report.peak_time, "8:00");
        assert_eq!(report.peak_occupancy, 50.0);
        assert_eq!(report.busiest_bus, "bus_1");
        assert_eq!(report.busiest_bus_avg, 50.0);
        assert_eq!(report.least_busy_bus, "bus_1");
        assert_eq!(report.hourly_averages[&8], 50.0);
    }

    #[test]
    fn test_global_average_weights_by_sample_count() {
        // bus_a has two samples at 25%, bus_b one at 100%. The global
        // average flattens all values: (25 + 25 + 100) / 3 = 50, not the
        // mean of per-bus averages (62.5).
        let records = vec![
            record("bus_a", "2025-03-10 08:00:00", 10, 40),
            record("bus_a", "2025-03-10 09:00:00", 10, 40),
            record("bus_b", "2025-03-10 10:00:00", 40, 40),
        ];
        let report = utilization(&records, 7, now());
        assert_eq!(report.average_occupancy, 50.0);
        assert_eq!(report.busiest_bus, "bus_b");
        assert_eq!(report.least_busy_bus, "bus_a");
    }

    #[test]
    fn test_old_records_excluded_from_window() {
        let records = vec![
            record("bus_1", "2025-03-02 08:00:00", 40, 40), // 8 days old
            record("bus_1", "2025-03-09 10:00:00", 10, 40),
        ];
        let report = utilization(&records, 7, now());
        assert_eq!(report.average_occupancy, 25.0);
        assert_eq!(report.peak_time, "10:00");
    }

    #[test]
    fn test_everything_outside_window_yields_sentinel() {
        let records = vec![record("bus_1", "2025-01-01 08:00:00", 20, 40)];
        let report = utilization(&records, 7, now());
        assert_eq!(report.busiest_bus, "N/A");
    }

    #[test]
    fn test_bad_records_skipped_not_fatal() {
        let records = vec![
            record("bus_1", "not a timestamp", 20, 40),
            record("bus_2", "2025-03-10 08:00:00", 20, 0),
            record("bus_3", "2025-03-10 08:00:00", 30, 40),
        ];
        let report = utilization(&records, 7, now());
        assert_eq!(report.busiest_bus, "bus_3");
        assert_eq!(report.average_occupancy, 75.0);
    }

    #[test]
    fn test_ties_break_to_first_sorted_identifier() {
        let records = vec![
            record("bus_b", "2025-03-10 08:00:00", 20, 40),
            record("bus_a", "2025-03-10 09:00:00", 20, 40),
        ];
        let report = utilization(&records, 7, now());
        assert_eq!(report.busiest_bus, "bus_a");
        assert_eq!(report.least_busy_bus, "bus_a");
        // Hours tie at 50% as well: the earlier hour wins.
        assert_eq!(report.peak_time, "8:00");
    }
}
