//! Time-of-day traffic factor.

use chrono::Weekday;

/// Returns the traffic multiplier for an hour of day and day of week.
///
/// Pure and deterministic. The time bands are a design constant:
///
/// | hour  | factor |
/// |-------|--------|
/// | 7–10  | 1.5    |
/// | 16–19 | 1.4    |
/// | 11–15 | 1.2    |
/// | 20–22 | 1.1    |
/// | else  | 0.9    |
///
/// Weekends scale the band factor by 0.8. The result is rounded to
/// 2 decimals.
pub fn traffic_factor(hour: u32, day: Weekday) -> f64 {
    let weekend_factor = match day {
        Weekday::Sat | Weekday::Sun => 0.8,
        _ => 1.0,
    };

    let time_factor: f64 = match hour {
        7..=10 => 1.5,
        16..=19 => 1.4,
        11..=15 => 1.2,
        20..=22 => 1.1,
        _ => 0.9,
    };

    (time_factor * weekend_factor * 100.0).round() / 100.0
}
