//! Rider feedback aggregation.

use crate::analyzers::types::FeedbackReport;
use crate::analyzers::utility::round2;
use crate::records::FeedbackRecord;
use std::collections::BTreeMap;

/// Summarizes feedback entries: overall average plus per-bus averages, both
/// rounded to 2 decimals. Feedback is not time-windowed.
pub fn feedback_stats(entries: &[FeedbackRecord]) -> FeedbackReport {
    if entries.is_empty() {
        return FeedbackReport::empty();
    }

    let total = entries.len();
    let ratings_sum: u32 = entries.iter().map(|e| e.rating as u32).sum();

    let mut by_bus: BTreeMap<&str, (u32, u32)> = BTreeMap::new();
    for entry in entries {
        let slot = by_bus.entry(entry.bus_id.as_str()).or_insert((0, 0));
        slot.0 += entry.rating as u32;
        slot.1 += 1;
    }

    FeedbackReport {
        total_feedback: total,
        average_rating: round2(ratings_sum as f64 / total as f64),
        bus_ratings: by_bus
            .into_iter()
            .map(|(bus_id, (sum, count))| (bus_id.to_string(), round2(sum as f64 / count as f64)))
            .collect(),
    }
}
