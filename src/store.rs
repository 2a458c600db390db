//! JSON and CSV persistence for snapshots, reports, and the sample log.
//!
//! Loads are lenient: a missing or undecodable file logs and yields the
//! default value, so a fresh data directory works without setup. Writes are
//! strict and propagate errors with context.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Well-known file locations under one data directory.
#[derive(Debug, Clone)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn bus_data(&self) -> PathBuf {
        self.root.join("bus_data.json")
    }

    pub fn history(&self) -> PathBuf {
        self.root.join("history.json")
    }

    pub fn feedback(&self) -> PathBuf {
        self.root.join("feedback.json")
    }

    pub fn samples_csv(&self) -> PathBuf {
        self.root.join("occupancy_samples.csv")
    }

    pub fn report_for(&self, date: &str) -> PathBuf {
        self.root.join("reports").join(format!("report_{date}.json"))
    }
}

/// Loads a JSON file, returning `T::default()` when the file is missing or
/// does not decode.
pub fn load_json<T: DeserializeOwned + Default>(path: &Path) -> T {
    if !path.exists() {
        info!(path = %path.display(), "file not found, using default");
        return T::default();
    }
    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to decode JSON, using default");
                T::default()
            }
        },
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read file, using default");
            T::default()
        }
    }
}

/// Serializes `value` as pretty JSON to `path`, creating parent directories.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let body = serde_json::to_string_pretty(value)?;
    std::fs::write(path, body).with_context(|| format!("writing {}", path.display()))?;
    debug!(path = %path.display(), "JSON saved");
    Ok(())
}

/// One row of the flat occupancy sample log the simulator appends.
#[derive(Debug, Serialize)]
pub struct SampleRow {
    pub timestamp: String,
    pub bus_id: String,
    pub route_id: String,
    pub occupancy: u32,
    pub capacity: u32,
    pub status: String,
}

/// Appends a [`SampleRow`] to a CSV file, writing headers only on creation.
pub fn append_sample_row(path: &Path, row: &SampleRow) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending CSV record");

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(row)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::History;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    fn row() -> SampleRow {
        SampleRow {
            timestamp: "2025-03-10 08:00:00".to_string(),
            bus_id: "bus_L1".to_string(),
            route_id: "ladies".to_string(),
            occupancy: 12,
            capacity: 40,
            status: "Light".to_string(),
        }
    }

    #[test]
    fn test_load_json_missing_file_returns_default() {
        let history: History = load_json(&temp_path("shuttle_stats_missing.json"));
        assert!(history.occupancy_patterns.is_empty());
    }

    #[test]
    fn test_load_json_bad_content_returns_default() {
        let path = temp_path("shuttle_stats_bad.json");
        fs::write(&path, "{not json").unwrap();
        let history: History = load_json(&path);
        assert!(history.travel_times.is_empty());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let path = temp_path("shuttle_stats_rt/history.json");
        let mut history = History::default();
        history.record_travel(
            "mens",
            crate::history::TravelSample {
                timestamp: "2025-03-10 08:00:00".to_string(),
                estimated_time: "00:12".to_string(),
                distance: 2.5,
            },
        );
        save_json(&path, &history).unwrap();

        let loaded: History = load_json(&path);
        assert_eq!(loaded.travel_times["mens"].len(), 1);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_sample_row_writes_header_once() {
        let path = temp_path("shuttle_stats_samples.csv");
        let _ = fs::remove_file(&path); // clean up any prior run

        append_sample_row(&path, &row()).unwrap();
        append_sample_row(&path, &row()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.contains("timestamp")).count();
        assert_eq!(header_count, 1);
        assert_eq!(content.lines().count(), 3);

        fs::remove_file(&path).unwrap();
    }
}
