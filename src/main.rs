//! CLI entry point for the shuttle stats tool.
//!
//! Provides subcommands for generating the daily analytics report, printing
//! individual reports, estimating arrivals between campus stops, and running
//! the fleet simulator against a data directory.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use clap::{Parser, Subcommand};
use shuttle_stats::analyzers::{
    feedback_stats, generate_daily_report, route_performance, utilization,
};
use shuttle_stats::config::Config;
use shuttle_stats::estimator::{EtaEstimator, traffic_factor};
use shuttle_stats::fleet::FleetState;
use shuttle_stats::history::{FeedbackLog, History};
use shuttle_stats::records::GeoPoint;
use shuttle_stats::sim::Simulator;
use shuttle_stats::store::{DataPaths, append_sample_row, load_json, save_json};
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "shuttle_stats")]
#[command(about = "A tool to analyze campus shuttle fleet data", long_about = None)]
struct Cli {
    /// Data directory holding the fleet snapshots (defaults to $DATA_DIR or "data")
    #[arg(short, long, global = true)]
    data_dir: Option<String>,

    /// Optional JSON config overriding the built-in campus configuration
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate and persist the daily analytics report
    Report {
        /// Trailing window in days
        #[arg(long, default_value_t = 7)]
        days: i64,
    },
    /// Print the bus utilization report
    Utilization {
        #[arg(long, default_value_t = 7)]
        days: i64,
    },
    /// Print the route performance report
    Routes {
        #[arg(long, default_value_t = 7)]
        days: i64,
    },
    /// Print the rider feedback report
    Feedback,
    /// Estimate the arrival time between two stops
    Estimate {
        /// Start: a stop key (e.g. "MB") or "lat,lon"
        from: String,

        /// Destination: a stop key or "lat,lon"
        to: String,

        /// Nominal speed in km/h (defaults to the configured fleet speed)
        #[arg(short, long)]
        speed: Option<f64>,

        /// Hour of day for the traffic factor (defaults to the current hour)
        #[arg(long)]
        hour: Option<u32>,

        /// Apply the weekend traffic discount
        #[arg(long, default_value_t = false)]
        weekend: bool,

        /// Seed the jitter for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run the fleet simulator, appending snapshots and history samples
    Simulate {
        /// Number of ticks to run
        #[arg(short = 'n', long, default_value_t = 10)]
        ticks: u32,

        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/shuttle_stats.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("shuttle_stats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path).with_context(|| format!("loading config {path}"))?,
        None => Config::default(),
    };

    let data_dir = cli
        .data_dir
        .clone()
        .or_else(|| std::env::var("DATA_DIR").ok())
        .unwrap_or_else(|| "data".to_string());
    let paths = DataPaths::new(&data_dir);

    let now = Utc::now();

    match cli.command {
        Commands::Report { days } => {
            let report = generate_daily_report(&paths, days, now)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Utilization { days } => {
            let history: History = load_json(&paths.history());
            let report = utilization(&history.occupancy_records(), days, now);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Routes { days } => {
            let history: History = load_json(&paths.history());
            let report = route_performance(&history.travel_records(), days, now);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Feedback => {
            let log: FeedbackLog = load_json(&paths.feedback());
            let report = feedback_stats(&log.feedbacks);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Estimate {
            from,
            to,
            speed,
            hour,
            weekend,
            seed,
        } => {
            let start = resolve_point(&config, &from)?;
            let end = resolve_point(&config, &to)?;
            let speed = speed.unwrap_or(config.default_speed_kmh);

            let hour = hour.unwrap_or_else(|| now.hour());
            let day = if weekend {
                Weekday::Sat
            } else {
                weekday_for(now, hour)
            };
            let factor = traffic_factor(hour, day);

            let mut estimator = match seed {
                Some(seed) => EtaEstimator::seeded(seed),
                None => EtaEstimator::new(),
            };
            let eta = estimator.estimate(start, end, speed, None, factor, now);

            info!(
                from = %from,
                to = %to,
                speed_kmh = speed,
                traffic_factor = factor,
                distance_km = eta.distance_km,
                arrival = %eta.arrival.format("%H:%M:%S"),
                "arrival estimated"
            );
            println!(
                "{} -> {}: {:.2} km, arriving {}",
                from,
                to,
                eta.distance_km,
                eta.arrival.format("%H:%M:%S")
            );
        }
        Commands::Simulate { ticks, seed } => {
            simulate(&config, &paths, ticks, seed, now)?;
        }
    }

    Ok(())
}

/// Resolves a stop key from the config, or parses a raw "lat,lon" pair.
fn resolve_point(config: &Config, input: &str) -> Result<GeoPoint> {
    if let Some(coords) = config.stop_coords(input) {
        return Ok(coords);
    }
    if let Some((lat, lon)) = input.split_once(',') {
        let lat: f64 = lat.trim().parse().context("latitude is not a number")?;
        let lon: f64 = lon.trim().parse().context("longitude is not a number")?;
        return Ok(GeoPoint::new(lat, lon));
    }
    bail!("unknown stop '{input}' (expected a stop key or \"lat,lon\")");
}

/// When the hour is overridden the weekday no longer tracks the wall clock;
/// the distinction only matters for the weekend discount, so a plain weekday
/// stands in unless `--weekend` was passed.
fn weekday_for(now: DateTime<Utc>, hour: u32) -> Weekday {
    if hour == now.hour() {
        now.weekday()
    } else {
        Weekday::Mon
    }
}

/// Runs the simulator for `ticks` steps of the configured refresh interval,
/// persisting the live snapshot, history, and CSV sample log.
fn simulate(
    config: &Config,
    paths: &DataPaths,
    ticks: u32,
    seed: Option<u64>,
    start: DateTime<Utc>,
) -> Result<()> {
    let mut fleet: FleetState = load_json(&paths.bus_data());
    let mut history: History = load_json(&paths.history());

    let mut sim = match seed {
        Some(seed) => Simulator::seeded(config, seed),
        None => Simulator::new(config),
    };

    info!(
        ticks,
        interval_secs = config.refresh_interval_secs,
        "starting simulation"
    );

    for tick in 0..ticks {
        let now =
            start + chrono::Duration::seconds(tick as i64 * config.refresh_interval_secs as i64);
        let rows = sim.tick(&mut fleet, &mut history, now);
        for row in &rows {
            append_sample_row(&paths.samples_csv(), row)?;
        }
    }

    save_json(&paths.bus_data(), &fleet)?;
    save_json(&paths.history(), &history)?;

    info!(
        buses = fleet.active_buses(),
        last_updated = %fleet.last_updated,
        "simulation finished"
    );
    Ok(())
}
