//! CLI entry point for the typhoon statistics tool.
//!
//! Provides subcommands for season summaries, year-to-date and daily ACE
//! comparisons against climatology, and an in-season mode that merges
//! near-real-time bulletins with the best-track archive.

use std::ffi::OsStr;
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use typhoon_stats::bulletins::{DEFAULT_BASE_URL, fetch_season_bulletins};
use typhoon_stats::ibtracs;
use typhoon_stats::metrics::Cutoff;
use typhoon_stats::metrics::climo::ClimatologyRange;
use typhoon_stats::normalize::resolve_identities;
use typhoon_stats::output::emit;
use typhoon_stats::store::{Archive, TrackStore};
use typhoon_stats::summary::{cutoff_summary, daily_summary, season_summary};

const DEFAULT_ARCHIVE: &str = "data/ibtracs.WP.list.csv";

#[derive(Parser)]
#[command(name = "typhoon_stats")]
#[command(about = "Seasonal tropical-cyclone track statistics", long_about = None)]
struct Cli {
    /// Best-track archive CSV (env: ARCHIVE_PATH)
    #[arg(long, global = true)]
    archive: Option<String>,

    /// Write JSON here instead of stdout
    #[arg(short, long, global = true)]
    output: Option<String>,

    /// First year of the climatology baseline range
    #[arg(long, global = true, default_value_t = 1950)]
    climo_start: i32,

    /// Last year of the climatology baseline range
    #[arg(long, global = true, default_value_t = 2024)]
    climo_end: i32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full season summary: ACE, category-days, PAR entries, per-storm rows
    Season {
        /// Season year
        year: i32,

        /// Optional as-of cutoff, MM-DD
        #[arg(long)]
        cutoff: Option<String>,
    },
    /// Year-to-date ACE through a cutoff, against the climatological average
    Cutoff {
        /// Season year
        year: i32,

        /// As-of cutoff, MM-DD
        cutoff: String,
    },
    /// Daily ACE curve through a cutoff, against the climatological average
    Daily {
        /// Season year
        year: i32,

        /// As-of cutoff, MM-DD
        cutoff: String,
    },
    /// Merge this season's bulletins with the archive, then summarize
    Current {
        /// Season year
        year: i32,

        /// Optional as-of cutoff, MM-DD
        #[arg(long)]
        cutoff: Option<String>,

        /// Highest storm number to probe on the mirror
        #[arg(long, default_value_t = 40)]
        max_number: u32,

        /// Maximum concurrent bulletin fetches
        #[arg(short, long, default_value_t = 5)]
        concurrency: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/typhoon_stats.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("typhoon_stats.log"));

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

    let archive_path = cli
        .archive
        .clone()
        .or_else(|| std::env::var("ARCHIVE_PATH").ok())
        .unwrap_or_else(|| DEFAULT_ARCHIVE.to_string());
    let climo = ClimatologyRange {
        start: cli.climo_start,
        end: cli.climo_end,
    };
    let output_path = cli.output.as_deref();

    match cli.command {
        Commands::Season { year, cutoff } => {
            let cutoff = parse_cutoff(cutoff.as_deref())?;
            let archive = Archive::new(&archive_path);
            let snapshot = archive.snapshot()?;
            let summary = season_summary(&snapshot.store, year, cutoff, climo);
            info!(year, storms = summary.storms.len(), "season summary computed");
            emit(output_path, &summary)?;
        }
        Commands::Cutoff { year, cutoff } => {
            let cutoff = require_cutoff(&cutoff)?;
            let archive = Archive::new(&archive_path);
            let snapshot = archive.snapshot()?;
            let summary = cutoff_summary(&snapshot.store, year, cutoff, climo);
            info!(
                year,
                ace = summary.ace_to_date,
                percent_of_average = summary.percent_of_average,
                "cutoff summary computed"
            );
            emit(output_path, &summary)?;
        }
        Commands::Daily { year, cutoff } => {
            let cutoff = require_cutoff(&cutoff)?;
            let archive = Archive::new(&archive_path);
            let snapshot = archive.snapshot()?;
            let summary = daily_summary(&snapshot.store, year, cutoff, climo);
            emit(output_path, &summary)?;
        }
        Commands::Current {
            year,
            cutoff,
            max_number,
            concurrency,
        } => {
            let cutoff = parse_cutoff(cutoff.as_deref())?;
            let base_url =
                std::env::var("BDECK_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

            let mut raw = ibtracs::load_archive(Path::new(&archive_path))?;
            let storms = fetch_season_bulletins(&base_url, year, max_number, concurrency).await?;
            info!(season = year, bulletins = storms.len(), "bulletin storms merged");
            for storm in storms {
                raw.extend(storm.fixes);
            }

            let store = TrackStore::from_fixes(resolve_identities(raw));
            let summary = season_summary(&store, year, cutoff, climo);
            emit(output_path, &summary)?;
        }
    }

    Ok(())
}

fn parse_cutoff(s: Option<&str>) -> Result<Option<Cutoff>> {
    s.map(require_cutoff).transpose()
}

fn require_cutoff(s: &str) -> Result<Cutoff> {
    Cutoff::parse(s).with_context(|| format!("invalid cutoff {s:?}, expected MM-DD"))
}
