//! Best-track archive reader (IBTrACS-style CSV).
//!
//! Rows are kept only if their timestamp parses, they belong to the
//! western Pacific basin, and their nature code is not dissipating or
//! extratropical. Everything else is best-effort: malformed rows are
//! skipped, missing numeric cells become `None`.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;

use crate::model::{RawFix, UNNAMED};

/// Basin code of the target basin; rows from other basins are dropped.
const TARGET_BASIN: &str = "WP";

/// Nature-of-system codes excluded from all downstream processing.
const EXCLUDED_NATURES: [&str; 2] = ["ET", "DS"];

/// Epoch of the spreadsheet day-serial timestamp encoding.
fn serial_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Loads and filters the raw archive rows. A missing or unreadable file
/// is fatal; individual malformed rows are skipped.
pub fn load_archive(path: &Path) -> Result<Vec<RawFix>> {
    let file = File::open(path)
        .with_context(|| format!("best-track archive not found: {}", path.display()))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers = reader
        .headers()
        .context("best-track archive has no header row")?
        .clone();
    let col = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

    let season_col = col("SEASON");
    let basin_col = col("BASIN");
    let nature_col = col("NATURE");
    let time_col = col("ISO_TIME");
    let lat_col = col("LAT");
    let lon_col = col("LON");
    let wind_col = col("USA_WIND").or_else(|| col("WMO_WIND"));
    let pres_col = col("WMO_PRES").or_else(|| col("USA_PRES"));
    let name_col = col("NAME");
    let sid_col = col("SID");

    let mut fixes = Vec::new();
    let mut skipped = 0usize;

    for record in reader.records() {
        let Ok(record) = record else {
            skipped += 1;
            continue;
        };
        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).map(str::trim);

        let Some(basin) = cell(basin_col) else {
            skipped += 1;
            continue;
        };
        if basin != TARGET_BASIN {
            continue;
        }

        if let Some(nature) = cell(nature_col) {
            if EXCLUDED_NATURES.contains(&nature) {
                continue;
            }
        }

        let Some(time) = cell(time_col).and_then(parse_timestamp) else {
            skipped += 1;
            continue;
        };
        let Some(season) = cell(season_col).and_then(|s| s.parse::<i32>().ok()) else {
            skipped += 1;
            continue;
        };

        let name = match cell(name_col) {
            Some(n) if !n.is_empty() && !n.eq_ignore_ascii_case("NOT_NAMED") => n.to_uppercase(),
            _ => UNNAMED.to_string(),
        };

        fixes.push(RawFix {
            season,
            time,
            lat: cell(lat_col).and_then(parse_float),
            lon: cell(lon_col).and_then(parse_float),
            wind_kt: cell(wind_col).and_then(parse_float).filter(|w| *w >= 0.0),
            pres_hpa: cell(pres_col).and_then(parse_float).filter(|p| *p > 0.0),
            name,
            external_id: cell(sid_col)
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string()),
        });
    }

    debug!(
        rows = fixes.len(),
        skipped,
        path = %path.display(),
        "archive rows loaded"
    );
    Ok(fixes)
}

fn parse_float(s: &str) -> Option<f64> {
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok()
}

/// Accepts the textual timestamp encodings seen in the archive plus the
/// spreadsheet day serial (epoch 1899-12-30).
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    const FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    for fmt in FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(serial) = s.parse::<f64>() {
        if serial > 0.0 && serial < 1_000_000.0 {
            let secs = (serial * 86_400.0).round() as i64;
            return Some((serial_epoch() + Duration::seconds(secs)).and_utc());
        }
    }
    None
}
