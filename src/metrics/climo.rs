//! Multi-year climatological baselines.
//!
//! Each baseline repeats a cutoff-bounded computation independently for
//! every year in an inclusive range, using that year's own season of data
//! and the same month/day cutoff, then averages across the years that
//! actually had data. Years with no rows at all are skipped entirely and
//! do not count toward `years_used`.

use serde::Serialize;
use tracing::debug;

use crate::metrics::ace::{daily_ace, ytd_ace};
use crate::metrics::category::{category_days, CategoryDays};
use crate::metrics::{round1, Cutoff};
use crate::store::TrackStore;

/// Inclusive year range for baseline computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClimatologyRange {
    pub start: i32,
    pub end: i32,
}

impl Default for ClimatologyRange {
    fn default() -> Self {
        ClimatologyRange { start: 1950, end: 2024 }
    }
}

impl ClimatologyRange {
    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }
}

/// Average YTD ACE through the cutoff across the range.
#[derive(Debug, Clone, Serialize)]
pub struct YtdClimatology {
    pub avg_total: f64,
    pub monthly_cumulative: [f64; 12],
    pub years_used: u32,
}

pub fn ytd_climatology(store: &TrackStore, range: ClimatologyRange, cutoff: Cutoff) -> YtdClimatology {
    let mut total = 0.0f64;
    let mut monthly = [0.0f64; 12];
    let mut years_used = 0u32;

    for year in range.years() {
        let tracks = store.tracks_for_season(year);
        if tracks.is_empty() {
            continue;
        }
        let ytd = ytd_ace(&tracks, year, cutoff);
        total += ytd.total;
        for (bucket, value) in monthly.iter_mut().zip(ytd.monthly_cumulative) {
            *bucket += value;
        }
        years_used += 1;
    }

    debug!(years_used, "YTD climatology computed");
    if years_used == 0 {
        return YtdClimatology {
            avg_total: 0.0,
            monthly_cumulative: [0.0; 12],
            years_used: 0,
        };
    }
    let n = years_used as f64;
    for bucket in monthly.iter_mut() {
        *bucket = round1(*bucket / n);
    }
    YtdClimatology {
        avg_total: round1(total / n),
        monthly_cumulative: monthly,
        years_used,
    }
}

/// Average daily and cumulative ACE on the normalized 365-day axis.
#[derive(Debug, Clone, Serialize)]
pub struct DailyClimatology {
    pub daily: Vec<f64>,
    pub cumulative: Vec<f64>,
    pub years_used: u32,
}

pub fn daily_climatology(store: &TrackStore, range: ClimatologyRange, cutoff: Cutoff) -> DailyClimatology {
    let len = cutoff.axis_len();
    let mut daily = vec![0.0f64; len];
    let mut cumulative = vec![0.0f64; len];
    let mut years_used = 0u32;

    for year in range.years() {
        let tracks = store.tracks_for_season(year);
        if tracks.is_empty() {
            continue;
        }
        let year_daily = daily_ace(&tracks, year, cutoff);
        for (bucket, value) in daily.iter_mut().zip(&year_daily.daily) {
            *bucket += value;
        }
        for (bucket, value) in cumulative.iter_mut().zip(&year_daily.cumulative) {
            *bucket += value;
        }
        years_used += 1;
    }

    if years_used > 0 {
        let n = years_used as f64;
        for bucket in daily.iter_mut() {
            *bucket = round1(*bucket / n);
        }
        for bucket in cumulative.iter_mut() {
            *bucket = round1(*bucket / n);
        }
    }
    DailyClimatology { daily, cumulative, years_used }
}

/// Average category-days across the range.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryDaysClimatology {
    pub avg: CategoryDays,
    pub years_used: u32,
}

pub fn category_days_climatology(
    store: &TrackStore,
    range: ClimatologyRange,
    cutoff: Option<Cutoff>,
) -> CategoryDaysClimatology {
    let mut sums = [0.0f64; 5];
    let mut years_used = 0u32;

    for year in range.years() {
        let tracks = store.tracks_for_season(year);
        if tracks.is_empty() {
            continue;
        }
        let days = category_days(&tracks, year, cutoff);
        sums[0] += days.td;
        sums[1] += days.ts;
        sums[2] += days.sts;
        sums[3] += days.ty;
        sums[4] += days.sty;
        years_used += 1;
    }

    let n = if years_used == 0 { 1.0 } else { years_used as f64 };
    CategoryDaysClimatology {
        avg: CategoryDays {
            td: round1(sums[0] / n),
            ts: round1(sums[1] / n),
            sts: round1(sums[2] / n),
            ty: round1(sums[3] / n),
            sty: round1(sums[4] / n),
        },
        years_used,
    }
}
