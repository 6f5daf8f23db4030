//! Accumulated cyclone energy: seasonal, monthly, per-storm, year-to-date
//! and daily accumulations.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::metrics::{day_slot, is_synoptic, round1, round5, Cutoff, ACE_MIN_WIND_KT};
use crate::model::{Fix, Track};

/// Monthly buckets plus the seasonal total, rounded once at the end.
#[derive(Debug, Clone, Serialize)]
pub struct AceBreakdown {
    pub monthly: [f64; 12],
    pub total: f64,
}

/// YTD totals through a cutoff: seasonal total plus the cumulative value
/// at the end of each month bucket.
#[derive(Debug, Clone, Serialize)]
pub struct CumulativeAce {
    pub total: f64,
    pub monthly_cumulative: [f64; 12],
}

/// Per-slot daily ACE and its running cumulative sum, on the normalized
/// 365-day axis through the cutoff.
#[derive(Debug, Clone, Serialize)]
pub struct DailyAce {
    pub daily: Vec<f64>,
    pub cumulative: Vec<f64>,
}

/// ACE contribution of one fix: only synoptic-hour fixes with a reported
/// wind whose 5-kt-rounded value reaches the threshold contribute, at
/// `wind^2 / 10000` of the rounded wind.
fn fix_ace(fix: &Fix, bound: Option<DateTime<Utc>>) -> f64 {
    if let Some(bound) = bound {
        if fix.time >= bound {
            return 0.0;
        }
    }
    if !is_synoptic(&fix.time) {
        return 0.0;
    }
    let Some(wind) = fix.wind_kt else {
        return 0.0;
    };
    let rounded = round5(wind);
    if rounded < ACE_MIN_WIND_KT {
        return 0.0;
    }
    rounded * rounded / 10_000.0
}

/// Monthly and seasonal ACE, optionally bounded by an as-of cutoff.
pub fn seasonal_ace(
    tracks: &BTreeMap<String, Track>,
    year: i32,
    cutoff: Option<Cutoff>,
) -> AceBreakdown {
    let bound = cutoff.map(|c| c.end_exclusive(year));
    let mut monthly = [0.0f64; 12];
    for track in tracks.values() {
        for fix in &track.fixes {
            let ace = fix_ace(fix, bound);
            if ace > 0.0 {
                monthly[(fix.time.month() - 1) as usize] += ace;
            }
        }
    }
    let total = round1(monthly.iter().sum());
    for bucket in monthly.iter_mut() {
        *bucket = round1(*bucket);
    }
    AceBreakdown { monthly, total }
}

/// ACE accumulated by one storm, with full precision until the final
/// rounding.
pub fn storm_ace(track: &Track, bound: Option<DateTime<Utc>>) -> f64 {
    round1(track.fixes.iter().map(|f| fix_ace(f, bound)).sum())
}

/// Season-start-to-cutoff ACE with the cumulative curve at each month.
pub fn ytd_ace(tracks: &BTreeMap<String, Track>, year: i32, cutoff: Cutoff) -> CumulativeAce {
    let bound = cutoff.end_exclusive(year);
    let mut monthly = [0.0f64; 12];
    for track in tracks.values() {
        for fix in &track.fixes {
            let ace = fix_ace(fix, Some(bound));
            if ace > 0.0 {
                monthly[(fix.time.month() - 1) as usize] += ace;
            }
        }
    }
    let mut monthly_cumulative = [0.0f64; 12];
    let mut running = 0.0;
    for (i, bucket) in monthly.iter().enumerate() {
        running += bucket;
        monthly_cumulative[i] = round1(running);
    }
    CumulativeAce {
        total: round1(running),
        monthly_cumulative,
    }
}

/// Per-day ACE from season start through the cutoff, plus the running
/// cumulative sum. Leap-day fixes are excluded so the axis aligns across
/// years.
pub fn daily_ace(tracks: &BTreeMap<String, Track>, year: i32, cutoff: Cutoff) -> DailyAce {
    let bound = cutoff.end_exclusive(year);
    let len = cutoff.axis_len();
    let mut daily = vec![0.0f64; len];
    for track in tracks.values() {
        for fix in &track.fixes {
            let ace = fix_ace(fix, Some(bound));
            if ace > 0.0 {
                if let Some(slot) = day_slot(&fix.time) {
                    if slot < len {
                        daily[slot] += ace;
                    }
                }
            }
        }
    }
    let mut cumulative = vec![0.0f64; len];
    let mut running = 0.0;
    for (i, value) in daily.iter().enumerate() {
        running += value;
        cumulative[i] = round1(running);
    }
    for value in daily.iter_mut() {
        *value = round1(*value);
    }
    DailyAce { daily, cumulative }
}
