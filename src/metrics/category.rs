//! Category-duration totals: time spent per intensity category, in days.

use std::collections::BTreeMap;

use chrono::Duration;
use serde::Serialize;

use crate::metrics::{round1, Cutoff};
use crate::model::Track;

/// Intensity categories on the 1-minute-wind convention, in knots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Tropical depression, below 34 kt.
    Td,
    /// Tropical storm, 34–47 kt.
    Ts,
    /// Severe tropical storm, 48–63 kt.
    Sts,
    /// Typhoon, 64–129 kt.
    Ty,
    /// Super typhoon, 130 kt and above.
    Sty,
}

pub fn classify(wind_kt: f64) -> Category {
    match wind_kt {
        w if w < 34.0 => Category::Td,
        w if w < 48.0 => Category::Ts,
        w if w < 64.0 => Category::Sts,
        w if w < 130.0 => Category::Ty,
        _ => Category::Sty,
    }
}

/// Days spent in each category, rounded to one decimal.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CategoryDays {
    #[serde(rename = "TD")]
    pub td: f64,
    #[serde(rename = "TS")]
    pub ts: f64,
    #[serde(rename = "STS")]
    pub sts: f64,
    #[serde(rename = "TY")]
    pub ty: f64,
    #[serde(rename = "STY")]
    pub sty: f64,
}

/// Assumed duration of the final fix of a track.
const FINAL_FIX_HOURS: i64 = 6;

/// Single-interval cap, guarding against corrupt or gapped data.
const MAX_INTERVAL_HOURS: i64 = 12;

/// Sums per-category durations across all tracks. Each fix is attributed
/// the time until the next fix of the same storm (6 h for the final fix),
/// any single interval clipped to 12 h. With a cutoff, intervals starting
/// after end-of-day on the cutoff are dropped and straddling intervals
/// truncated at the bound.
pub fn category_days(
    tracks: &BTreeMap<String, Track>,
    year: i32,
    cutoff: Option<Cutoff>,
) -> CategoryDays {
    let bound = cutoff.map(|c| c.end_exclusive(year));
    let mut hours = [0.0f64; 5];

    for track in tracks.values() {
        for (i, fix) in track.fixes.iter().enumerate() {
            let Some(wind) = fix.wind_kt else {
                continue;
            };
            let start = fix.time;
            let mut end = match track.fixes.get(i + 1) {
                Some(next) => next.time,
                None => start + Duration::hours(FINAL_FIX_HOURS),
            };
            if end > start + Duration::hours(MAX_INTERVAL_HOURS) {
                end = start + Duration::hours(MAX_INTERVAL_HOURS);
            }
            if let Some(bound) = bound {
                if start >= bound {
                    continue;
                }
                if end > bound {
                    end = bound;
                }
            }
            if end <= start {
                continue;
            }
            let idx = classify(wind) as usize;
            hours[idx] += (end - start).num_seconds() as f64 / 3600.0;
        }
    }

    CategoryDays {
        td: round1(hours[Category::Td as usize] / 24.0),
        ts: round1(hours[Category::Ts as usize] / 24.0),
        sts: round1(hours[Category::Sts as usize] / 24.0),
        ty: round1(hours[Category::Ty as usize] / 24.0),
        sty: round1(hours[Category::Sty as usize] / 24.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Fix;
    use chrono::{TimeZone, Utc};

    fn track_of(fixes: Vec<(u32, u32, u32, f64)>) -> BTreeMap<String, Track> {
        let fixes: Vec<Fix> = fixes
            .into_iter()
            .map(|(month, day, hour, wind)| Fix {
                storm_id: "a".to_string(),
                season: 2023,
                time: Utc.with_ymd_and_hms(2023, month, day, hour, 0, 0).unwrap(),
                lat: None,
                lon: None,
                wind_kt: Some(wind),
                pres_hpa: None,
                name: "MAWAR".to_string(),
            })
            .collect();
        let mut map = BTreeMap::new();
        map.insert(
            "a".to_string(),
            Track {
                id: "a".to_string(),
                name: "MAWAR".to_string(),
                season: 2023,
                fixes,
            },
        );
        map
    }

    #[test]
    fn test_classification_boundaries() {
        assert_eq!(classify(33.9), Category::Td);
        assert_eq!(classify(34.0), Category::Ts);
        assert_eq!(classify(47.9), Category::Ts);
        assert_eq!(classify(48.0), Category::Sts);
        assert_eq!(classify(63.9), Category::Sts);
        assert_eq!(classify(64.0), Category::Ty);
        assert_eq!(classify(129.9), Category::Ty);
        assert_eq!(classify(130.0), Category::Sty);
    }

    #[test]
    fn test_interval_attribution_and_final_fix() {
        // 40 kt for 6h, then final 70 kt fix assumed 6h
        let t = track_of(vec![(7, 1, 0, 40.0), (7, 1, 6, 70.0)]);
        let days = category_days(&t, 2023, None);
        assert_eq!(days.ts, 0.3); // 6h / 24 = 0.25 -> 0.3
        assert_eq!(days.ty, 0.3);
        assert_eq!(days.td, 0.0);
    }

    #[test]
    fn test_interval_capped_at_12_hours() {
        // 30 hours between fixes contributes exactly 12
        let t = track_of(vec![(7, 1, 0, 40.0), (7, 2, 6, 40.0)]);
        let days = category_days(&t, 2023, None);
        // 12h cap + 6h final = 18h = 0.75 days
        assert_eq!(days.ts, 0.8);
    }

    #[test]
    fn test_cutoff_truncates_and_drops() {
        let t = track_of(vec![(7, 1, 18, 40.0), (7, 2, 0, 40.0), (7, 2, 6, 40.0)]);
        let days = category_days(&t, 2023, Some(Cutoff::new(7, 1).unwrap()));
        // Only 18:00..24:00 July 1 survives: 6h = 0.25 days
        assert_eq!(days.ts, 0.3);
    }

    #[test]
    fn test_missing_wind_skipped() {
        let mut t = track_of(vec![(7, 1, 0, 40.0), (7, 1, 6, 40.0)]);
        t.get_mut("a").unwrap().fixes[0].wind_kt = None;
        let days = category_days(&t, 2023, None);
        // Second fix only: 6h final assumption
        assert_eq!(days.ts, 0.3);
    }
}
