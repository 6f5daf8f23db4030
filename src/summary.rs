//! Aggregation facade: composite JSON-shaped summaries consumed by the
//! presentation layer.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::metrics::ace::{daily_ace, seasonal_ace, storm_ace, ytd_ace, AceBreakdown};
use crate::metrics::category::{category_days, CategoryDays};
use crate::metrics::climo::{
    category_days_climatology, daily_climatology, ytd_climatology, ClimatologyRange,
};
use crate::metrics::region::{first_region_entry, region_entries, storms_formed_by_month};
use crate::metrics::{round1, slot_label, Cutoff};
use crate::model::Track;
use crate::store::TrackStore;

/// One storm's row in the season summary.
#[derive(Debug, Clone, Serialize)]
pub struct StormSummary {
    pub id: String,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub peak_wind_kt: Option<f64>,
    pub min_pres_hpa: Option<f64>,
    pub ace: f64,
    pub first_region_entry: Option<DateTime<Utc>>,
}

/// Shortened per-storm entry for the ACE leaderboard.
#[derive(Debug, Clone, Serialize)]
pub struct TopStorm {
    pub id: String,
    pub name: String,
    pub ace: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonSummary {
    pub season: i32,
    pub ace: AceBreakdown,
    pub category_days: CategoryDays,
    pub category_days_climo: CategoryDays,
    pub climo_years_used: u32,
    pub region_monthly: [u32; 12],
    pub region_total: u32,
    pub formed_by_month: [u32; 12],
    /// Sorted by start time ascending.
    pub storms: Vec<StormSummary>,
    /// Sorted by ACE descending.
    pub top_storms: Vec<TopStorm>,
}

/// Composite season summary: ACE, category-days with their climatological
/// average, regional-entry and formation timing, and per-storm rows.
pub fn season_summary(
    store: &TrackStore,
    year: i32,
    cutoff: Option<Cutoff>,
    climo: ClimatologyRange,
) -> SeasonSummary {
    let tracks = store.tracks_for_season(year);
    let bound = cutoff.map(|c| c.end_exclusive(year));

    let mut storms: Vec<StormSummary> = tracks
        .values()
        .filter_map(|track| storm_summary(track, bound))
        .collect();
    storms.sort_by_key(|s| s.start);

    let mut top_storms: Vec<TopStorm> = storms
        .iter()
        .map(|s| TopStorm {
            id: s.id.clone(),
            name: s.name.clone(),
            ace: s.ace,
        })
        .collect();
    top_storms.sort_by(|a, b| b.ace.partial_cmp(&a.ace).unwrap_or(std::cmp::Ordering::Equal));

    let region = region_entries(&tracks, year, cutoff);
    let category_climo = category_days_climatology(store, climo, cutoff);

    SeasonSummary {
        season: year,
        ace: seasonal_ace(&tracks, year, cutoff),
        category_days: category_days(&tracks, year, cutoff),
        category_days_climo: category_climo.avg,
        climo_years_used: category_climo.years_used,
        region_monthly: region.monthly,
        region_total: region.total,
        formed_by_month: storms_formed_by_month(&tracks, year, cutoff),
        storms,
        top_storms,
    }
}

fn storm_summary(track: &Track, bound: Option<DateTime<Utc>>) -> Option<StormSummary> {
    let fixes: Vec<_> = track
        .fixes
        .iter()
        .filter(|f| bound.is_none_or(|b| f.time < b))
        .collect();
    let first = fixes.first()?;
    let last = fixes.last()?;
    // Peak wind and minimum pressure use every fix in range, synoptic or
    // not.
    let peak_wind_kt = fixes
        .iter()
        .filter_map(|f| f.wind_kt)
        .fold(None, |acc: Option<f64>, w| Some(acc.map_or(w, |a| a.max(w))));
    let min_pres_hpa = fixes
        .iter()
        .filter_map(|f| f.pres_hpa)
        .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |a| a.min(p))));
    Some(StormSummary {
        id: track.id.clone(),
        name: track.name.clone(),
        start: first.time,
        end: last.time,
        peak_wind_kt,
        min_pres_hpa,
        ace: storm_ace(track, bound),
        first_region_entry: first_region_entry(track, bound),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct CutoffSummary {
    pub season: i32,
    pub cutoff: String,
    pub ace_to_date: f64,
    pub climo_avg: f64,
    pub percent_of_average: f64,
    pub monthly_cumulative: [f64; 12],
    pub climo_monthly_cumulative: [f64; 12],
    pub climo_years_used: u32,
}

/// Year-to-date ACE against its climatological baseline.
pub fn cutoff_summary(
    store: &TrackStore,
    year: i32,
    cutoff: Cutoff,
    climo: ClimatologyRange,
) -> CutoffSummary {
    let tracks = store.tracks_for_season(year);
    let current = ytd_ace(&tracks, year, cutoff);
    let baseline = ytd_climatology(store, climo, cutoff);

    let percent = if baseline.avg_total > 0.0 {
        round1(current.total / baseline.avg_total * 100.0)
    } else {
        0.0
    };

    CutoffSummary {
        season: year,
        cutoff: cutoff.label(),
        ace_to_date: current.total,
        climo_avg: baseline.avg_total,
        percent_of_average: percent,
        monthly_cumulative: current.monthly_cumulative,
        climo_monthly_cumulative: baseline.monthly_cumulative,
        climo_years_used: baseline.years_used,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DailySummary {
    pub season: i32,
    pub cutoff: String,
    /// Normalized `MM-DD` labels, leap day excluded.
    pub labels: Vec<String>,
    pub daily: Vec<f64>,
    pub cumulative: Vec<f64>,
    pub climo_daily: Vec<f64>,
    pub climo_cumulative: Vec<f64>,
    pub climo_years_used: u32,
}

/// Daily ACE curve against its climatological baseline on the shared
/// normalized axis.
pub fn daily_summary(
    store: &TrackStore,
    year: i32,
    cutoff: Cutoff,
    climo: ClimatologyRange,
) -> DailySummary {
    let tracks = store.tracks_for_season(year);
    let current = daily_ace(&tracks, year, cutoff);
    let baseline = daily_climatology(store, climo, cutoff);

    let labels = (0..cutoff.axis_len()).map(slot_label).collect();

    DailySummary {
        season: year,
        cutoff: cutoff.label(),
        labels,
        daily: current.daily,
        cumulative: current.cumulative,
        climo_daily: baseline.daily,
        climo_cumulative: baseline.cumulative,
        climo_years_used: baseline.years_used,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Fix;
    use chrono::TimeZone;

    fn fix(id: &str, month: u32, day: u32, hour: u32, wind: f64, lon: f64) -> Fix {
        Fix {
            storm_id: id.to_string(),
            season: 2023,
            time: Utc.with_ymd_and_hms(2023, month, day, hour, 0, 0).unwrap(),
            lat: Some(14.0),
            lon: Some(lon),
            wind_kt: Some(wind),
            pres_hpa: Some(990.0),
            name: id.to_uppercase(),
        }
    }

    fn sample_store() -> TrackStore {
        TrackStore::from_fixes(vec![
            // Storm "b" starts earlier but is weaker
            fix("b", 6, 28, 0, 40.0, 150.0),
            fix("b", 6, 28, 6, 45.0, 150.0),
            // Storm "a" starts later, stronger
            fix("a", 7, 1, 0, 90.0, 130.0),
            fix("a", 7, 1, 6, 100.0, 131.0),
        ])
    }

    #[test]
    fn test_storm_ordering_start_asc_vs_ace_desc() {
        let store = sample_store();
        let summary = season_summary(&store, 2023, None, ClimatologyRange { start: 2023, end: 2023 });

        let by_start: Vec<&str> = summary.storms.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(by_start, vec!["b", "a"]);

        let by_ace: Vec<&str> = summary.top_storms.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(by_ace, vec!["a", "b"]);
    }

    #[test]
    fn test_season_summary_fields() {
        let store = sample_store();
        let summary = season_summary(&store, 2023, None, ClimatologyRange { start: 2023, end: 2023 });

        assert_eq!(summary.season, 2023);
        // a: 0.81 + 1.0; b: 0.16 + 0.2025 -> total 2.1725 -> 2.2
        assert_eq!(summary.ace.total, 2.2);
        assert_eq!(summary.region_total, 1); // only "a" is inside the region
        assert_eq!(summary.formed_by_month[5], 1);
        assert_eq!(summary.formed_by_month[6], 1);
        assert_eq!(summary.climo_years_used, 1);

        let a = summary.storms.iter().find(|s| s.id == "a").unwrap();
        assert_eq!(a.peak_wind_kt, Some(100.0));
        assert_eq!(a.ace, 1.8);
        assert!(a.first_region_entry.is_some());
        let b = summary.storms.iter().find(|s| s.id == "b").unwrap();
        assert_eq!(b.first_region_entry, None);
    }

    #[test]
    fn test_cutoff_summary_percent_of_average() {
        let store = sample_store();
        let summary = cutoff_summary(
            &store,
            2023,
            Cutoff::new(12, 31).unwrap(),
            ClimatologyRange { start: 2023, end: 2023 },
        );
        // Single climatology year equal to the current season: 100%
        assert_eq!(summary.ace_to_date, summary.climo_avg);
        assert_eq!(summary.percent_of_average, 100.0);
        assert_eq!(summary.climo_years_used, 1);
    }

    #[test]
    fn test_daily_summary_axis_alignment() {
        let store = sample_store();
        let cutoff = Cutoff::new(7, 31).unwrap();
        let summary = daily_summary(&store, 2023, cutoff, ClimatologyRange { start: 2023, end: 2023 });

        assert_eq!(summary.labels.len(), cutoff.axis_len());
        assert_eq!(summary.daily.len(), summary.labels.len());
        assert_eq!(summary.climo_daily.len(), summary.labels.len());
        assert_eq!(summary.labels[0], "01-01");
        assert_eq!(summary.labels.last().unwrap(), "07-31");
    }
}
