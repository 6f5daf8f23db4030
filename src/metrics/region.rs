//! Regional-entry and formation timing statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::geometry::is_inside_region;
use crate::metrics::Cutoff;
use crate::model::Track;

/// Monthly counts of storms first entering the region, plus the grand
/// total of storms that ever entered.
#[derive(Debug, Clone, Serialize)]
pub struct RegionEntries {
    pub monthly: [u32; 12],
    pub total: u32,
}

/// Earliest in-region fix per storm, bucketed by month.
pub fn region_entries(
    tracks: &BTreeMap<String, Track>,
    year: i32,
    cutoff: Option<Cutoff>,
) -> RegionEntries {
    let bound = cutoff.map(|c| c.end_exclusive(year));
    let mut monthly = [0u32; 12];
    let mut total = 0u32;
    for track in tracks.values() {
        if let Some(entry) = first_region_entry(track, bound) {
            monthly[(entry.month() - 1) as usize] += 1;
            total += 1;
        }
    }
    RegionEntries { monthly, total }
}

/// Instant of a storm's earliest fix inside the region, if any. Fixes are
/// already time-sorted, so the first hit is the earliest.
pub fn first_region_entry(track: &Track, bound: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    track
        .fixes
        .iter()
        .filter(|f| bound.is_none_or(|b| f.time < b))
        .find(|f| is_inside_region(f.lat, f.lon))
        .map(|f| f.time)
}

/// Counts storms by the UTC month of their first fix.
pub fn storms_formed_by_month(
    tracks: &BTreeMap<String, Track>,
    year: i32,
    cutoff: Option<Cutoff>,
) -> [u32; 12] {
    let bound = cutoff.map(|c| c.end_exclusive(year));
    let mut monthly = [0u32; 12];
    for track in tracks.values() {
        let first = track
            .fixes
            .iter()
            .find(|f| bound.is_none_or(|b| f.time < b));
        if let Some(fix) = first {
            monthly[(fix.time.month() - 1) as usize] += 1;
        }
    }
    monthly
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Fix;
    use chrono::TimeZone;

    fn fix(month: u32, day: u32, hour: u32, lat: f64, lon: f64) -> Fix {
        Fix {
            storm_id: "a".to_string(),
            season: 2023,
            time: Utc.with_ymd_and_hms(2023, month, day, hour, 0, 0).unwrap(),
            lat: Some(lat),
            lon: Some(lon),
            wind_kt: Some(50.0),
            pres_hpa: None,
            name: "MAWAR".to_string(),
        }
    }

    fn tracks_of(id: &str, fixes: Vec<Fix>) -> BTreeMap<String, Track> {
        let mut map = BTreeMap::new();
        map.insert(
            id.to_string(),
            Track {
                id: id.to_string(),
                name: "MAWAR".to_string(),
                season: 2023,
                fixes,
            },
        );
        map
    }

    #[test]
    fn test_first_entry_is_earliest_inside_fix() {
        // Starts outside (140E), enters the region on the second fix
        let t = tracks_of(
            "a",
            vec![fix(7, 1, 0, 14.0, 140.0), fix(7, 1, 6, 14.0, 130.0), fix(7, 1, 12, 14.5, 128.0)],
        );
        let entries = region_entries(&t, 2023, None);
        assert_eq!(entries.total, 1);
        assert_eq!(entries.monthly[6], 1);
        assert_eq!(
            first_region_entry(&t["a"], None),
            Some(Utc.with_ymd_and_hms(2023, 7, 1, 6, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_storm_never_entering_not_counted() {
        let t = tracks_of("a", vec![fix(7, 1, 0, 14.0, 150.0), fix(7, 1, 6, 15.0, 148.0)]);
        let entries = region_entries(&t, 2023, None);
        assert_eq!(entries.total, 0);
        assert_eq!(entries.monthly.iter().sum::<u32>(), 0);
    }

    #[test]
    fn test_cutoff_hides_later_entry() {
        let t = tracks_of("a", vec![fix(7, 1, 0, 14.0, 140.0), fix(7, 5, 0, 14.0, 130.0)]);
        let entries = region_entries(&t, 2023, Some(Cutoff::new(7, 2).unwrap()));
        assert_eq!(entries.total, 0);
    }

    #[test]
    fn test_formed_by_month() {
        let mut t = tracks_of("a", vec![fix(6, 28, 0, 14.0, 140.0)]);
        t.extend(tracks_of("b", vec![fix(7, 2, 0, 14.0, 140.0)]));
        let formed = storms_formed_by_month(&t, 2023, None);
        assert_eq!(formed[5], 1);
        assert_eq!(formed[6], 1);
    }
}
