//! ATCF b-deck bulletin parsing.
//!
//! One file per storm number and season, one comma-delimited line per
//! fix. Lines that fail to yield a valid timestamp or coordinate are
//! dropped; all other columns are informational.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::model::{RawFix, UNNAMED};

/// Storm numbers in this range are invests and excluded from processing.
pub const INVEST_RANGE: std::ops::RangeInclusive<u32> = 90..=99;

/// Canonical ATCF-style id for a western Pacific storm number and season.
pub fn storm_id(number: u32, season: i32) -> String {
    format!("wp{:02}{}", number, season)
}

/// Parses the fixes of one b-deck file. `number` and `season` come from
/// the file's name; every returned fix carries the ATCF id as its
/// external identifier.
pub fn parse_bdeck(contents: &str, number: u32, season: i32) -> Vec<RawFix> {
    let id = storm_id(number, season);
    let mut fixes = Vec::new();
    let mut skipped = 0usize;

    for line in contents.lines() {
        match parse_line(line, season, &id) {
            Some(fix) => fixes.push(fix),
            None => {
                if !line.trim().is_empty() {
                    skipped += 1;
                }
            }
        }
    }

    debug!(id = %id, fixes = fixes.len(), skipped, "b-deck parsed");
    fixes
}

fn parse_line(line: &str, season: i32, external_id: &str) -> Option<RawFix> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < 10 {
        return None;
    }

    let time = parse_yyyymmddhh(fields[2])?;
    let lat = parse_coord(fields[6], 'N', 'S')?;
    let lon = parse_coord(fields[7], 'E', 'W')?;

    let wind_kt = fields[8].parse::<f64>().ok().filter(|w| *w >= 0.0);
    let pres_hpa = fields[9].parse::<f64>().ok().filter(|p| *p > 0.0);

    // Field 27 carries the storm name once one is assigned.
    let name = match fields.get(27).copied() {
        Some(n) if !n.is_empty() && n.chars().any(|c| c.is_ascii_alphabetic()) => n.to_uppercase(),
        _ => UNNAMED.to_string(),
    };

    Some(RawFix {
        season,
        time,
        lat: Some(lat),
        lon: Some(lon),
        wind_kt,
        pres_hpa,
        name,
        external_id: Some(external_id.to_string()),
    })
}

/// `YYYYMMDDHH` timestamp used by bulletin lines and synthetic ids.
pub fn parse_yyyymmddhh(s: &str) -> Option<DateTime<Utc>> {
    if s.len() != 10 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = s[0..4].parse().ok()?;
    let month: u32 = s[4..6].parse().ok()?;
    let day: u32 = s[6..8].parse().ok()?;
    let hour: u32 = s[8..10].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(date.and_hms_opt(hour, 0, 0)?.and_utc())
}

/// Coordinate encoded as `<degrees*10><hemisphere>`, e.g. `141N`, `1287E`.
fn parse_coord(s: &str, positive: char, negative: char) -> Option<f64> {
    if let Some(body) = s.strip_suffix(positive) {
        Some(body.parse::<f64>().ok()? / 10.0)
    } else if let Some(body) = s.strip_suffix(negative) {
        Some(-body.parse::<f64>().ok()? / 10.0)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const LINE: &str = "WP, 02, 2023052000,   , BEST,   0, 141N, 1287E,  55,  985, TS,  34, NEQ,  120,  100,   60,   90, 1008,  220,  25,  65,   0,   L,   0,    ,   0,   0,     MAWAR, D,";

    #[test]
    fn test_parse_line_fields() {
        let fixes = parse_bdeck(LINE, 2, 2023);
        assert_eq!(fixes.len(), 1);
        let f = &fixes[0];
        assert_eq!(f.time, Utc.with_ymd_and_hms(2023, 5, 20, 0, 0, 0).unwrap());
        assert_eq!(f.lat, Some(14.1));
        assert_eq!(f.lon, Some(128.7));
        assert_eq!(f.wind_kt, Some(55.0));
        assert_eq!(f.pres_hpa, Some(985.0));
        assert_eq!(f.name, "MAWAR");
        assert_eq!(f.external_id.as_deref(), Some("wp022023"));
    }

    #[test]
    fn test_hemisphere_signs() {
        let line = "SH, 05, 2023012006,   , BEST,   0, 152S, 0750W,  30, 1002";
        let fixes = parse_bdeck(line, 5, 2023);
        assert_eq!(fixes.len(), 1);
        assert_eq!(fixes[0].lat, Some(-15.2));
        assert_eq!(fixes[0].lon, Some(-75.0));
        assert_eq!(fixes[0].name, UNNAMED);
    }

    #[test]
    fn test_bad_timestamp_or_coordinate_dropped() {
        let bad_time = "WP, 02, 20230520xx,   , BEST,   0, 141N, 1287E,  55,  985";
        let bad_lat = "WP, 02, 2023052000,   , BEST,   0, 141Q, 1287E,  55,  985";
        let short = "WP, 02, 2023052000";
        assert!(parse_bdeck(bad_time, 2, 2023).is_empty());
        assert!(parse_bdeck(bad_lat, 2, 2023).is_empty());
        assert!(parse_bdeck(short, 2, 2023).is_empty());
    }

    #[test]
    fn test_non_ascii_coordinate_dropped_without_losing_siblings() {
        // Corrupted latitude field ending in a multi-byte character must
        // drop that line only, never abort the file.
        let contents = "WP, 02, 2023052000,   , BEST,   0, 141°, 1287E,  55,  985\n\
                        WP, 02, 2023052006,   , BEST,   0, 143N, 1281E,  65,  975";
        let fixes = parse_bdeck(contents, 2, 2023);
        assert_eq!(fixes.len(), 1);
        assert_eq!(fixes[0].lat, Some(14.3));
    }

    #[test]
    fn test_nonpositive_pressure_is_missing() {
        let line = "WP, 02, 2023052000,   , BEST,   0, 141N, 1287E,  55,  0";
        let fixes = parse_bdeck(line, 2, 2023);
        assert_eq!(fixes[0].pres_hpa, None);
    }

    #[test]
    fn test_storm_id_format() {
        assert_eq!(storm_id(2, 2023), "wp022023");
        assert_eq!(storm_id(15, 1998), "wp151998");
    }
}
