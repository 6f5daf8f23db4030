//! Seasonal and sub-seasonal metric computations over storm tracks.
//!
//! Every operation here is a pure function of its inputs (tracks, target
//! year, optional cutoff); intermediate accumulation keeps full precision
//! and totals are rounded exactly once, at the end, to one decimal.

pub mod ace;
pub mod category;
pub mod climo;
pub mod region;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};

/// Rounded winds below this contribute nothing to ACE.
pub const ACE_MIN_WIND_KT: f64 = 35.0;

/// Cumulative days before each month in a non-leap year. Fixed table so
/// daily indices align across leap and non-leap years.
pub const CUM_DAYS: [u32; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Nearest multiple of 5, ties rounding up. Applied to winds before
/// thresholding and before squaring.
pub fn round5(w: f64) -> f64 {
    (w / 5.0).round() * 5.0
}

/// Final one-decimal rounding for emitted totals.
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// True at the standard observation hours 00/06/12/18 UTC.
pub fn is_synoptic(time: &DateTime<Utc>) -> bool {
    matches!(time.hour(), 0 | 6 | 12 | 18)
}

/// An as-of month/day cutoff applied within a target year. The bound is
/// end-of-day UTC, represented as the exclusive start of the next day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cutoff {
    month: u32,
    day: u32,
}

impl Cutoff {
    /// Builds a cutoff from a month/day pair. Validated against a leap
    /// year so Feb 29 is accepted; anything else out of range is `None`.
    pub fn new(month: u32, day: u32) -> Option<Cutoff> {
        NaiveDate::from_ymd_opt(2000, month, day)?;
        Some(Cutoff { month, day })
    }

    /// Parses `MM-DD`.
    pub fn parse(s: &str) -> Option<Cutoff> {
        let (m, d) = s.split_once('-')?;
        Cutoff::new(m.parse().ok()?, d.parse().ok()?)
    }

    /// Exclusive upper bound for the cutoff applied to `year`. A Feb 29
    /// cutoff in a non-leap year clamps to Feb 28.
    pub fn end_exclusive(&self, year: i32) -> DateTime<Utc> {
        let date = NaiveDate::from_ymd_opt(year, self.month, self.day)
            .or_else(|| NaiveDate::from_ymd_opt(year, self.month, self.day - 1))
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, 12, 31).unwrap());
        (date + Duration::days(1)).and_hms_opt(0, 0, 0).unwrap().and_utc()
    }

    /// Slots on the normalized 365-day axis through this cutoff.
    pub fn axis_len(&self) -> usize {
        (CUM_DAYS[(self.month - 1) as usize] + self.day) as usize
    }

    pub fn label(&self) -> String {
        format!("{:02}-{:02}", self.month, self.day)
    }
}

/// Slot of a UTC instant on the normalized 365-day axis. Feb 29 maps to
/// `None` and is excluded from every daily bucket, in any year.
pub fn day_slot(time: &DateTime<Utc>) -> Option<usize> {
    let (month, day) = (time.month(), time.day());
    if month == 2 && day == 29 {
        return None;
    }
    Some((CUM_DAYS[(month - 1) as usize] + day - 1) as usize)
}

/// `MM-DD` label of a slot on the normalized axis.
pub fn slot_label(slot: usize) -> String {
    let mut month = 11;
    while CUM_DAYS[month] as usize > slot {
        month -= 1;
    }
    format!("{:02}-{:02}", month + 1, slot + 1 - CUM_DAYS[month] as usize)
}
