//! Core data model: raw fixes, identity-tagged fixes, and storm tracks.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Placeholder name used when a source does not carry a storm name.
pub const UNNAMED: &str = "UNNAMED";

/// A single position/intensity observation as parsed from a source,
/// before storm identity has been resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFix {
    /// Year the storm belongs to.
    pub season: i32,
    /// Observation instant, UTC.
    pub time: DateTime<Utc>,
    /// Decimal degrees, positive north. `None` when unavailable.
    pub lat: Option<f64>,
    /// Decimal degrees, positive east. `None` when unavailable.
    pub lon: Option<f64>,
    /// Sustained wind in knots, `None` when unavailable or negative.
    pub wind_kt: Option<f64>,
    /// Central pressure in hPa. Non-positive source values become `None`.
    pub pres_hpa: Option<f64>,
    /// Uppercased storm name, or [`UNNAMED`].
    pub name: String,
    /// Externally-supplied track identifier (IBTrACS SID, ATCF id), if any.
    pub external_id: Option<String>,
}

/// A fix after identity resolution: tagged with its canonical storm id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fix {
    pub storm_id: String,
    pub season: i32,
    pub time: DateTime<Utc>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub wind_kt: Option<f64>,
    pub pres_hpa: Option<f64>,
    pub name: String,
}

impl Fix {
    pub fn from_raw(raw: &RawFix, storm_id: String) -> Self {
        Fix {
            storm_id,
            season: raw.season,
            time: raw.time,
            lat: raw.lat,
            lon: raw.lon,
            wind_kt: raw.wind_kt,
            pres_hpa: raw.pres_hpa,
            name: raw.name.clone(),
        }
    }
}

/// An ordered sequence of fixes sharing one storm id. Owned by the track
/// store, rebuilt wholesale on each load; fixes are strictly ascending by
/// time with no duplicate instants.
#[derive(Debug, Clone, Serialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub season: i32,
    pub fixes: Vec<Fix>,
}

impl Track {
    /// First observed instant, if the track has any fixes.
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.fixes.first().map(|f| f.time)
    }

    /// Last observed instant, if the track has any fixes.
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.fixes.last().map(|f| f.time)
    }

    /// Maximum reported wind over all fixes, synoptic or not.
    pub fn peak_wind_kt(&self) -> Option<f64> {
        self.fixes
            .iter()
            .filter_map(|f| f.wind_kt)
            .fold(None, |acc, w| Some(acc.map_or(w, |a: f64| a.max(w))))
    }

    /// Minimum central pressure over all fixes carrying one.
    pub fn min_pres_hpa(&self) -> Option<f64> {
        self.fixes
            .iter()
            .filter_map(|f| f.pres_hpa)
            .fold(None, |acc, p| Some(acc.map_or(p, |a: f64| a.min(p))))
    }
}
