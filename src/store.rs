//! Track store: normalized fixes grouped per storm, plus the archive
//! snapshot cache keyed by the source file's modification time.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use anyhow::{Context, Result};
use tracing::info;

use crate::ibtracs;
use crate::model::{Fix, Track};
use crate::normalize::resolve_identities;

/// Immutable per-snapshot view of every storm track. Built once from the
/// full normalized fix set; never patched in place.
#[derive(Debug, Clone)]
pub struct TrackStore {
    tracks: BTreeMap<String, Track>,
}

impl TrackStore {
    /// Groups identity-tagged fixes by storm id, each track sorted by
    /// time ascending.
    pub fn from_fixes(fixes: Vec<Fix>) -> Self {
        let mut tracks: BTreeMap<String, Track> = BTreeMap::new();
        for fix in fixes {
            let track = tracks.entry(fix.storm_id.clone()).or_insert_with(|| Track {
                id: fix.storm_id.clone(),
                name: fix.name.clone(),
                season: fix.season,
                fixes: Vec::new(),
            });
            if track.name == crate::model::UNNAMED && fix.name != crate::model::UNNAMED {
                track.name = fix.name.clone();
            }
            track.fixes.push(fix);
        }
        for track in tracks.values_mut() {
            track.fixes.sort_by_key(|f| f.time);
        }
        TrackStore { tracks }
    }

    pub fn all_tracks(&self) -> &BTreeMap<String, Track> {
        &self.tracks
    }

    /// Tracks restricted to fixes whose season matches `year`. Storms
    /// left with no fixes are omitted.
    pub fn tracks_for_season(&self, year: i32) -> BTreeMap<String, Track> {
        self.tracks
            .iter()
            .filter_map(|(id, track)| {
                let fixes: Vec<Fix> = track
                    .fixes
                    .iter()
                    .filter(|f| f.season == year)
                    .cloned()
                    .collect();
                if fixes.is_empty() {
                    return None;
                }
                Some((
                    id.clone(),
                    Track {
                        id: track.id.clone(),
                        name: track.name.clone(),
                        season: year,
                        fixes,
                    },
                ))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// One wholesale load of the archive: the derived store plus the source
/// file version it was built from.
#[derive(Clone)]
pub struct Snapshot {
    pub source_version: SystemTime,
    pub store: Arc<TrackStore>,
}

/// Lazily-loaded archive with a snapshot cache. `snapshot()` re-checks
/// the file's modification time and rebuilds everything when it changed;
/// the token+data pair is swapped atomically under the lock, so readers
/// holding an older snapshot simply keep their read-only view.
pub struct Archive {
    path: PathBuf,
    state: Mutex<Option<Snapshot>>,
}

impl Archive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Archive {
            path: path.into(),
            state: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current snapshot, rebuilding from the file if its mtime changed.
    /// Missing or unreadable archive is fatal.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let mtime = std::fs::metadata(&self.path)
            .with_context(|| format!("best-track archive not found: {}", self.path.display()))?
            .modified()
            .context("archive modification time unavailable")?;

        let mut state = self.state.lock().unwrap();
        if let Some(snapshot) = state.as_ref() {
            if snapshot.source_version == mtime {
                return Ok(snapshot.clone());
            }
        }

        let raw = ibtracs::load_archive(&self.path)?;
        let store = TrackStore::from_fixes(resolve_identities(raw));
        info!(
            storms = store.len(),
            path = %self.path.display(),
            "archive snapshot rebuilt"
        );

        let snapshot = Snapshot {
            source_version: mtime,
            store: Arc::new(store),
        };
        *state = Some(snapshot.clone());
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::fs::File;
    use std::io::Write;

    fn fix(id: &str, season: i32, day: u32, hour: u32) -> Fix {
        Fix {
            storm_id: id.to_string(),
            season,
            time: Utc.with_ymd_and_hms(season, 7, day, hour, 0, 0).unwrap(),
            lat: Some(14.0),
            lon: Some(130.0),
            wind_kt: Some(45.0),
            pres_hpa: Some(990.0),
            name: "MAWAR".to_string(),
        }
    }

    #[test]
    fn test_tracks_sorted_by_time() {
        let store = TrackStore::from_fixes(vec![
            fix("a", 2023, 2, 12),
            fix("a", 2023, 1, 0),
            fix("a", 2023, 1, 18),
        ]);
        let track = &store.all_tracks()["a"];
        let times: Vec<_> = track.fixes.iter().map(|f| f.time.to_string()).collect();
        let mut sorted = times.clone();
        sorted.sort();
        assert_eq!(times, sorted);
    }

    #[test]
    fn test_tracks_for_season_filters_fixes() {
        let store = TrackStore::from_fixes(vec![
            fix("a", 2022, 1, 0),
            fix("b", 2023, 1, 0),
            fix("b", 2023, 1, 6),
        ]);
        let season = store.tracks_for_season(2023);
        assert_eq!(season.len(), 1);
        assert_eq!(season["b"].fixes.len(), 2);
        assert!(store.tracks_for_season(1999).is_empty());
    }

    #[test]
    fn test_snapshot_reload_is_idempotent() {
        let path = std::env::temp_dir().join("typhoon_stats_store_reload.csv");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "SID,SEASON,BASIN,NAME,ISO_TIME,NATURE,LAT,LON,WMO_PRES,USA_WIND").unwrap();
        writeln!(f, "sid-a,2023,WP,MAWAR,2023-05-20 00:00:00,TS,14.1,128.7,985,55").unwrap();
        writeln!(f, "sid-a,2023,WP,MAWAR,2023-05-20 06:00:00,TS,14.5,128.9,980,60").unwrap();
        drop(f);

        let archive = Archive::new(&path);
        let first = archive.snapshot().unwrap();
        let second = archive.snapshot().unwrap();

        // Unchanged mtime: same shared store, identical contents
        assert!(Arc::ptr_eq(&first.store, &second.store));
        assert_eq!(first.source_version, second.source_version);
        let ids: Vec<_> = first.store.all_tracks().keys().collect();
        assert_eq!(ids, vec!["sid-a"]);
        assert_eq!(first.store.all_tracks()["sid-a"].fixes.len(), 2);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_snapshot_missing_file_is_fatal() {
        let archive = Archive::new("/nonexistent/archive.csv");
        assert!(archive.snapshot().is_err());
    }
}
