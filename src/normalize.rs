//! Storm identity resolution.
//!
//! Historical archives reuse placeholder names across unrelated systems
//! and sometimes split one storm across inconsistent identifiers. This
//! module reconciles raw fixes from any source into canonical storm ids:
//! group by (name, season), majority-vote an external id for named
//! groups, segment the rest on >24h time gaps, then collapse exact
//! duplicate instants.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::model::{Fix, RawFix, UNNAMED};

/// Consecutive fixes of an unnamed group further apart than this belong
/// to distinct storms. Known limitation: a storm with a genuine >24h
/// reporting gap is split in two; changing the threshold needs domain
/// review.
const SEGMENT_GAP_HOURS: i64 = 24;

/// Resolves storm identities and deduplicates. Pure: consumes the raw
/// fixes, produces an identity-tagged collection in input order.
pub fn resolve_identities(raw: Vec<RawFix>) -> Vec<Fix> {
    // Group by (uppercased name, season), preserving encounter order of
    // both groups and members.
    let mut group_order: Vec<(String, i32)> = Vec::new();
    let mut groups: HashMap<(String, i32), Vec<RawFix>> = HashMap::new();
    for fix in raw {
        let key = (fix.name.to_uppercase(), fix.season);
        let members = groups.entry(key.clone()).or_insert_with(|| {
            group_order.push(key);
            Vec::new()
        });
        members.push(fix);
    }

    let mut fixes = Vec::new();
    for key in &group_order {
        let group = groups.remove(key).unwrap();
        let named = key.0 != UNNAMED;
        let has_external = group.iter().any(|f| f.external_id.is_some());

        if named && has_external {
            let id = majority_id(&group);
            fixes.extend(group.iter().map(|f| Fix::from_raw(f, id.clone())));
        } else {
            segment_by_gap(group, &mut fixes);
        }
    }

    let before = fixes.len();
    let fixes = dedup_instants(fixes);
    debug!(
        fixes = fixes.len(),
        duplicates = before - fixes.len(),
        "storm identities resolved"
    );
    fixes
}

/// Most frequently occurring external id in the group; ties broken by
/// first-encountered order in the input sequence.
fn majority_id(group: &[RawFix]) -> String {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for fix in group {
        if let Some(id) = fix.external_id.as_deref() {
            if !counts.contains_key(id) {
                order.push(id);
            }
            *counts.entry(id).or_insert(0) += 1;
        }
    }
    // max_by_key would return the last maximal element; ties must go to
    // the first-encountered id, so scan for a strictly greater count.
    let mut best: Option<(&str, usize)> = None;
    for id in order {
        let count = counts[id];
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((id, count));
        }
    }
    best.expect("majority_id called on group with no external ids")
        .0
        .to_string()
}

/// Splits a time-sorted group into contiguous segments wherever the gap
/// between consecutive fixes exceeds [`SEGMENT_GAP_HOURS`]; each segment
/// becomes its own storm identity.
fn segment_by_gap(mut group: Vec<RawFix>, out: &mut Vec<Fix>) {
    group.sort_by_key(|f| f.time);

    let mut segment: Vec<RawFix> = Vec::new();
    for fix in group {
        if let Some(prev) = segment.last() {
            if fix.time - prev.time > Duration::hours(SEGMENT_GAP_HOURS) {
                flush_segment(std::mem::take(&mut segment), out);
            }
        }
        segment.push(fix);
    }
    flush_segment(segment, out);
}

fn flush_segment(segment: Vec<RawFix>, out: &mut Vec<Fix>) {
    let Some(first) = segment.first() else {
        return;
    };
    let id = segment
        .iter()
        .find_map(|f| f.external_id.clone())
        .unwrap_or_else(|| synthetic_id(&first.name, first.season, first.time));
    out.extend(segment.iter().map(|f| Fix::from_raw(f, id.clone())));
}

fn synthetic_id(name: &str, season: i32, first: DateTime<Utc>) -> String {
    format!("{}-{}-{}", name, season, first.format("%Y%m%d%H"))
}

/// Drops exact duplicates (same storm id, identical instant), keeping the
/// first occurrence.
fn dedup_instants(fixes: Vec<Fix>) -> Vec<Fix> {
    let mut seen: HashSet<(String, DateTime<Utc>)> = HashSet::new();
    fixes
        .into_iter()
        .filter(|f| seen.insert((f.storm_id.clone(), f.time)))
        .collect()
}
