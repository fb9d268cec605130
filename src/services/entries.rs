use std::collections::{BTreeMap, HashSet};

use crate::models::{Entry, GroupField, PlaylistStats, SortField, SortOrder, DEFAULT_GROUP};
use crate::services::classifier::ContentClassifier;
use crate::services::m3u_parser::parse;
use crate::services::stream_url::protocol_of;

/// Case-insensitive search over name, group and tvg-name.
/// An empty term returns everything.
pub fn search<'a>(entries: &'a [Entry], term: &str) -> Vec<&'a Entry> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return entries.iter().collect();
    }

    entries
        .iter()
        .filter(|e| {
            e.name.to_lowercase().contains(&term)
                || e.group.to_lowercase().contains(&term)
                || (!e.tvg_name.is_empty() && e.tvg_name.to_lowercase().contains(&term))
        })
        .collect()
}

/// Sorted copy of `entries`, case-insensitive and stable
pub fn sort(entries: &[Entry], field: SortField, order: SortOrder) -> Vec<Entry> {
    let key = |e: &Entry| match field {
        SortField::Name => e.name.to_lowercase(),
        SortField::Group => e.group.to_lowercase(),
    };

    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| {
        let ord = key(a).cmp(&key(b));
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
    sorted
}

/// Bucket entries by a field; empty values go under the default group label
pub fn group_by(entries: &[Entry], field: GroupField) -> BTreeMap<String, Vec<Entry>> {
    let mut grouped: BTreeMap<String, Vec<Entry>> = BTreeMap::new();

    for entry in entries {
        let value = match field {
            GroupField::Group => &entry.group,
            GroupField::TvgId => &entry.tvg_id,
            GroupField::TvgName => &entry.tvg_name,
        };
        let key = if value.is_empty() { DEFAULT_GROUP } else { value.as_str() };
        grouped.entry(key.to_string()).or_default().push(entry.clone());
    }

    grouped
}

/// Keep only the first entry for each url
pub fn remove_duplicates(entries: Vec<Entry>) -> Vec<Entry> {
    let mut seen: HashSet<String> = HashSet::new();
    entries
        .into_iter()
        .filter(|e| seen.insert(e.url.clone()))
        .collect()
}

/// Parse several playlists and merge them, dropping repeated urls
pub fn merge_playlists<S: AsRef<str>>(playlists: &[S]) -> Vec<Entry> {
    let all: Vec<Entry> = playlists.iter().flat_map(|text| parse(text.as_ref())).collect();
    let total = all.len();
    let merged = remove_duplicates(all);

    tracing::debug!(
        playlists = playlists.len(),
        entries = merged.len(),
        duplicates = total - merged.len(),
        "Playlists merged"
    );

    merged
}

/// Counts by category, group, logo presence and url protocol
pub fn compute_stats(entries: &[Entry]) -> PlaylistStats {
    let mut stats = tally_entries(entries);
    for entry in entries {
        *stats
            .categories
            .entry(ContentClassifier::classify_entry(entry))
            .or_insert(0) += 1;
    }
    stats
}

/// Stats without the per-category counts, for callers that classify
/// entries themselves
pub(crate) fn tally_entries(entries: &[Entry]) -> PlaylistStats {
    let mut stats = PlaylistStats {
        total: entries.len(),
        ..PlaylistStats::default()
    };

    for entry in entries {
        *stats.groups.entry(entry.group.clone()).or_insert(0) += 1;

        if entry.logo_url.is_empty() {
            stats.without_logo += 1;
        } else {
            stats.with_logo += 1;
        }

        let protocol = protocol_of(&entry.url).unwrap_or_else(|| "unknown".to_string());
        *stats.protocols.entry(protocol).or_insert(0) += 1;
    }

    stats
}
