use sha1::{Digest, Sha1};
use std::collections::BTreeMap;

use crate::error::{LibraryError, Result};
use crate::models::{
    Category, CategoryContent, Entry, Library, ParseOptions, PlaylistExport, PlaylistStats, SeriesMap,
};
use crate::services::classifier::ContentClassifier;
use crate::services::entries::tally_entries;
use crate::services::m3u_parser::M3UParser;
use crate::services::organizer::{flatten, insert_episode, organize};
use crate::services::serializer::generate;

/// MIME type of exported playlists
pub const M3U_CONTENT_TYPE: &str = "application/x-mpegurl";

/// Outcome of one ingest run
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub library: Library,
    pub stats: PlaylistStats,
    /// SHA-1 of the ingested text
    pub source_hash: String,
    pub duplicates_skipped: usize,
}

/// Generate SHA1 hash of playlist text
pub fn hash_content(text: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(text.as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)
}

/// Split entries by category, keeping input order inside each one
pub fn categorize(entries: Vec<Entry>) -> BTreeMap<Category, Vec<Entry>> {
    let mut categorized: BTreeMap<Category, Vec<Entry>> =
        Category::ALL.iter().map(|c| (*c, Vec::new())).collect();

    for entry in entries {
        let category = ContentClassifier::classify_entry(&entry);
        categorized.entry(category).or_default().push(entry);
    }

    categorized
}

/// Classify and organize entries into a fresh library
pub fn build_library(entries: Vec<Entry>) -> Library {
    let categories = categorize(entries)
        .into_iter()
        .map(|(category, items)| {
            let content = if category.is_episodic() {
                CategoryContent::Episodic(organize(items))
            } else {
                CategoryContent::Flat(items)
            };
            (category, content)
        })
        .collect();

    Library { categories }
}

fn log_shows(category: Category, shows: &SeriesMap) {
    for (name, seasons) in shows {
        let episodes: usize = seasons.values().map(|e| e.len()).sum();
        tracing::debug!(
            %category,
            show = %name,
            seasons = seasons.len(),
            episodes,
            "Show organized"
        );
    }
}

/// Parse, classify and organize playlist text in one pass
pub fn ingest(text: &str, options: &ParseOptions) -> IngestReport {
    let source_hash = hash_content(text);
    let parsed = M3UParser::new(options.clone()).parse(text);

    if !parsed.found_header {
        tracing::warn!(hash = %source_hash, "Playlist has no #EXTM3U header");
    }

    let mut stats = tally_entries(&parsed.entries);
    let library = build_library(parsed.entries);
    stats.categories = library.counts().into_iter().filter(|(_, n)| *n > 0).collect();

    for (category, content) in &library.categories {
        if let CategoryContent::Episodic(shows) = content {
            log_shows(*category, shows);
        }
    }

    tracing::info!(
        hash = %source_hash,
        items = stats.total,
        duplicates_skipped = parsed.duplicates_skipped,
        orphan_headers = parsed.orphan_headers,
        orphan_urls = parsed.orphan_urls,
        "Playlist ingested"
    );

    IngestReport {
        library,
        stats,
        source_hash,
        duplicates_skipped: parsed.duplicates_skipped,
    }
}

impl Library {
    pub fn get(&self, category: Category) -> Option<&CategoryContent> {
        self.categories.get(&category)
    }

    fn content_mut(&mut self, category: Category) -> &mut CategoryContent {
        self.categories
            .entry(category)
            .or_insert_with(|| CategoryContent::empty_for(category))
    }

    /// Flat entries of a category (episodic ones in show/season/episode order)
    pub fn entries(&self, category: Category) -> Vec<Entry> {
        match self.get(category) {
            Some(CategoryContent::Flat(items)) => items.clone(),
            Some(CategoryContent::Episodic(shows)) => flatten(shows),
            None => Vec::new(),
        }
    }

    /// Entries per category; show count is not included
    pub fn counts(&self) -> BTreeMap<Category, usize> {
        self.categories.iter().map(|(c, content)| (*c, content.len())).collect()
    }

    pub fn total_entries(&self) -> usize {
        self.categories.values().map(|c| c.len()).sum()
    }

    /// Render one category as a downloadable `<category>.m3u`
    pub fn export(&self, category: Category) -> PlaylistExport {
        let title = format!("IPTV - {}", category.as_str().to_uppercase());
        PlaylistExport {
            filename: format!("{}.m3u", category),
            content_type: M3U_CONTENT_TYPE,
            body: generate(&self.entries(category), &title),
        }
    }

    /// Append one entry to a category without rebuilding the library
    pub fn push_entry(&mut self, category: Category, entry: Entry) {
        match self.content_mut(category) {
            CategoryContent::Flat(items) => items.push(entry),
            CategoryContent::Episodic(shows) => {
                let info = insert_episode(shows, entry);
                tracing::debug!(%category, show = %info.show_name, season = info.season, episode = info.episode, "Episode added");
            }
        }
    }

    /// Remove the entry at `index` (flattened order for episodic categories)
    pub fn remove_entry(&mut self, category: Category, index: usize) -> Result<Entry> {
        let content = self.content_mut(category);
        let len = content.len();
        let out_of_range = LibraryError::IndexOutOfRange { category, index, len };

        match content {
            CategoryContent::Flat(items) => {
                if index >= items.len() {
                    return Err(out_of_range);
                }
                Ok(items.remove(index))
            }
            CategoryContent::Episodic(shows) => {
                let (show, season, position) = locate_episode(shows, index).ok_or(out_of_range)?;
                let Some(seasons) = shows.get_mut(&show) else {
                    return Err(LibraryError::IndexOutOfRange { category, index, len });
                };
                let Some(episodes) = seasons.get_mut(&season) else {
                    return Err(LibraryError::IndexOutOfRange { category, index, len });
                };
                let removed = episodes.remove(position);

                if episodes.is_empty() {
                    seasons.remove(&season);
                }
                if seasons.is_empty() {
                    shows.remove(&show);
                }
                Ok(removed.entry)
            }
        }
    }

    /// Remove the first entry with `id`
    pub fn remove_by_id(&mut self, category: Category, id: &str) -> Result<Entry> {
        let position = match self.get(category) {
            Some(CategoryContent::Flat(items)) => items.iter().position(|e| e.id == id),
            Some(CategoryContent::Episodic(shows)) => shows
                .values()
                .flat_map(|seasons| seasons.values())
                .flat_map(|episodes| episodes.iter())
                .position(|e| e.entry.id == id),
            None => None,
        };

        let index = position.ok_or_else(|| LibraryError::EntryNotFound {
            category,
            id: id.to_string(),
        })?;
        self.remove_entry(category, index)
    }
}

/// Find (show, season, position) of the `index`-th episode in flattened order
fn locate_episode(shows: &SeriesMap, mut index: usize) -> Option<(String, u32, usize)> {
    for (show, seasons) in shows {
        for (season, episodes) in seasons {
            if index < episodes.len() {
                return Some((show.clone(), *season, index));
            }
            index -= episodes.len();
        }
    }
    None
}
