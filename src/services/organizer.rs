use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{Entry, Episode, SeriesInfo, SeriesMap};
use crate::services::classifier::first_match;

/// Title pattern with the capture indexes of show, season and episode
#[derive(Debug)]
pub struct TitlePattern {
    pub regex: Regex,
    pub show_index: usize,
    pub season_index: usize,
    pub episode_index: usize,
}

impl TitlePattern {
    fn new(pattern: &str) -> Self {
        Self {
            regex: Regex::new(pattern).unwrap(),
            show_index: 1,
            season_index: 2,
            episode_index: 3,
        }
    }

    /// Extract series info, `None` if the title does not match or a
    /// number does not fit
    pub fn extract(&self, name: &str) -> Option<SeriesInfo> {
        let caps = self.regex.captures(name)?;
        let show_name = clean_show_name(caps.get(self.show_index)?.as_str());
        if show_name.is_empty() {
            return None;
        }
        let season: u32 = caps.get(self.season_index)?.as_str().parse().ok()?;
        let episode: u32 = caps.get(self.episode_index)?.as_str().parse().ok()?;

        Some(SeriesInfo {
            show_name,
            season: season.max(1),
            episode: episode.max(1),
        })
    }
}

lazy_static! {
    /// Tried in order, first match wins
    static ref TITLE_PATTERNS: Vec<TitlePattern> = vec![
        // Name S01E01
        TitlePattern::new(r"(?i)^(.+?)\s+S(\d+)E(\d+)"),
        // Name 1x01
        TitlePattern::new(r"(?i)^(.+?)\s+(\d+)x(\d+)"),
        // Name Temporada 1 Episodio 01
        TitlePattern::new(r"(?i)^(.+?)\s+Temporada\s+(\d+)\s+Epis[oó]dio\s+(\d+)"),
        // Name T01E01
        TitlePattern::new(r"(?i)^(.+?)\s+T(\d+)E(\d+)"),
        // Name - S01E01 / Name-S01E01
        TitlePattern::new(r"(?i)^(.+?)\s*-\s*S(\d+)E(\d+)"),
    ];

    /// Season indicator used to cut the show name when no pattern matched
    static ref SEASON_MARKER: Regex = Regex::new(r"(?i)^(.+?)\s+(S\d+|Temporada|\d+x\d+)").unwrap();
}

fn clean_show_name(raw: &str) -> String {
    // Applies to every pattern: "Lost - S04E02" groups under "Lost", not "Lost -"
    raw.trim().trim_end_matches('-').trim_end().to_string()
}

/// Best-effort info for titles no pattern understands: season 1, episode 1,
/// show name cut before any season marker (or the whole title)
fn fallback_info(name: &str) -> SeriesInfo {
    let show_name = SEASON_MARKER
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| clean_show_name(m.as_str()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| name.trim().to_string());

    SeriesInfo {
        show_name,
        season: 1,
        episode: 1,
    }
}

/// Extract show name, season and episode from a title.
/// Never fails; unknown layouts use the season 1 / episode 1 fallback.
pub fn extract_series_info(name: &str) -> SeriesInfo {
    first_match(TITLE_PATTERNS.as_slice(), |pattern| pattern.extract(name)).unwrap_or_else(|| fallback_info(name))
}

fn sort_season(episodes: &mut [Episode]) {
    // stable: equal episode numbers keep arrival order
    episodes.sort_by_key(|e| e.info.episode);
}

/// Group entries by show and season, each season sorted by episode
pub fn organize<I>(entries: I) -> SeriesMap
where
    I: IntoIterator<Item = Entry>,
{
    let mut organized = SeriesMap::new();

    for entry in entries {
        let info = extract_series_info(&entry.name);
        organized
            .entry(info.show_name.clone())
            .or_default()
            .entry(info.season)
            .or_default()
            .push(Episode { entry, info });
    }

    for seasons in organized.values_mut() {
        for episodes in seasons.values_mut() {
            sort_season(episodes);
        }
    }

    organized
}

/// Insert one entry into an existing grouping, keeping its season sorted
pub fn insert_episode(organized: &mut SeriesMap, entry: Entry) -> SeriesInfo {
    let info = extract_series_info(&entry.name);
    let episodes = organized
        .entry(info.show_name.clone())
        .or_default()
        .entry(info.season)
        .or_default();
    episodes.push(Episode {
        entry,
        info: info.clone(),
    });
    sort_season(episodes);
    info
}

/// Flatten a grouping back into entries: show, season, then episode order
pub fn flatten(organized: &SeriesMap) -> Vec<Entry> {
    organized
        .values()
        .flat_map(|seasons| seasons.values())
        .flat_map(|episodes| episodes.iter().map(|e| e.entry.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(show: &str, season: u32, episode: u32) -> SeriesInfo {
        SeriesInfo {
            show_name: show.to_string(),
            season,
            episode,
        }
    }

    fn entry(name: &str, url: &str) -> Entry {
        Entry::new(name, url)
    }

    #[test]
    fn test_extract_series_info() {
        assert_eq!(extract_series_info("Breaking Bad S01E03"), info("Breaking Bad", 1, 3));
        assert_eq!(extract_series_info("Breaking Bad S02E10 720p"), info("Breaking Bad", 2, 10));
    }

    #[test]
    fn test_each_title_pattern() {
        assert_eq!(extract_series_info("Friends 2x05"), info("Friends", 2, 5));
        assert_eq!(
            extract_series_info("Dark Temporada 3 Episodio 08"),
            info("Dark", 3, 8)
        );
        assert_eq!(extract_series_info("La Casa de Papel T01E07"), info("La Casa de Papel", 1, 7));
        assert_eq!(extract_series_info("Lost-S04E01"), info("Lost", 4, 1));
        assert_eq!(extract_series_info("Lost - S04E02"), info("Lost", 4, 2));
        assert_eq!(extract_series_info("the office s3e12"), info("the office", 3, 12));
    }

    #[test]
    fn test_leading_zeros_and_zero_values() {
        assert_eq!(extract_series_info("Show S001E009"), info("Show", 1, 9));
        assert_eq!(extract_series_info("Show S00E00"), info("Show", 1, 1));
    }

    #[test]
    fn test_overflowing_numbers_fall_back() {
        assert_eq!(extract_series_info("Show S99999999999E01"), info("Show", 1, 1));
    }

    #[test]
    fn test_fallback_cuts_before_season_marker() {
        assert_eq!(extract_series_info("Vikings S02"), info("Vikings", 1, 1));
        assert_eq!(extract_series_info("Narcos Temporada Final"), info("Narcos", 1, 1));
    }

    #[test]
    fn test_fallback_uses_whole_title() {
        assert_eq!(extract_series_info("Planeta Terra"), info("Planeta Terra", 1, 1));
        assert_eq!(extract_series_info("Especial de Natal"), info("Especial de Natal", 1, 1));
    }

    #[test]
    fn test_organize_groups_and_sorts() {
        let organized = organize(vec![
            entry("Lost S01E03", "http://l/3"),
            entry("Lost S02E01", "http://l/21"),
            entry("Lost S01E01", "http://l/1"),
            entry("Dark 1x02", "http://d/2"),
            entry("Lost S01E02", "http://l/2"),
        ]);

        assert_eq!(organized.len(), 2);
        let lost = &organized["Lost"];
        assert_eq!(lost.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        let eps: Vec<u32> = lost[&1].iter().map(|e| e.info.episode).collect();
        assert_eq!(eps, vec![1, 2, 3]);
        assert_eq!(lost[&2][0].entry.url, "http://l/21");
        assert_eq!(organized["Dark"][&1][0].info, info("Dark", 1, 2));
    }

    #[test]
    fn test_sort_is_stable() {
        let organized = organize(vec![
            entry("Show S01E02 Dublado", "http://a"),
            entry("Show S01E01", "http://b"),
            entry("Show S01E02 Legendado", "http://c"),
        ]);

        let urls: Vec<&str> = organized["Show"][&1].iter().map(|e| e.entry.url.as_str()).collect();
        assert_eq!(urls, vec!["http://b", "http://a", "http://c"]);
    }

    #[test]
    fn test_unparseable_titles_collide_under_fallback() {
        let organized = organize(vec![
            entry("Planeta Terra", "http://1"),
            entry("Planeta Terra", "http://2"),
        ]);

        let season = &organized["Planeta Terra"][&1];
        assert_eq!(season.len(), 2);
        assert!(season.iter().all(|e| e.info.episode == 1));
        assert_eq!(season[0].entry.url, "http://1");
    }

    #[test]
    fn test_organize_is_idempotent() {
        let input = vec![
            entry("B S02E02", "http://b22"),
            entry("A 1x03", "http://a13"),
            entry("B S02E01", "http://b21"),
            entry("A 1x01", "http://a11"),
            entry("A 1x03 Alt", "http://a13b"),
            entry("Solo", "http://solo"),
        ];

        let first = organize(input);
        let second = organize(flatten(&first));
        assert_eq!(first, second);
    }

    #[test]
    fn test_insert_episode_keeps_order() {
        let mut organized = organize(vec![entry("Lost S01E01", "http://1"), entry("Lost S01E03", "http://3")]);

        let added = insert_episode(&mut organized, entry("Lost S01E02", "http://2"));
        assert_eq!(added, info("Lost", 1, 2));

        let urls: Vec<String> = flatten(&organized).into_iter().map(|e| e.url).collect();
        assert_eq!(urls, vec!["http://1", "http://2", "http://3"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(organize(Vec::new()).is_empty());
        assert!(flatten(&SeriesMap::new()).is_empty());
    }
}
