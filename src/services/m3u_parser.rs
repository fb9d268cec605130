use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

use crate::models::{Entry, ParseOptions, UrlPolicy, DEFAULT_GROUP, UNKNOWN_DURATION};
use crate::services::stream_url::is_stream_url;

/// Playlist file marker
pub const M3U_HEADER: &str = "#EXTM3U";

/// Info-header marker opening an entry
pub const EXTINF_PREFIX: &str = "#EXTINF:";

/// Attribute keys mapped onto named `Entry` fields
pub const TVG_ID: &str = "tvg-id";
pub const TVG_NAME: &str = "tvg-name";
pub const TVG_LOGO: &str = "tvg-logo";
pub const GROUP_TITLE: &str = "group-title";

/// Byte-order mark some editors put before `#EXTM3U`
const UTF8_BOM: char = '\u{feff}';

const NAMED_ATTRIBUTES: [&str; 4] = [TVG_ID, TVG_NAME, TVG_LOGO, GROUP_TITLE];

lazy_static! {
    /// Regex to normalize multiple whitespaces into single space
    static ref MULTI_SPACE_REGEX: Regex = Regex::new(r"\s{2,}").unwrap();
    /// Regex to parse EXTINF attributes (tvg-id="...", group-title="...", etc)
    static ref ATTR_REGEX: Regex = Regex::new(r#"(\w+(?:-\w+)*)="([^"]*)""#).unwrap();
    /// Regex to extract duration from EXTINF line (may be fractional)
    static ref DURATION_REGEX: Regex = Regex::new(r"^\s*(-?\d+(?:\.\d+)?)").unwrap();
}

/// Result of one parse pass
#[derive(Debug, Default)]
pub struct ParsedPlaylist {
    pub entries: Vec<Entry>,
    /// Entries dropped because their url was already seen
    pub duplicates_skipped: usize,
    /// Headers never followed by a url
    pub orphan_headers: usize,
    /// Url lines with no usable header before them
    pub orphan_urls: usize,
    /// Whether the `#EXTM3U` marker was present
    pub found_header: bool,
}

/// Normalize text: trim and collapse multiple spaces into single space
fn normalize_text(text: &str) -> String {
    let trimmed = text.trim();
    MULTI_SPACE_REGEX.replace_all(trimmed, " ").to_string()
}

/// Split the EXTINF body at the first comma that is not inside a quoted value.
/// Unbalanced quotes fall back to the last comma. Returns (header, title).
fn split_title(content: &str) -> (&str, Option<&str>) {
    let mut in_quotes = false;
    for (i, c) in content.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => return (&content[..i], Some(&content[i + 1..])),
            _ => {}
        }
    }

    match content.rfind(',') {
        Some(i) => (&content[..i], Some(&content[i + 1..])),
        None => (content, None),
    }
}

/// Parse an EXTINF line into a pending entry (url still empty)
/// Format: #EXTINF:duration tvg-id="..." tvg-name="..." tvg-logo="..." group-title="...",Title
pub fn parse_extinf(line: &str) -> Option<Entry> {
    let content = line.strip_prefix(EXTINF_PREFIX)?;
    let (header, title) = split_title(content);

    let duration_seconds = DURATION_REGEX
        .captures(header)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|d| d.is_finite())
        .map(|d| d.trunc() as i64)
        .unwrap_or(UNKNOWN_DURATION);

    let mut entry = Entry {
        name: title.map(|t| t.trim().to_string()).unwrap_or_default(),
        duration_seconds,
        ..Entry::default()
    };

    let mut group: Option<String> = None;
    for caps in ATTR_REGEX.captures_iter(header) {
        let key = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let value = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

        match key {
            TVG_ID if entry.tvg_id.is_empty() => entry.tvg_id = value.to_string(),
            TVG_NAME if entry.tvg_name.is_empty() => entry.tvg_name = value.to_string(),
            TVG_LOGO if entry.logo_url.is_empty() => entry.logo_url = value.to_string(),
            GROUP_TITLE if group.is_none() => group = Some(value.to_string()),
            _ if NAMED_ATTRIBUTES.contains(&key) => {}
            _ => {
                entry
                    .extra_attributes
                    .entry(key.to_string())
                    .or_insert_with(|| value.to_string());
            }
        }
    }

    entry.group = group
        .filter(|g| !g.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_GROUP.to_string());

    Some(entry)
}

/// Line-oriented M3U parser.
///
/// Holds only options; every call to [`M3UParser::parse`] starts from scratch.
#[derive(Debug, Clone, Default)]
pub struct M3UParser {
    options: ParseOptions,
}

impl M3UParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    fn is_url_line(&self, line: &str) -> bool {
        match self.options.url_policy {
            UrlPolicy::HttpPrefix => line.starts_with("http"),
            UrlPolicy::StreamSchemes => is_stream_url(line),
        }
    }

    /// Parse playlist text into entries.
    ///
    /// Never fails: malformed blocks are dropped and counted.
    pub fn parse(&self, text: &str) -> ParsedPlaylist {
        let mut result = ParsedPlaylist::default();
        let mut pending: Option<Entry> = None;
        let mut seen_urls: HashSet<String> = HashSet::new();
        let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);

        for raw in text.lines() {
            let line = raw.trim();

            if line.is_empty() {
                continue;
            }

            if line.starts_with(M3U_HEADER) {
                result.found_header = true;
                continue;
            }

            // Last header wins
            if line.starts_with(EXTINF_PREFIX) {
                if pending.is_some() {
                    result.orphan_headers += 1;
                }
                pending = parse_extinf(line);
                continue;
            }

            // Skip non-EXTINF comments
            if line.starts_with('#') || !self.is_url_line(line) {
                continue;
            }

            let Some(mut entry) = pending.take() else {
                result.orphan_urls += 1;
                continue;
            };

            if self.options.normalize {
                entry.name = normalize_text(&entry.name);
                entry.group = normalize_text(&entry.group);
            }

            if entry.name.is_empty() {
                result.orphan_urls += 1;
                continue;
            }

            entry.url = line.to_string();
            entry.assign_id();

            if self.options.remove_duplicates && !seen_urls.insert(entry.url.clone()) {
                result.duplicates_skipped += 1;
                continue;
            }

            result.entries.push(entry);
        }

        if pending.is_some() {
            result.orphan_headers += 1;
        }

        tracing::debug!(
            entries = result.entries.len(),
            duplicates_skipped = result.duplicates_skipped,
            orphan_headers = result.orphan_headers,
            orphan_urls = result.orphan_urls,
            found_header = result.found_header,
            "Playlist text parsed"
        );

        result
    }
}

/// Parse playlist text with default options
pub fn parse(text: &str) -> Vec<Entry> {
    M3UParser::default().parse(text).entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::item_id;

    #[test]
    fn test_parse_extinf() {
        let line = r#"#EXTINF:-1 tvg-id="globo" tvg-name="Globo HD" tvg-logo="http://logo.com/globo.png" group-title="TV",Globo HD"#;
        let entry = parse_extinf(line).unwrap();

        assert_eq!(entry.name, "Globo HD");
        assert_eq!(entry.duration_seconds, -1);
        assert_eq!(entry.tvg_id, "globo");
        assert_eq!(entry.tvg_name, "Globo HD");
        assert_eq!(entry.logo_url, "http://logo.com/globo.png");
        assert_eq!(entry.group, "TV");
        assert!(entry.extra_attributes.is_empty());
    }

    #[test]
    fn test_parse_extinf_minimal() {
        let entry = parse_extinf("#EXTINF:-1,Canal Teste").unwrap();

        assert_eq!(entry.name, "Canal Teste");
        assert_eq!(entry.duration_seconds, -1);
        assert_eq!(entry.group, DEFAULT_GROUP);
        assert!(entry.tvg_id.is_empty());
    }

    #[test]
    fn test_parse_extinf_extra_attributes() {
        let line = r#"#EXTINF:0 tvg-id="x" catchup="default" catchup-days="7" tvg-chno="12",Canal"#;
        let entry = parse_extinf(line).unwrap();

        assert_eq!(entry.duration_seconds, 0);
        assert_eq!(entry.extra_attributes.len(), 3);
        assert_eq!(entry.extra_attributes["catchup"], "default");
        assert_eq!(entry.extra_attributes["catchup-days"], "7");
        assert_eq!(entry.extra_attributes["tvg-chno"], "12");
        assert!(!entry.extra_attributes.contains_key("tvg-id"));
    }

    #[test]
    fn test_parse_extinf_duration() {
        assert_eq!(parse_extinf("#EXTINF:123.7,Movie").unwrap().duration_seconds, 123);
        assert_eq!(parse_extinf("#EXTINF:-1.5,Live").unwrap().duration_seconds, -1);
        assert_eq!(parse_extinf("#EXTINF:abc,Bad").unwrap().duration_seconds, -1);
        assert_eq!(parse_extinf("#EXTINF:,Empty").unwrap().duration_seconds, -1);
    }

    #[test]
    fn test_parse_extinf_commas() {
        let line = r#"#EXTINF:-1 group-title="Filmes, Lançamentos",Hello, World"#;
        let entry = parse_extinf(line).unwrap();
        assert_eq!(entry.group, "Filmes, Lançamentos");
        assert_eq!(entry.name, "Hello, World");
    }

    #[test]
    fn test_parse_extinf_without_title() {
        let entry = parse_extinf(r#"#EXTINF:-1 tvg-id="a""#).unwrap();
        assert!(entry.name.is_empty());
        assert!(parse_extinf("#EXTM3U").is_none());
    }

    #[test]
    fn test_unbalanced_quote_keeps_title() {
        let text = "#EXTM3U\n#EXTINF:-1 tvg-name=\"TV 5\"\" group-title=\"Abertos\",TV 5\nhttp://s/tv5\n";
        let entries = parse(text);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "TV 5");
        assert_eq!(entries[0].tvg_name, "TV 5");
        assert_eq!(entries[0].url, "http://s/tv5");
    }

    #[test]
    fn test_leading_bom_is_ignored() {
        let parsed = M3UParser::default().parse("\u{feff}#EXTINF:-1,First\nhttp://a\n#EXTINF:-1,Second\nhttp://b\n");
        let names: Vec<&str> = parsed.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);

        let parsed = M3UParser::default().parse("\u{feff}#EXTM3U\n#EXTINF:-1,Canal\nhttp://c\n");
        assert!(parsed.found_header);
        assert_eq!(parsed.entries.len(), 1);
    }

    #[test]
    fn test_entries_get_stable_ids() {
        let text = "#EXTM3U\n#EXTINF:-1 group-title=\"News\",CNN\nhttp://cnn\n#EXTINF:-1,Other\nhttp://other\n";
        let entries = parse(text);

        assert_eq!(entries[0].id, item_id("CNN", "http://cnn", "News"));
        assert_ne!(entries[0].id, entries[1].id);
        assert_eq!(parse(text), entries);
    }

    #[test]
    fn test_empty_group_uses_sentinel() {
        let entry = parse_extinf(r#"#EXTINF:-1 group-title="",Canal"#).unwrap();
        assert_eq!(entry.group, DEFAULT_GROUP);
    }

    #[test]
    fn test_parse_single_entry() {
        let text = "#EXTM3U\n#EXTINF:-1 tvg-logo=\"http://x/l.png\" group-title=\"News\",CNN HD\nhttp://stream/cnn";
        let entries = parse(text);

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.name, "CNN HD");
        assert_eq!(entry.url, "http://stream/cnn");
        assert_eq!(entry.group, "News");
        assert_eq!(entry.logo_url, "http://x/l.png");
        assert_eq!(entry.duration_seconds, -1);
    }

    #[test]
    fn test_header_without_url_is_discarded() {
        let text = "#EXTM3U\n#EXTINF:-1,First\n#EXTINF:-1,Second\nhttp://stream/2\n";
        let parsed = M3UParser::default().parse(text);

        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].name, "Second");
        assert_eq!(parsed.orphan_headers, 1);
    }

    #[test]
    fn test_trailing_header_is_discarded() {
        let text = "#EXTM3U\n#EXTINF:-1,A\nhttp://a\n#EXTINF:-1,B\n";
        let parsed = M3UParser::default().parse(text);

        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.orphan_headers, 1);
    }

    #[test]
    fn test_url_without_header_is_dropped() {
        let text = "#EXTM3U\nhttp://orphan\n#EXTINF:-1 tvg-id=\"x\"\nhttp://nameless\n#EXTINF:-1,Ok\nhttp://ok";
        let parsed = M3UParser::default().parse(text);

        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].url, "http://ok");
        assert_eq!(parsed.orphan_urls, 2);
    }

    #[test]
    fn test_ignores_comments_and_blank_lines() {
        let text = "#EXTM3U\r\n\r\n#EXTINF:-1,Canal\r\n#EXTVLCOPT:http-user-agent=VLC\r\n   \r\nhttp://canal\r\n";
        let entries = parse(text);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "http://canal");
    }

    #[test]
    fn test_garbage_input_yields_nothing() {
        assert!(parse("").is_empty());
        assert!(parse("not a playlist\nat all").is_empty());
        let parsed = M3UParser::default().parse("random");
        assert!(!parsed.found_header);
    }

    #[test]
    fn test_remove_duplicates_keeps_first() {
        let text = "#EXTM3U\n#EXTINF:-1,One\nhttp://same\n#EXTINF:-1,Two\nhttp://same\n";
        let parser = M3UParser::new(ParseOptions {
            remove_duplicates: true,
            ..ParseOptions::default()
        });
        let parsed = parser.parse(text);

        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].name, "One");
        assert_eq!(parsed.duplicates_skipped, 1);

        assert_eq!(parse(text).len(), 2);
    }

    #[test]
    fn test_normalize_titles() {
        let text = "#EXTINF:-1 group-title=\"  Filmes   HD \",  The   Matrix  \nhttp://m";
        let parser = M3UParser::new(ParseOptions {
            normalize: true,
            ..ParseOptions::default()
        });
        let entries = parser.parse(text).entries;

        assert_eq!(entries[0].name, "The Matrix");
        assert_eq!(entries[0].group, "Filmes HD");
    }

    #[test]
    fn test_stream_scheme_policy() {
        let text = "#EXTINF:-1,Cam\nrtsp://10.0.0.1/live\n#EXTINF:-1,Web\nhttp://web\n";

        assert_eq!(parse(text).len(), 1);

        let parser = M3UParser::new(ParseOptions {
            url_policy: UrlPolicy::StreamSchemes,
            ..ParseOptions::default()
        });
        let entries = parser.parse(text).entries;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].url, "rtsp://10.0.0.1/live");
    }
}
