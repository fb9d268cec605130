use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Group label used when an entry carries no `group-title`
pub const DEFAULT_GROUP: &str = "Outros";

/// Duration used for live streams and unknown lengths
pub const UNKNOWN_DURATION: i64 = -1;

/// Content category, one per entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Movies,
    Series,
    Cartoons,
    Sports,
    News,
    Music,
    Documentaries,
    Adult,
    Channels,
}

impl Category {
    /// Every category, in declaration order
    pub const ALL: [Category; 9] = [
        Category::Movies,
        Category::Series,
        Category::Cartoons,
        Category::Sports,
        Category::News,
        Category::Music,
        Category::Documentaries,
        Category::Adult,
        Category::Channels,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Movies => "movies",
            Category::Series => "series",
            Category::Cartoons => "cartoons",
            Category::Sports => "sports",
            Category::News => "news",
            Category::Music => "music",
            Category::Documentaries => "documentaries",
            Category::Adult => "adult",
            Category::Channels => "channels",
        }
    }

    /// Categories whose entries are grouped by show and season
    pub fn is_episodic(&self) -> bool {
        matches!(self, Category::Series | Category::Cartoons)
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::Channels
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = crate::error::LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| crate::error::LibraryError::UnknownCategory(s.to_string()))
    }
}

/// Single playlist entry (channel/movie/episode)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Stable id derived from name, url and group (see [`item_id`])
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default = "default_duration")]
    pub duration_seconds: i64,
    #[serde(default)]
    pub tvg_id: String,
    #[serde(default)]
    pub tvg_name: String,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default = "default_group")]
    pub group: String,
    /// Any other `key="value"` pairs from the header line
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_attributes: BTreeMap<String, String>,
}

impl Entry {
    /// Entry with only a name and url; metadata at its defaults
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        let mut entry = Self {
            name: name.into(),
            url: url.into(),
            ..Self::default()
        };
        entry.assign_id();
        entry
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self.assign_id();
        self
    }

    /// Recompute `id`; call after changing name, url or group
    pub fn assign_id(&mut self) {
        self.id = item_id(&self.name, &self.url, &self.group);
    }
}

/// Generate item id from name, url and group.
/// Identical (name, url, group) triples share an id.
pub fn item_id(name: &str, url: &str, group: &str) -> String {
    let hash: i32 = [name, url, group].join("-").chars().fold(0, |acc: i32, c| {
        (acc << 5).wrapping_sub(acc).wrapping_add(c as i32)
    });
    format!("item_{}", hash.unsigned_abs())
}

impl Default for Entry {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            url: String::new(),
            duration_seconds: UNKNOWN_DURATION,
            tvg_id: String::new(),
            tvg_name: String::new(),
            logo_url: String::new(),
            group: DEFAULT_GROUP.to_string(),
            extra_attributes: BTreeMap::new(),
        }
    }
}

fn default_duration() -> i64 {
    UNKNOWN_DURATION
}

fn default_group() -> String {
    DEFAULT_GROUP.to_string()
}

/// Show/season/episode extracted from an episodic title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesInfo {
    pub show_name: String,
    pub season: u32,
    pub episode: u32,
}

/// Entry placed inside a show/season grouping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    #[serde(flatten)]
    pub entry: Entry,
    #[serde(flatten)]
    pub info: SeriesInfo,
}

/// Seasons of one show, keyed by season number
pub type SeasonMap = BTreeMap<u32, Vec<Episode>>;

/// Shows of an episodic category, keyed by show name
pub type SeriesMap = BTreeMap<String, SeasonMap>;

/// Contents of one category in the organized library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryContent {
    Flat(Vec<Entry>),
    Episodic(SeriesMap),
}

impl CategoryContent {
    /// Empty content of the right shape for `category`
    pub fn empty_for(category: Category) -> Self {
        if category.is_episodic() {
            CategoryContent::Episodic(SeriesMap::new())
        } else {
            CategoryContent::Flat(Vec::new())
        }
    }

    /// Number of entries (episodes for episodic content)
    pub fn len(&self) -> usize {
        match self {
            CategoryContent::Flat(items) => items.len(),
            CategoryContent::Episodic(shows) => shows
                .values()
                .flat_map(|seasons| seasons.values())
                .map(|episodes| episodes.len())
                .sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Organized library: every category mapped to its content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    pub categories: BTreeMap<Category, CategoryContent>,
}

impl Default for Library {
    fn default() -> Self {
        Self {
            categories: Category::ALL
                .iter()
                .map(|c| (*c, CategoryContent::empty_for(*c)))
                .collect(),
        }
    }
}

/// Export of one category as a downloadable playlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistExport {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

/// Playlist statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistStats {
    pub total: usize,
    pub categories: BTreeMap<Category, usize>,
    pub groups: BTreeMap<String, usize>,
    pub with_logo: usize,
    pub without_logo: usize,
    pub protocols: BTreeMap<String, usize>,
}

/// Metadata guessed from a stream URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlMetadata {
    pub protocol: String,
    pub extension: String,
    pub quality: String,
    pub bitrate: String,
}

/// Which lines the parser accepts as stream URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UrlPolicy {
    /// Any line starting with `http`
    #[default]
    HttpPrefix,
    /// Any valid URL whose scheme is a known streaming protocol
    StreamSchemes,
}

/// Parsing options
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Trim and collapse whitespace in names and groups
    pub normalize: bool,
    /// Keep only the first entry for each url
    pub remove_duplicates: bool,
    pub url_policy: UrlPolicy,
}

/// Field used by `sort`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Name,
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Field used by `group_by`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupField {
    #[default]
    Group,
    TvgId,
    TvgName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_str() {
        assert_eq!("Series".parse::<Category>().unwrap(), Category::Series);
        assert_eq!(" documentaries ".parse::<Category>().unwrap(), Category::Documentaries);
        assert!("others".parse::<Category>().is_err());
        assert!(Category::Cartoons.is_episodic());
        assert!(!Category::Channels.is_episodic());
    }

    #[test]
    fn test_entry_defaults() {
        let entry = Entry::new("Canal", "http://c");
        assert_eq!(entry.duration_seconds, UNKNOWN_DURATION);
        assert_eq!(entry.group, DEFAULT_GROUP);

        let decoded: Entry = serde_json::from_str(r#"{"name":"A","url":"http://a"}"#).unwrap();
        assert_eq!(decoded.group, DEFAULT_GROUP);
        assert_eq!(decoded.duration_seconds, UNKNOWN_DURATION);
        assert!(decoded.id.is_empty());
    }

    #[test]
    fn test_item_id() {
        let entry = Entry::new("Canal", "http://c");
        assert!(entry.id.starts_with("item_"));
        assert_eq!(entry.id, item_id("Canal", "http://c", DEFAULT_GROUP));
        assert_eq!(entry.id, Entry::new("Canal", "http://c").id);

        let regrouped = entry.clone().with_group("Abertos");
        assert_ne!(regrouped.id, entry.id);
        assert_ne!(Entry::new("Canal", "http://d").id, entry.id);
    }

    #[test]
    fn test_library_json_shape() {
        let mut library = Library::default();
        let episode = Episode {
            entry: Entry::new("Lost S01E01", "http://l"),
            info: SeriesInfo {
                show_name: "Lost".into(),
                season: 1,
                episode: 1,
            },
        };
        library.categories.insert(
            Category::Series,
            CategoryContent::Episodic(SeriesMap::from([(
                "Lost".to_string(),
                SeasonMap::from([(1, vec![episode])]),
            )])),
        );

        let json = serde_json::to_value(&library).unwrap();
        assert_eq!(json["categories"]["series"]["episodic"]["Lost"]["1"][0]["showName"], "Lost");
        assert_eq!(json["categories"]["series"]["episodic"]["Lost"]["1"][0]["url"], "http://l");
        assert!(json["categories"]["movies"]["flat"].is_array());

        let decoded: Library = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, library);
    }
}
