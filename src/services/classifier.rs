use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{Category, Entry};

// ============ RULE DATA ============
// Patterns run against the lowercased "{name} {group}" text.

const SERIES_PATTERNS: &[&str] = &[
    r"\bs\d+\s?e\d+\b",
    r"\b\d{1,2}x\d{1,3}\b",
    r"\bt\d+e\d+\b",
    r"\btemporadas?\b",
    r"\bepis[oó]dios?\b",
    r"\bepisodes?\b",
    r"\bseason\b",
    r"\bs[eé]ries?\b",
    r"\bnovelas?\b",
    r"\bdoramas?\b",
];

const MOVIE_PATTERNS: &[&str] = &[
    r"\bfilmes?\b",
    r"\bmovies?\b",
    r"\bcinema\b",
    r"\b(19|20)\d{2}\b",
    r"\b(bluray|blueray|bdrip|dvdrip|webrip|hdrip|web-dl|hdcam)\b",
    r"\b(2160p|1080p|720p|480p)\b",
    r"\blan[cç]amentos?\b",
];

const CARTOON_PATTERNS: &[&str] = &[
    r"\bdesenhos?\b",
    r"\bcartoons?\b",
    r"\binfantil\b",
    r"\bkids\b",
    r"\banima[cç][aã]o\b",
    r"\banimation\b",
    r"\bdisney\b",
    r"\bpixar\b",
];

const SPORTS_PATTERNS: &[&str] = &[
    r"\besportes?\b",
    r"\bsports?\b",
    r"\bfutebol\b",
    r"\bfootball\b",
    r"\bbasket\b",
    r"\bv[oô]lei\b",
    r"\bf1\b",
    r"\bmma\b",
    r"\bufc\b",
    r"\b(sportv|espn|premiere|combate)\b",
];

const NEWS_PATTERNS: &[&str] = &[
    r"\bnews\b",
    r"\bnot[ií]cias?\b",
    r"\bjornal\b",
    r"\binformativo\b",
    r"\brep[oó]rter\b",
    r"\bglobo\b",
    r"\bsbt\b",
    r"\brecord\b",
    r"\bband\b",
];

const MUSIC_PATTERNS: &[&str] = &[
    r"\bmusic\b",
    r"\bm[uú]sicas?\b",
    r"\bclips?\b",
    r"\bmtv\b",
    r"\bradio\b",
    r"\bhits\b",
    r"\brock\b",
    r"\bpop\b",
    r"\bsertanejo\b",
];

const DOCUMENTARY_PATTERNS: &[&str] = &[
    r"\bdocument[aá]rios?\b",
    r"\bdocumentar(y|ies)\b",
    r"\bnational\s*geographic\b",
    r"\bnat\s*geo\b",
    r"\bdiscovery\b",
    r"\bhistory\b",
    r"\banimal\b",
    r"\bnature\b",
];

const ADULT_PATTERNS: &[&str] = &[
    r"\badult[oa]?s?\b",
    r"\bxxx\b",
    r"\bsexy\b",
    r"\b18\+",
    r"\+18\b",
    r"\bplayboy\b",
    r"\bonlyfans\b",
];

/// Rule evaluation order: series markers before movie-year markers
const DEFAULT_RULES: &[(Category, &[&str])] = &[
    (Category::Series, SERIES_PATTERNS),
    (Category::Movies, MOVIE_PATTERNS),
    (Category::Cartoons, CARTOON_PATTERNS),
    (Category::Sports, SPORTS_PATTERNS),
    (Category::News, NEWS_PATTERNS),
    (Category::Music, MUSIC_PATTERNS),
    (Category::Documentaries, DOCUMENTARY_PATTERNS),
    (Category::Adult, ADULT_PATTERNS),
];

lazy_static! {
    static ref DEFAULT_TABLE: RuleTable = RuleTable::from_patterns(DEFAULT_RULES)
        .expect("built-in classifier patterns must compile");
}

/// One category and the patterns that select it
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub category: Category,
    pub patterns: Vec<Regex>,
}

impl CategoryRule {
    pub fn new(category: Category, patterns: &[&str]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { category, patterns })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }
}

/// Return the first item of `rules` accepted by `matches`
pub fn first_match<'a, R, T>(rules: &'a [R], mut matches: impl FnMut(&'a R) -> Option<T>) -> Option<T> {
    rules.iter().find_map(|rule| matches(rule))
}

/// Ordered rule table: first matching category wins, `Channels` otherwise
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<CategoryRule>,
}

impl RuleTable {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    /// Compile a table from (category, patterns) pairs, keeping their order
    pub fn from_patterns(rules: &[(Category, &[&str])]) -> Result<Self, regex::Error> {
        let rules = rules
            .iter()
            .map(|(category, patterns)| CategoryRule::new(*category, patterns))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Append a rule with the lowest priority
    pub fn push(&mut self, rule: CategoryRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Classify a name/group pair (case-insensitive)
    pub fn classify(&self, name: &str, group: &str) -> Category {
        let combined = format!("{} {}", name, group).to_lowercase();
        first_match(&self.rules, |rule| rule.matches(&combined).then_some(rule.category))
            .unwrap_or(Category::Channels)
    }
}

/// Content classifier for playlist entries
pub struct ContentClassifier;

impl ContentClassifier {
    /// Built-in rule table
    pub fn default_table() -> &'static RuleTable {
        &DEFAULT_TABLE
    }

    /// Classify based on name and group with the built-in rules
    pub fn classify(name: &str, group: &str) -> Category {
        DEFAULT_TABLE.classify(name, group)
    }

    pub fn classify_entry(entry: &Entry) -> Category {
        Self::classify(&entry.name, &entry.group)
    }
}
