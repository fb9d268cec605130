use std::env;

use crate::models::{ParseOptions, UrlPolicy};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Input
    pub playlist_path: Option<String>,
    pub max_m3u_size_mb: usize,

    // Output
    pub export_dir: String,
    pub library_file: String,

    // Parsing
    pub remove_duplicates: bool,
    pub normalize_titles: bool,
    pub accept_stream_schemes: bool,
}

fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(value) => matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            // Input
            playlist_path: env::var("PLAYLIST_PATH").ok().filter(|p| !p.trim().is_empty()),
            max_m3u_size_mb: env::var("MAX_M3U_SIZE_MB")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .unwrap_or(100),

            // Output
            export_dir: env::var("EXPORT_DIR").unwrap_or_else(|_| "exports".to_string()),
            library_file: env::var("LIBRARY_FILE").unwrap_or_else(|_| "iptv-data.json".to_string()),

            // Parsing
            remove_duplicates: env_flag("REMOVE_DUPLICATES", false),
            normalize_titles: env_flag("NORMALIZE_TITLES", false),
            accept_stream_schemes: env_flag("ACCEPT_STREAM_SCHEMES", false),
        }
    }

    /// Parser options derived from the parsing settings
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            normalize: self.normalize_titles,
            remove_duplicates: self.remove_duplicates,
            url_policy: if self.accept_stream_schemes {
                UrlPolicy::StreamSchemes
            } else {
                UrlPolicy::HttpPrefix
            },
        }
    }

    /// Input size cap in bytes
    pub fn max_m3u_bytes(&self) -> u64 {
        (self.max_m3u_size_mb as u64).saturating_mul(1024 * 1024)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
