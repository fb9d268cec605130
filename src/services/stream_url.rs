//! Stream URL helpers
//!
//! Scheme checks used by the parser's `StreamSchemes` policy, plus
//! best-effort metadata guessed from the URL text.

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::models::UrlMetadata;

/// Schemes accepted as playable by `is_valid_stream_url`
pub const PLAYABLE_SCHEMES: [&str; 4] = ["http", "https", "rtmp", "rtsp"];

/// Schemes the parser treats as stream lines under `UrlPolicy::StreamSchemes`
pub const STREAM_SCHEMES: [&str; 8] = ["http", "https", "rtmp", "rtmps", "rtsp", "udp", "rtp", "mms"];

lazy_static! {
    static ref EXTENSION_REGEX: Regex = Regex::new(r"\.(\w+)$").unwrap();
    static ref QUALITY_REGEX: Regex = Regex::new(r"(?i)(720p|1080p|4k|hd|fullhd|sd)").unwrap();
    static ref BITRATE_REGEX: Regex = Regex::new(r"(?i)(\d+)k").unwrap();
}

fn has_scheme(url: &str, schemes: &[&str]) -> bool {
    Url::parse(url)
        .map(|parsed| schemes.contains(&parsed.scheme()))
        .unwrap_or(false)
}

/// True when `url` parses and uses a playable scheme
pub fn is_valid_stream_url(url: &str) -> bool {
    has_scheme(url, &PLAYABLE_SCHEMES)
}

/// True when `line` is a URL with any known streaming scheme
pub fn is_stream_url(line: &str) -> bool {
    has_scheme(line, &STREAM_SCHEMES)
}

/// Protocol name of a URL, `None` if it does not parse
pub fn protocol_of(url: &str) -> Option<String> {
    Url::parse(url).ok().map(|parsed| parsed.scheme().to_string())
}

/// Extract protocol, file extension, quality and bitrate hints from a URL.
/// Fields stay empty when nothing is found; unparsable URLs yield defaults.
pub fn extract_url_metadata(url: &str) -> UrlMetadata {
    let mut metadata = UrlMetadata::default();

    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!(url, error = %e, "Could not parse stream url");
            return metadata;
        }
    };

    metadata.protocol = parsed.scheme().to_string();

    if let Some(caps) = EXTENSION_REGEX.captures(parsed.path()) {
        metadata.extension = caps[1].to_string();
    }

    if let Some(caps) = QUALITY_REGEX.captures(url) {
        metadata.quality = caps[1].to_string();
    }

    if let Some(caps) = BITRATE_REGEX.captures(url) {
        metadata.bitrate = format!("{}k", &caps[1]);
    }

    metadata
}
