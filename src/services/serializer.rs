use lazy_static::lazy_static;
use regex::Regex;
use std::fmt::Write;

use crate::models::Entry;
use crate::services::m3u_parser::{EXTINF_PREFIX, GROUP_TITLE, M3U_HEADER, TVG_ID, TVG_LOGO, TVG_NAME};

lazy_static! {
    /// Attribute keys the parser can read back (same shape as its `ATTR_REGEX`)
    static ref ATTR_KEY_REGEX: Regex = Regex::new(r"^\w+(?:-\w+)*$").unwrap();
}

/// Build the EXTINF line for an entry, without trailing newline.
///
/// Extra attributes whose key the parser could not read back (e.g. `x.y`)
/// are skipped.
pub fn generate_extinf(entry: &Entry) -> String {
    let mut line = format!("{}{}", EXTINF_PREFIX, entry.duration_seconds);

    let named = [
        (TVG_ID, &entry.tvg_id),
        (TVG_NAME, &entry.tvg_name),
        (TVG_LOGO, &entry.logo_url),
        (GROUP_TITLE, &entry.group),
    ];
    for (key, value) in named {
        if !value.is_empty() {
            let _ = write!(line, " {}=\"{}\"", key, value);
        }
    }

    for (key, value) in &entry.extra_attributes {
        if !ATTR_KEY_REGEX.is_match(key) {
            tracing::debug!(key = %key, name = %entry.name, "Skipping unreadable attribute key");
            continue;
        }
        let _ = write!(line, " {}=\"{}\"", key, value);
    }

    line.push(',');
    line.push_str(&entry.name);
    line
}

/// Render entries as M3U text.
///
/// The title only labels the export in logs; the format has no
/// standard place for it.
pub fn generate(entries: &[Entry], title: &str) -> String {
    tracing::debug!(title, entries = entries.len(), "Generating playlist");

    let mut m3u = String::with_capacity(16 + entries.len() * 160);
    m3u.push_str(M3U_HEADER);
    m3u.push('\n');

    for entry in entries {
        m3u.push_str(&generate_extinf(entry));
        m3u.push('\n');
        m3u.push_str(&entry.url);
        m3u.push('\n');
    }

    m3u
}
