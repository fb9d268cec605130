//! M3U playlist ingestion: parse entries, classify them into categories,
//! organize episodic content by show and season, and export any entry
//! list back to M3U.

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use error::LibraryError;
pub use models::{Category, CategoryContent, Entry, Episode, Library, SeriesInfo};
pub use services::{
    build_library, categorize, extract_series_info, flatten, generate, ingest, organize, parse,
};
