//! Playlist pipeline services
//!
//! text → entries (`m3u_parser`) → categories (`classifier`) →
//! show/season grouping (`organizer`) → library (`library`), with
//! `serializer` rendering any entry list back to M3U text.

pub mod classifier;
pub mod entries;
pub mod library;
pub mod m3u_parser;
pub mod organizer;
pub mod serializer;
pub mod store;
pub mod stream_url;

pub use classifier::{ContentClassifier, RuleTable};
pub use library::{build_library, categorize, ingest, IngestReport};
pub use m3u_parser::{parse, M3UParser};
pub use organizer::{extract_series_info, flatten, organize};
pub use serializer::generate;
pub use store::{LibraryStore, MemoryStore, Snapshot};
