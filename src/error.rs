use thiserror::Error;

use crate::models::Category;

/// Errors raised when mutating or reading a stored library.
///
/// The parsing pipeline itself never fails; these only cover
/// operations on an already-built library.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The category name is not one of the fixed categories.
    #[error("unknown category: {0:?}")]
    UnknownCategory(String),

    /// An entry index past the end of a category.
    #[error("index {index} out of range for {category} ({len} entries)")]
    IndexOutOfRange {
        category: Category,
        index: usize,
        len: usize,
    },

    /// No entry with this id in the category.
    #[error("no entry {id} in {category}")]
    EntryNotFound { category: Category, id: String },

    /// No library has been committed to the store yet.
    #[error("no library has been ingested yet")]
    EmptyStore,
}

pub type Result<T> = std::result::Result<T, LibraryError>;
