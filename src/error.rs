//! Error types shared by the note store and the contact directory

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The embedded database failed (I/O, corruption, schema)
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The contact source could not be queried
    #[error("contact directory '{source_id}' failed: {reason}")]
    Directory { source_id: String, reason: String },

    #[error("invalid contact data: {0}")]
    InvalidContactData(#[from] serde_json::Error),
}

impl Error {
    pub fn directory(source_id: &str, reason: impl Into<String>) -> Self {
        Error::Directory {
            source_id: source_id.to_string(),
            reason: reason.into(),
        }
    }
}
