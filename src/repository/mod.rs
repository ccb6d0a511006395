//! Repository layer for catalog persistence.
//!
//! SQLite via rusqlite with one connection per operation: open, run a
//! single statement, commit, close. No transaction spans the existence
//! check and the following insert; the unique `url` key is the sole
//! concurrency guard.

mod site;

pub use site::{SiteRepository, SiteStore};

use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Repository errors.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("duplicate url: {0}")]
    DuplicateUrl(String),

    #[error("cannot open database at {path}: {source}")]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
}

impl RepositoryError {
    /// Whether this error is the unique-key rejection of an insert that
    /// raced the existence check. Callers log and continue.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateUrl(_))
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Parse a datetime string from the database, defaulting to Unix epoch on error.
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Parse an optional datetime string from the database.
pub fn parse_datetime_opt(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}
