//! Error types for the todo store.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers map "the item does not
//! exist" to a different outcome than a broken database. Everything the
//! SQLite driver reports lands in `Sql`.

use thiserror::Error;

/// Errors returned by `Database` and `Session` operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No todo with this id exists.
    #[error("todo {0} not found")]
    NotFound(i64),

    /// The caller supplied data the store refuses to persist.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
