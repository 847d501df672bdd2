//! Data model and SQLite storage for the todo service.
//!
//! # Overview
//! `Database` owns the location of the SQLite file and ensures the schema
//! once at start-up. Every unit of work goes through a `Session`: a fresh
//! connection with an open transaction that is committed explicitly or
//! rolled back when dropped.
//!
//! # Design
//! - No state is cached between sessions; each one re-reads the table.
//! - Ids come from `AUTOINCREMENT`, so a deleted id is never handed out again.
//! - The crate is synchronous. Async callers run sessions on a blocking pool.

pub mod error;
pub mod store;
pub mod types;

pub use error::StoreError;
pub use store::{Database, Session};
pub use types::{NewTodo, TodoItem};
