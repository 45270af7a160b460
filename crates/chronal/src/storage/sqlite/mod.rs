//! SQLite storage backend.
//!
//! Implements the repository traits with `rusqlite`, wrapped for async use by
//! `tokio-rusqlite`. A single connection serializes every statement, and
//! foreign keys are switched on when the schema is initialized so grants
//! cascade with their calendar.

mod conversions;
mod error;
mod repository;
mod schema;

pub use repository::SqliteRepository;
