//! Storage backend implementations.
//!
//! Concrete implementations of the repository traits defined in
//! `chronal_core::storage`, selected at compile time via feature flags.
//!
//! # Feature Flags
//!
//! - `inmemory` (default): HashMaps behind `Arc<RwLock<_>>`, nothing persisted
//! - `sqlite`: SQLite backend using `rusqlite` and `tokio-rusqlite`
//!
//! Build with SQLite:
//! ```bash
//! cargo build -p chronal --no-default-features --features sqlite
//! ```

// The in-memory backend also backs the router tests of every build.
#[cfg(any(feature = "inmemory", test))]
pub mod inmemory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(feature = "inmemory", test))]
pub use inmemory::InMemoryRepository;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRepository;
