//! In-memory storage backend.
//!
//! Stores users, calendars and grants in HashMaps wrapped in `Arc<RwLock<_>>`.
//! Useful for development and tests where persistence is not required.
//!
//! ```rust,ignore
//! use chronal::storage::inmemory::InMemoryRepository;
//!
//! let repo = Arc::new(InMemoryRepository::new());
//! let state = AppState::from_parts(repo.clone(), repo.clone(), repo, tokens, config, auth_config);
//! ```

mod repository;

pub use repository::InMemoryRepository;
