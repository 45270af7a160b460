//! Bearer-token authentication for chronal.
//!
//! This crate provides:
//! - Registration and password login issuing opaque bearer tokens
//! - Token storage (in-memory, or SQLite via the `sqlite` feature)
//! - Axum extractors for authentication

mod config;
mod error;
mod extractors;
mod handlers;
mod password;
mod state;
mod tokens;

#[cfg(test)]
mod test_support;

pub use config::AuthConfig;
pub use error::AuthError;
pub use extractors::{bearer_token, CurrentUser, OptionalUser, Superuser};
pub use handlers::user_routes;
pub use password::{hash_password_blocking, verify_password_blocking};
pub use state::AuthState;
pub use tokens::InMemoryTokenStore;
#[cfg(feature = "sqlite")]
pub use tokens::SqliteTokenStore;
