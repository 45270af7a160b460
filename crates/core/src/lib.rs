//! Functional core for chronal.
//!
//! Pure domain types, validation, and the calendar access policy. Nothing in
//! this crate performs I/O; the repository traits describe what the
//! imperative shell must provide.

pub mod access;
#[cfg(feature = "auth")]
pub mod auth;
pub mod calendar;
pub mod http_mapping;
pub mod serde;
pub mod storage;
