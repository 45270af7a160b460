pub mod access;
pub mod authz;
pub mod calendars;
pub mod error;
pub mod extract;
pub mod health;
pub mod users;

pub use error::AppError;
