use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Not authenticated")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Email not found")]
    EmailNotFound,

    #[error("Wrong password")]
    WrongPassword,

    #[error("Email already in use")]
    EmailInUse,

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("'{0}' is not allowed")]
    NameNotAllowed(String),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("storage error: {0}")]
    Storage(String),
}
