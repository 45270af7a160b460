mod error;
mod functions;
mod traits;
mod types;
mod validation;

pub use error::AuthError;
pub use functions::{
    calculate_expiry, email_to_name, generate_token_id, hash_password, is_token_expired,
    issue_token, verify_password, TOKEN_LENGTH,
};
pub use traits::{AccessTokenRepository, Result};
pub use types::{AccessToken, RegisterRequest, TokenId, TokenRequest, TokenResponse};
pub use validation::{
    check_blacklisted_names, validate_email, validate_password, validate_registration,
    ValidRegistration,
};
