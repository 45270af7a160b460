use std::time::Duration;

const DEFAULT_TOKEN_DURATION_SECONDS: u64 = 60 * 60;
const DEFAULT_PASSWORD_MIN_LENGTH: usize = 8;
const DEFAULT_BLACKLISTED_NAMES: &str = "admin,owner";

/// Complete auth configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// How long an issued bearer token stays valid.
    pub token_ttl: Duration,
    pub min_password_length: usize,
    /// Names that may not appear in a user's email or display name.
    pub blacklisted_names: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl: Duration::from_secs(DEFAULT_TOKEN_DURATION_SECONDS),
            min_password_length: DEFAULT_PASSWORD_MIN_LENGTH,
            blacklisted_names: parse_names(DEFAULT_BLACKLISTED_NAMES),
        }
    }
}

impl AuthConfig {
    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TOKEN_DURATION_SECONDS`: Bearer token lifetime (default: 3600)
    /// - `PASSWORD_MIN_LENGTH`: Minimum password length (default: 8)
    /// - `BLACKLISTED_NAMES`: Comma-separated reserved names (default: `admin,owner`)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let token_ttl = std::env::var("TOKEN_DURATION_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.token_ttl);

        let min_password_length = std::env::var("PASSWORD_MIN_LENGTH")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.min_password_length);

        let blacklisted_names = std::env::var("BLACKLISTED_NAMES")
            .map(|s| parse_names(&s))
            .unwrap_or(defaults.blacklisted_names);

        Self {
            token_ttl,
            min_password_length,
            blacklisted_names,
        }
    }

    /// Token lifetime as a chrono duration, clamped to a century.
    pub fn token_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.token_ttl)
            .unwrap_or_else(|_| chrono::Duration::days(36_500))
    }
}

fn parse_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect()
}
