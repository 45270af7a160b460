use std::{env, fmt, time::Duration};

const DEFAULT_API_PREFIX: &str = "/api/v1";
const DEFAULT_SQLITE_PATH: &str = "chronal.db";

/// Credentials of the superuser created or promoted at startup.
#[derive(Clone)]
pub struct SuperuserSeed {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for SuperuserSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuperuserSeed")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path the API routes are nested under (default: "/api/v1")
    pub api_prefix: String,
    /// Path to SQLite database file (default: "chronal.db")
    /// Note: Only used when the `sqlite` feature is enabled.
    #[cfg_attr(not(feature = "sqlite"), allow(dead_code))]
    pub sqlite_path: String,
    /// Per-request timeout in seconds (default: 10)
    pub request_timeout_seconds: u64,
    /// How often expired tokens are purged, in seconds (default: 300)
    pub token_purge_interval_seconds: u64,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_allow_origins: Vec<String>,
    pub superuser: Option<SuperuserSeed>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `API_PREFIX` - API mount path (default: "/api/v1")
    /// - `SQLITE_PATH` - SQLite database path (default: "chronal.db")
    /// - `REQUEST_TIMEOUT_SECONDS` - Request timeout (default: 10)
    /// - `TOKEN_PURGE_INTERVAL_SECONDS` - Expired token purge interval (default: 300)
    /// - `CORS_ALLOW_ORIGINS` - Comma-separated origins, `*` for any (default: "*")
    /// - `SUPERUSER_EMAIL` / `SUPERUSER_PASSWORD` - Superuser to seed (default: unset)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, falling back to defaults
    /// for missing or unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let positive = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };

        let superuser = match (lookup("SUPERUSER_EMAIL"), lookup("SUPERUSER_PASSWORD")) {
            (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
                Some(SuperuserSeed {
                    email: email.trim().to_string(),
                    password,
                })
            }
            _ => None,
        };

        Self {
            api_prefix: normalize_prefix(
                &lookup("API_PREFIX").unwrap_or_else(|| DEFAULT_API_PREFIX.to_string()),
            ),
            sqlite_path: lookup("SQLITE_PATH").unwrap_or_else(|| DEFAULT_SQLITE_PATH.to_string()),
            request_timeout_seconds: positive("REQUEST_TIMEOUT_SECONDS", 10),
            token_purge_interval_seconds: positive("TOKEN_PURGE_INTERVAL_SECONDS", 300),
            cors_allow_origins: parse_origins(
                &lookup("CORS_ALLOW_ORIGINS").unwrap_or_else(|| "*".to_string()),
            ),
            superuser,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn token_purge_interval(&self) -> Duration {
        Duration::from_secs(self.token_purge_interval_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Leading slash, no trailing slash. Blank or `/` mounts the API at the root.
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// A `*` anywhere in the list allows any origin.
fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    if origins.iter().any(|o| o == "*") {
        Vec::new()
    } else {
        origins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();

        assert_eq!(config.api_prefix, "/api/v1");
        assert_eq!(config.sqlite_path, "chronal.db");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.token_purge_interval(), Duration::from_secs(300));
        assert!(config.cors_allow_origins.is_empty());
        assert!(config.superuser.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_with(&[
            ("API_PREFIX", "v2/"),
            ("SQLITE_PATH", "/tmp/test.db"),
            ("REQUEST_TIMEOUT_SECONDS", "30"),
            ("TOKEN_PURGE_INTERVAL_SECONDS", "60"),
            ("CORS_ALLOW_ORIGINS", "https://a.example, https://b.example"),
        ]);

        assert_eq!(config.api_prefix, "/v2");
        assert_eq!(config.sqlite_path, "/tmp/test.db");
        assert_eq!(config.request_timeout_seconds, 30);
        assert_eq!(config.token_purge_interval_seconds, 60);
        assert_eq!(
            config.cors_allow_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_invalid_numbers_fall_back_to_defaults() {
        let config = config_with(&[
            ("REQUEST_TIMEOUT_SECONDS", "soon"),
            ("TOKEN_PURGE_INTERVAL_SECONDS", "0"),
        ]);

        assert_eq!(config.request_timeout_seconds, 10);
        assert_eq!(config.token_purge_interval_seconds, 300);
    }

    #[test]
    fn test_root_prefix() {
        assert_eq!(config_with(&[("API_PREFIX", "/")]).api_prefix, "");
        assert_eq!(config_with(&[("API_PREFIX", "")]).api_prefix, "");
    }

    #[test]
    fn test_wildcard_origin_allows_any() {
        let config = config_with(&[("CORS_ALLOW_ORIGINS", "https://a.example,*")]);
        assert!(config.cors_allow_origins.is_empty());
    }

    #[test]
    fn test_superuser_requires_both_values() {
        assert!(config_with(&[("SUPERUSER_EMAIL", "root@example.com")])
            .superuser
            .is_none());

        let config = config_with(&[
            ("SUPERUSER_EMAIL", " root@example.com "),
            ("SUPERUSER_PASSWORD", "s3cret-pass"),
        ]);
        let seed = config.superuser.unwrap();
        assert_eq!(seed.email, "root@example.com");
        assert_eq!(seed.password, "s3cret-pass");
        assert!(!format!("{seed:?}").contains("s3cret-pass"));
    }
}
