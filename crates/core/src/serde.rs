//! Serde helpers for request payloads.
//!
//! Clients routinely send `""` for "no value" and pad strings with spaces;
//! these helpers normalize both at the deserialization boundary.

use serde::{Deserialize, Deserializer};

/// Deserialize an optional string, treating empty or blank strings as None.
/// Non-blank values are trimmed.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

/// Deserialize a string and trim surrounding whitespace.
pub fn deserialize_trimmed_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(s.trim().to_string())
}
