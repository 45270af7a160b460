use super::{email_to_name, AuthError, RegisterRequest};

/// Validates an email address and returns it normalized to lowercase.
///
/// The check is deliberately shallow: a non-empty local part, a single `@`,
/// and a domain with a dot that neither starts nor ends the domain.
///
/// # Examples
///
/// ```
/// use chronal_core::auth::validate_email;
///
/// assert_eq!(validate_email(" Ana@Example.com ").unwrap(), "ana@example.com");
/// assert!(validate_email("ana@localhost").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    let invalid = || AuthError::InvalidEmail(email.clone());

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }
    Ok(email)
}

/// Validates that a password meets the minimum length, counted in characters.
pub fn validate_password(password: &str, min_length: usize) -> Result<(), AuthError> {
    if password.chars().count() < min_length {
        return Err(AuthError::PasswordTooShort(min_length));
    }
    Ok(())
}

/// Rejects a value that contains any blacklisted name, ignoring case.
pub fn check_blacklisted_names(value: &str, blacklist: &[String]) -> Result<(), AuthError> {
    let lowered = value.to_lowercase();
    match blacklist
        .iter()
        .map(|name| name.trim().to_lowercase())
        .find(|name| !name.is_empty() && lowered.contains(name.as_str()))
    {
        Some(name) => Err(AuthError::NameNotAllowed(name)),
        None => Ok(()),
    }
}

/// A registration that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRegistration {
    pub email: String,
    pub name: String,
}

/// Validates a registration request and derives the display name.
pub fn validate_registration(
    request: &RegisterRequest,
    min_password_length: usize,
    blacklist: &[String],
) -> Result<ValidRegistration, AuthError> {
    let email = validate_email(&request.email)?;
    validate_password(&request.password, min_password_length)?;

    let name = request
        .name
        .clone()
        .unwrap_or_else(|| email_to_name(&email));

    check_blacklisted_names(&email, blacklist)?;
    check_blacklisted_names(&name, blacklist)?;

    Ok(ValidRegistration { email, name })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blacklist() -> Vec<String> {
        vec!["admin".to_string(), "owner".to_string()]
    }

    fn request(email: &str, password: &str, name: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.map(str::to_string),
        }
    }

    // ==================== validate_email ====================

    #[test]
    fn accepts_and_normalizes_email() {
        assert_eq!(
            validate_email("Bob.Smith@Example.ORG").unwrap(),
            "bob.smith@example.org"
        );
    }

    #[test]
    fn rejects_malformed_emails() {
        for email in [
            "",
            "no-at-sign",
            "@example.com",
            "bob@",
            "bob@example",
            "bob@.com",
            "bob@example.",
            "bob@@example.com",
            "bo b@example.com",
        ] {
            assert!(
                matches!(validate_email(email), Err(AuthError::InvalidEmail(_))),
                "{email:?} should be rejected"
            );
        }
    }

    // ==================== validate_password ====================

    #[test]
    fn password_length_boundary() {
        assert!(validate_password("12345678", 8).is_ok());
        assert_eq!(
            validate_password("1234567", 8),
            Err(AuthError::PasswordTooShort(8))
        );
    }

    // ==================== check_blacklisted_names ====================

    #[test]
    fn blacklist_is_case_insensitive_substring() {
        assert_eq!(
            check_blacklisted_names("SuperAdmin", &blacklist()),
            Err(AuthError::NameNotAllowed("admin".to_string()))
        );
        assert!(check_blacklisted_names("owner@example.com", &blacklist()).is_err());
        assert!(check_blacklisted_names("alice", &blacklist()).is_ok());
    }

    #[test]
    fn blank_blacklist_entries_are_ignored() {
        let list = vec![" ".to_string(), String::new()];
        assert!(check_blacklisted_names("anything", &list).is_ok());
    }

    // ==================== validate_registration ====================

    #[test]
    fn registration_derives_name_from_email() {
        let valid =
            validate_registration(&request("Carol@example.com", "password1", None), 8, &blacklist())
                .unwrap();
        assert_eq!(valid.email, "carol@example.com");
        assert_eq!(valid.name, "carol");
    }

    #[test]
    fn registration_keeps_explicit_name() {
        let valid = validate_registration(
            &request("carol@example.com", "password1", Some("Carol D.")),
            8,
            &blacklist(),
        )
        .unwrap();
        assert_eq!(valid.name, "Carol D.");
    }

    #[test]
    fn registration_rejects_blacklisted_name_or_email() {
        assert!(validate_registration(
            &request("carol@example.com", "password1", Some("The Owner")),
            8,
            &blacklist()
        )
        .is_err());
        assert!(validate_registration(
            &request("admin@example.com", "password1", None),
            8,
            &blacklist()
        )
        .is_err());
    }

    #[test]
    fn registration_checks_password() {
        assert_eq!(
            validate_registration(&request("dan@example.com", "short", None), 8, &blacklist()),
            Err(AuthError::PasswordTooShort(8))
        );
    }
}
