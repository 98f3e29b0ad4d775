//! Named credential lookup.
//!
//! Model configurations reference credentials by environment variable name;
//! the secret itself never touches the database. A missing credential is not
//! an error here - it surfaces at dispatch time as a `NotConfigured` outcome.

use std::sync::Once;

static DOTENV: Once = Once::new();

/// Load a `.env` file from the working directory, if present.
///
/// Safe to call many times; the file is only read once per process.
pub fn init() {
    DOTENV.call_once(|| {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
    });
}

/// Resolve a credential by environment variable name.
///
/// Returns `None` for an empty name, an unset variable, or an empty value.
pub fn resolve(name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// Check whether a credential is present without exposing its value.
pub fn is_configured(name: &str) -> bool {
    resolve(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_returns_value_when_set() {
        std::env::set_var("CHATLIST_TEST_CRED_SET", "secret");
        assert_eq!(
            resolve("CHATLIST_TEST_CRED_SET"),
            Some("secret".to_string())
        );
        assert!(is_configured("CHATLIST_TEST_CRED_SET"));
    }

    #[test]
    fn test_resolve_returns_none_when_unset() {
        assert_eq!(resolve("CHATLIST_TEST_CRED_UNSET"), None);
        assert!(!is_configured("CHATLIST_TEST_CRED_UNSET"));
    }

    #[test]
    fn test_resolve_treats_empty_value_as_absent() {
        std::env::set_var("CHATLIST_TEST_CRED_EMPTY", "");
        assert_eq!(resolve("CHATLIST_TEST_CRED_EMPTY"), None);
    }

    #[test]
    fn test_resolve_empty_name_is_absent() {
        assert_eq!(resolve(""), None);
    }
}
