//! Basic-Auth credentials parsed from `user:pass` strings

use crate::error::{Result, SmokeError};
use std::fmt;

/// A Basic-Auth username/password pair
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Split `raw` on the first colon. The password may itself contain colons.
    pub fn parse(target: &str, raw: &str) -> Result<Self> {
        let (username, password) = raw.split_once(':').ok_or_else(|| SmokeError::Credentials {
            target: target.to_string(),
            reason: "expected 'user:pass'".to_string(),
        })?;

        if username.is_empty() {
            return Err(SmokeError::Credentials {
                target: target.to_string(),
                reason: "username is empty".to_string(),
            });
        }

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_pair() {
        let creds = Credentials::parse("Icinga 2", "root:icinga").unwrap();
        assert_eq!(creds.username, "root");
        assert_eq!(creds.password, "icinga");
    }

    #[test]
    fn test_password_keeps_later_colons() {
        let creds = Credentials::parse("Icinga 2", "root:pa:ss").unwrap();
        assert_eq!(creds.username, "root");
        assert_eq!(creds.password, "pa:ss");
    }

    #[test]
    fn test_empty_password_allowed() {
        let creds = Credentials::parse("Icinga Web 2", "admin:").unwrap();
        assert_eq!(creds.password, "");
    }

    #[test]
    fn test_missing_colon_rejected() {
        let err = Credentials::parse("Icinga 2", "root").unwrap_err();
        assert!(matches!(err, SmokeError::Credentials { .. }));
    }

    #[test]
    fn test_empty_username_rejected() {
        assert!(Credentials::parse("Icinga 2", ":icinga").is_err());
    }

    #[test]
    fn test_debug_hides_password() {
        let creds = Credentials::parse("Icinga 2", "root:secret").unwrap();
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("root"));
        assert!(!rendered.contains("secret"));
    }
}
