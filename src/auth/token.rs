use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OAuth access token returned by the provider's login flow.
///
/// The token is opaque to this application; only the expiry timestamp is
/// inspected (to gate session restoration at startup). Once persisted it is
/// owned by the credential store and only read back during restoration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    /// The access token used for API requests
    pub access_token: String,

    /// When the access token expires
    pub expires_at: DateTime<Utc>,
}

impl AuthToken {
    pub fn new(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    /// A token is expired unless its expiry is strictly after now.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// User identity returned by the provider after token exchange.
///
/// Persisted independently of the token so a stale profile can never be
/// paired with a missing token (restoration requires both).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub nickname: Option<String>,
    pub email: Option<String>,
}

impl Profile {
    /// Best display name for the UI: nickname, then email, then id.
    pub fn display_name(&self) -> &str {
        self.nickname
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_token_not_expired() {
        let token = AuthToken::new("abc", Utc::now() + Duration::hours(1));
        assert!(!token.is_expired());
    }

    #[test]
    fn test_token_expired() {
        let token = AuthToken::new("abc", Utc::now() - Duration::seconds(10));
        assert!(token.is_expired());
    }

    #[test]
    fn test_token_expiring_now_counts_as_expired() {
        // Expiry must be strictly after now to be usable
        let token = AuthToken::new("abc", Utc::now() - Duration::milliseconds(1));
        assert!(token.is_expired());
    }

    #[test]
    fn test_profile_display_name_preference() {
        let full = Profile {
            id: "u1".to_string(),
            nickname: Some("June".to_string()),
            email: Some("june@example.com".to_string()),
        };
        assert_eq!(full.display_name(), "June");

        let email_only = Profile {
            id: "u1".to_string(),
            nickname: None,
            email: Some("june@example.com".to_string()),
        };
        assert_eq!(email_only.display_name(), "june@example.com");

        let bare = Profile {
            id: "u1".to_string(),
            nickname: None,
            email: None,
        };
        assert_eq!(bare.display_name(), "u1");
    }
}
