//! Auth provider interface.
//!
//! The provider performs the actual OAuth handshake and user-info lookup;
//! this application only consumes its callback surface. Each call invokes
//! its callback exactly once, asynchronously, and is not reentrant. The
//! session manager bridges these callbacks into async code via
//! `auth::oneshot`.

use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use super::error::ProviderError;
use super::token::{AuthToken, Profile};

pub type LoginCallback = Box<dyn FnOnce(Option<AuthToken>, Option<ProviderError>) + Send>;
pub type ProfileCallback = Box<dyn FnOnce(Option<Profile>, Option<ProviderError>) + Send>;
pub type LogoutCallback = Box<dyn FnOnce(Option<ProviderError>) + Send>;

/// External OAuth provider, modeled after the callback-style SDKs this demo
/// integrates with. Exactly one callback invocation per call.
pub trait AuthProvider: Send + Sync {
    /// Run the interactive login flow; on success the callback receives an
    /// access token.
    fn login_interactive(&self, done: LoginCallback);

    /// Fetch the signed-in user's profile from the provider's user-info
    /// endpoint.
    fn fetch_profile(&self, done: ProfileCallback);

    /// Invalidate the provider-side session.
    fn logout(&self, done: LogoutCallback);
}

// ============================================================================
// Demo provider
// ============================================================================

/// Simulated delay for the interactive login flow
const DEMO_LOGIN_DELAY_MS: u64 = 400;

/// Lifetime of tokens issued by the demo provider (matches the ~6 hour
/// access tokens of the real SDK this demo stands in for)
const DEMO_TOKEN_LIFETIME_HOURS: i64 = 6;

/// In-process stand-in for a real OAuth SDK, used by the demo binary.
///
/// Issues a synthetic token and profile after a short delay so the async
/// callback bridging behaves like it would against the real thing. No
/// network traffic is involved.
pub struct DemoProvider {
    app_key: String,
    signed_in: Mutex<bool>,
}

impl DemoProvider {
    /// Initialize the provider with the application key. Called once at
    /// process start; the real SDK registers the key process-wide here.
    pub fn new(app_key: impl Into<String>) -> Self {
        let app_key = app_key.into();
        debug!(key_len = app_key.len(), "Demo auth provider initialized");
        Self {
            app_key,
            signed_in: Mutex::new(false),
        }
    }
}

impl AuthProvider for DemoProvider {
    fn login_interactive(&self, done: LoginCallback) {
        if self.app_key.is_empty() {
            let err = ProviderError::new("application key not configured");
            tokio::spawn(async move { done(None, Some(err)) });
            return;
        }

        *self.signed_in.lock().unwrap() = true;

        tokio::spawn(async move {
            // Stand-in for the user completing the consent screen
            tokio::time::sleep(Duration::from_millis(DEMO_LOGIN_DELAY_MS)).await;
            let token = AuthToken::new(
                "demo-access-token",
                Utc::now() + chrono::Duration::hours(DEMO_TOKEN_LIFETIME_HOURS),
            );
            done(Some(token), None);
        });
    }

    fn fetch_profile(&self, done: ProfileCallback) {
        let signed_in = *self.signed_in.lock().unwrap();
        tokio::spawn(async move {
            if signed_in {
                let profile = Profile {
                    id: "demo-user".to_string(),
                    nickname: Some("Demo User".to_string()),
                    email: Some("demo@example.com".to_string()),
                };
                done(Some(profile), None);
            } else {
                done(None, Some(ProviderError::new("no active provider session")));
            }
        });
    }

    fn logout(&self, done: LogoutCallback) {
        *self.signed_in.lock().unwrap() = false;
        tokio::spawn(async move { done(None) });
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_demo_login_issues_unexpired_token() {
        let provider = DemoProvider::new("demo-key");
        let (tx, rx) = oneshot::channel();
        provider.login_interactive(Box::new(move |token, error| {
            let _ = tx.send((token, error));
        }));

        let (token, error) = rx.await.unwrap();
        assert!(error.is_none());
        assert!(!token.unwrap().is_expired());
    }

    #[tokio::test]
    async fn test_demo_login_rejects_missing_app_key() {
        let provider = DemoProvider::new("");
        let (tx, rx) = oneshot::channel();
        provider.login_interactive(Box::new(move |token, error| {
            let _ = tx.send((token, error));
        }));

        let (token, error) = rx.await.unwrap();
        assert!(token.is_none());
        assert!(error.unwrap().message.contains("not configured"));
    }

    #[tokio::test]
    async fn test_demo_profile_requires_login() {
        let provider = DemoProvider::new("demo-key");

        let (tx, rx) = oneshot::channel();
        provider.fetch_profile(Box::new(move |profile, error| {
            let _ = tx.send((profile, error));
        }));
        let (profile, error) = rx.await.unwrap();
        assert!(profile.is_none());
        assert!(error.is_some());

        // After login the profile comes back
        let (tx, rx) = oneshot::channel();
        provider.login_interactive(Box::new(move |token, _| {
            let _ = tx.send(token);
        }));
        rx.await.unwrap().unwrap();

        let (tx, rx) = oneshot::channel();
        provider.fetch_profile(Box::new(move |profile, error| {
            let _ = tx.send((profile, error));
        }));
        let (profile, error) = rx.await.unwrap();
        assert!(error.is_none());
        assert_eq!(profile.unwrap().id, "demo-user");
    }
}
