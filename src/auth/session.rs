// Allow dead code: accessor surface also exercised from tests
#![allow(dead_code)]

//! Session lifecycle: sign-in, sign-out, and restoration.
//!
//! `AccountManager` owns the published `Session` state and orchestrates the
//! auth provider's callback flows (bridged through `auth::oneshot`) and the
//! credential store. Within one sign-in the steps run strictly in order:
//! token, persist token, fetch profile, publish state, persist profile.
//!
//! A single logical session exists per process; concurrent sign-in calls are
//! not guarded against.

use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::credentials::CredentialStore;
use super::error::AuthError;
use super::oneshot;
use super::provider::AuthProvider;
use super::token::{AuthToken, Profile};

/// Credential store key for the persisted access token
const TOKEN_KEY: &str = "OAUTHTOKEN";

/// Credential store key for the persisted user profile
const PROFILE_KEY: &str = "USER";

/// Capacity of the session-change broadcast channel. Session transitions are
/// rare; a small buffer only has to absorb a slow subscriber.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Current authentication state of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Unauthenticated,
    Authenticated(Profile),
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }
}

pub struct AccountManager {
    provider: Arc<dyn AuthProvider>,
    store: CredentialStore,
    session: RwLock<Session>,
    events: broadcast::Sender<Session>,
}

impl AccountManager {
    /// Create the manager, attempting to restore a cached session.
    ///
    /// Restoration succeeds only when the stored token exists and is
    /// unexpired AND a stored profile exists; anything less starts
    /// unauthenticated.
    pub fn new(provider: Arc<dyn AuthProvider>, store: CredentialStore) -> Self {
        let session = Self::restore(&store);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            provider,
            store,
            session: RwLock::new(session),
            events,
        }
    }

    fn restore(store: &CredentialStore) -> Session {
        let token: AuthToken = match store.get(TOKEN_KEY) {
            Some(token) => token,
            None => {
                debug!("No cached token; starting unauthenticated");
                return Session::Unauthenticated;
            }
        };

        if token.is_expired() {
            debug!(expires_at = %token.expires_at, "Cached token expired; starting unauthenticated");
            return Session::Unauthenticated;
        }

        match store.get::<Profile>(PROFILE_KEY) {
            Some(profile) => {
                info!(user = %profile.id, "Restored cached session");
                Session::Authenticated(profile)
            }
            None => {
                debug!("Cached token present but no profile; starting unauthenticated");
                Session::Unauthenticated
            }
        }
    }

    /// Run the interactive sign-in flow.
    ///
    /// On any failure the error propagates and the published session is
    /// unchanged; there is no partial transition.
    pub async fn sign_in(&self) -> Result<(), AuthError> {
        let token = self.login().await?;
        self.store.put(TOKEN_KEY, &token);

        let profile = self.fetch_profile().await?;

        self.publish(Session::Authenticated(profile.clone()));
        self.store.put(PROFILE_KEY, &profile);
        info!(user = %profile.id, "Sign-in complete");
        Ok(())
    }

    /// Sign out: invalidate the provider-side session, then tear down the
    /// local one.
    ///
    /// Local teardown always proceeds; a failed remote logout is logged and
    /// otherwise ignored.
    pub async fn sign_out(&self) {
        if let Err(e) = self.logout().await {
            warn!(error = %e, "Provider logout failed; clearing local session anyway");
        }

        self.store.delete(TOKEN_KEY);
        self.store.delete(PROFILE_KEY);
        self.publish(Session::Unauthenticated);
        info!("Signed out");
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        self.session.read().unwrap().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.read().unwrap().is_authenticated()
    }

    /// Subscribe to session changes. Every transition is broadcast after the
    /// published state has been updated.
    pub fn subscribe(&self) -> broadcast::Receiver<Session> {
        self.events.subscribe()
    }

    fn publish(&self, session: Session) {
        *self.session.write().unwrap() = session.clone();
        // Send fails only when nobody is subscribed
        let _ = self.events.send(session);
    }

    // ------------------------------------------------------------------------
    // Callback bridging
    // ------------------------------------------------------------------------

    async fn login(&self) -> Result<AuthToken, AuthError> {
        let (completion, waiter) = oneshot::channel();
        self.provider
            .login_interactive(Box::new(move |token, error| match (token, error) {
                (_, Some(e)) => completion.reject(e.into()),
                (Some(token), None) => completion.resolve(token),
                (None, None) => completion.reject(AuthError::IncompleteCallback),
            }));
        waiter.wait().await
    }

    async fn fetch_profile(&self) -> Result<Profile, AuthError> {
        let (completion, waiter) = oneshot::channel();
        self.provider
            .fetch_profile(Box::new(move |profile, error| match (profile, error) {
                (_, Some(e)) => completion.reject(e.into()),
                (Some(profile), None) => completion.resolve(profile),
                (None, None) => completion.reject(AuthError::IncompleteCallback),
            }));
        waiter.wait().await
    }

    async fn logout(&self) -> Result<(), AuthError> {
        let (completion, waiter) = oneshot::channel();
        self.provider.logout(Box::new(move |error| match error {
            Some(e) => completion.reject(e.into()),
            None => completion.resolve(()),
        }));
        waiter.wait().await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::{MemoryStorage, SecureStorage};
    use crate::auth::error::ProviderError;
    use crate::auth::provider::{LoginCallback, LogoutCallback, ProfileCallback};
    use chrono::{Duration, Utc};

    /// Scripted provider response for one call.
    #[derive(Clone)]
    enum Script<T> {
        Succeed(T),
        Fail(&'static str),
        /// Callback fires with neither value nor error
        Empty,
        /// Callback is dropped without ever firing
        Silent,
    }

    struct MockProvider {
        login: Script<AuthToken>,
        profile: Script<Profile>,
        logout: Script<()>,
    }

    impl MockProvider {
        fn succeeding() -> Self {
            Self {
                login: Script::Succeed(test_token(3600)),
                profile: Script::Succeed(test_profile()),
                logout: Script::Succeed(()),
            }
        }
    }

    impl AuthProvider for MockProvider {
        fn login_interactive(&self, done: LoginCallback) {
            match self.login.clone() {
                Script::Succeed(token) => done(Some(token), None),
                Script::Fail(msg) => done(None, Some(ProviderError::new(msg))),
                Script::Empty => done(None, None),
                Script::Silent => drop(done),
            }
        }

        fn fetch_profile(&self, done: ProfileCallback) {
            match self.profile.clone() {
                Script::Succeed(profile) => done(Some(profile), None),
                Script::Fail(msg) => done(None, Some(ProviderError::new(msg))),
                Script::Empty => done(None, None),
                Script::Silent => drop(done),
            }
        }

        fn logout(&self, done: LogoutCallback) {
            match self.logout.clone() {
                Script::Succeed(()) | Script::Empty => done(None),
                Script::Fail(msg) => done(Some(ProviderError::new(msg))),
                Script::Silent => drop(done),
            }
        }
    }

    const TEST_SERVICE: &str = "signon-test";

    fn test_token(valid_for_secs: i64) -> AuthToken {
        AuthToken::new("token-abc", Utc::now() + Duration::seconds(valid_for_secs))
    }

    fn test_profile() -> Profile {
        Profile {
            id: "u1".to_string(),
            nickname: None,
            email: None,
        }
    }

    /// Manager over a shared in-memory backend, plus an inspection store
    /// bound to the same records.
    fn manager_with(provider: MockProvider) -> (AccountManager, CredentialStore) {
        let backend: Arc<dyn SecureStorage> = Arc::new(MemoryStorage::default());
        let store = CredentialStore::with_backend(TEST_SERVICE, Arc::clone(&backend));
        let inspect = CredentialStore::with_backend(TEST_SERVICE, backend);
        (AccountManager::new(Arc::new(provider), store), inspect)
    }

    // ------------------------------------------------------------------------
    // Sign-in
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_sign_in_success_publishes_and_persists() {
        let (manager, records) = manager_with(MockProvider::succeeding());
        assert!(!manager.is_signed_in());

        manager.sign_in().await.unwrap();

        assert_eq!(manager.session(), Session::Authenticated(test_profile()));
        assert!(records.get::<AuthToken>(TOKEN_KEY).is_some());
        assert_eq!(records.get::<Profile>(PROFILE_KEY), Some(test_profile()));
    }

    #[tokio::test]
    async fn test_sign_in_login_error_propagates_and_leaves_state() {
        let (manager, records) = manager_with(MockProvider {
            login: Script::Fail("network_down"),
            ..MockProvider::succeeding()
        });

        let err = manager.sign_in().await.unwrap_err();
        assert!(matches!(err, AuthError::Provider(ref e) if e.message == "network_down"));
        assert_eq!(manager.session(), Session::Unauthenticated);
        assert!(records.get::<AuthToken>(TOKEN_KEY).is_none());
    }

    #[tokio::test]
    async fn test_sign_in_profile_error_leaves_state_unchanged() {
        let (manager, _records) = manager_with(MockProvider {
            profile: Script::Fail("user_info_unavailable"),
            ..MockProvider::succeeding()
        });

        let err = manager.sign_in().await.unwrap_err();
        assert!(matches!(err, AuthError::Provider(_)));
        // No partial authenticated state
        assert_eq!(manager.session(), Session::Unauthenticated);
    }

    #[tokio::test]
    async fn test_sign_in_empty_login_callback_is_incomplete_error() {
        let (manager, _records) = manager_with(MockProvider {
            login: Script::Empty,
            ..MockProvider::succeeding()
        });

        let err = manager.sign_in().await.unwrap_err();
        assert!(matches!(err, AuthError::IncompleteCallback));
        assert_eq!(manager.session(), Session::Unauthenticated);
    }

    #[tokio::test]
    async fn test_sign_in_silent_login_callback_resolves_instead_of_hanging() {
        let (manager, _records) = manager_with(MockProvider {
            login: Script::Silent,
            ..MockProvider::succeeding()
        });

        let err = manager.sign_in().await.unwrap_err();
        assert!(matches!(err, AuthError::IncompleteCallback));
    }

    #[tokio::test]
    async fn test_sign_in_empty_profile_callback_is_incomplete_error() {
        let (manager, _records) = manager_with(MockProvider {
            profile: Script::Empty,
            ..MockProvider::succeeding()
        });

        let err = manager.sign_in().await.unwrap_err();
        assert!(matches!(err, AuthError::IncompleteCallback));
        assert_eq!(manager.session(), Session::Unauthenticated);
    }

    // ------------------------------------------------------------------------
    // Sign-out
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_sign_out_clears_records_and_state() {
        let (manager, records) = manager_with(MockProvider::succeeding());
        manager.sign_in().await.unwrap();

        manager.sign_out().await;

        assert_eq!(manager.session(), Session::Unauthenticated);
        assert!(records.get::<AuthToken>(TOKEN_KEY).is_none());
        assert!(records.get::<Profile>(PROFILE_KEY).is_none());
    }

    #[tokio::test]
    async fn test_sign_out_tears_down_even_when_remote_logout_fails() {
        let (manager, records) = manager_with(MockProvider {
            logout: Script::Fail("logout_unreachable"),
            ..MockProvider::succeeding()
        });
        manager.sign_in().await.unwrap();

        manager.sign_out().await;

        assert_eq!(manager.session(), Session::Unauthenticated);
        assert!(records.get::<AuthToken>(TOKEN_KEY).is_none());
        assert!(records.get::<Profile>(PROFILE_KEY).is_none());
    }

    // ------------------------------------------------------------------------
    // Restoration
    // ------------------------------------------------------------------------

    fn seeded_manager(token: Option<AuthToken>, profile: Option<Profile>) -> AccountManager {
        let backend: Arc<dyn SecureStorage> = Arc::new(MemoryStorage::default());
        let seed = CredentialStore::with_backend(TEST_SERVICE, Arc::clone(&backend));
        if let Some(token) = token {
            seed.put(TOKEN_KEY, &token);
        }
        if let Some(profile) = profile {
            seed.put(PROFILE_KEY, &profile);
        }

        let store = CredentialStore::with_backend(TEST_SERVICE, backend);
        AccountManager::new(Arc::new(MockProvider::succeeding()), store)
    }

    #[tokio::test]
    async fn test_restore_with_valid_token_and_profile() {
        let manager = seeded_manager(Some(test_token(3600)), Some(test_profile()));
        assert_eq!(manager.session(), Session::Authenticated(test_profile()));
    }

    #[tokio::test]
    async fn test_restore_rejects_expired_token() {
        let manager = seeded_manager(Some(test_token(-10)), Some(test_profile()));
        assert_eq!(manager.session(), Session::Unauthenticated);
    }

    #[tokio::test]
    async fn test_restore_requires_profile() {
        let manager = seeded_manager(Some(test_token(3600)), None);
        assert_eq!(manager.session(), Session::Unauthenticated);
    }

    #[tokio::test]
    async fn test_restore_requires_token() {
        let manager = seeded_manager(None, Some(test_profile()));
        assert_eq!(manager.session(), Session::Unauthenticated);
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_subscribers_see_each_transition() {
        let (manager, _records) = manager_with(MockProvider::succeeding());
        let mut events = manager.subscribe();

        manager.sign_in().await.unwrap();
        manager.sign_out().await;

        assert_eq!(
            events.recv().await.unwrap(),
            Session::Authenticated(test_profile())
        );
        assert_eq!(events.recv().await.unwrap(), Session::Unauthenticated);
    }

    #[tokio::test]
    async fn test_failed_sign_in_emits_no_event() {
        let (manager, _records) = manager_with(MockProvider {
            login: Script::Fail("network_down"),
            ..MockProvider::succeeding()
        });
        let mut events = manager.subscribe();

        let _ = manager.sign_in().await;

        assert!(matches!(
            events.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}
