//! One-shot bridging of callback-style provider APIs into async code.
//!
//! The auth provider completes each call through a single callback that is
//! supposed to fire exactly once with either a value or an error. This module
//! turns that contract into an awaitable result:
//!
//! - `resolve` / `reject` consume the completion, so at most one fires.
//! - Dropping an unfired completion injects `AuthError::IncompleteCallback`,
//!   so a provider that never calls back cannot hang the caller.

use tokio::sync::oneshot;
use tracing::warn;

use super::error::AuthError;

/// The firing half of a one-shot bridge. Handed (boxed inside a callback)
/// to the provider; exactly one of `resolve`/`reject` may be called.
pub struct Completion<T> {
    tx: Option<oneshot::Sender<Result<T, AuthError>>>,
}

/// The awaiting half of a one-shot bridge.
pub struct Waiter<T> {
    rx: oneshot::Receiver<Result<T, AuthError>>,
}

/// Create a linked completion/waiter pair.
pub fn channel<T>() -> (Completion<T>, Waiter<T>) {
    let (tx, rx) = oneshot::channel();
    (Completion { tx: Some(tx) }, Waiter { rx })
}

impl<T> Completion<T> {
    /// Complete successfully with a value.
    pub fn resolve(mut self, value: T) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Ok(value));
        }
    }

    /// Complete with an error.
    pub fn reject(mut self, error: AuthError) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Err(error));
        }
    }
}

impl<T> Drop for Completion<T> {
    fn drop(&mut self) {
        // Zero-firing guard: a callback that was dropped without being
        // invoked resolves to an explicit error instead of hanging the
        // waiter forever.
        if let Some(tx) = self.tx.take() {
            warn!("provider callback dropped without firing");
            let _ = tx.send(Err(AuthError::IncompleteCallback));
        }
    }
}

impl<T> Waiter<T> {
    /// Suspend until the provider completes.
    pub async fn wait(self) -> Result<T, AuthError> {
        match self.rx.await {
            Ok(result) => result,
            // The sender side guarantees a value via its Drop guard; a closed
            // channel can only mean the completion never existed to fire.
            Err(_) => Err(AuthError::IncompleteCallback),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
