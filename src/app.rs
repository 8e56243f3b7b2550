//! Application state management.
//!
//! This module contains the `App` struct tying the UI to the account
//! manager: it caches the latest published session for rendering, spawns
//! sign-in/sign-out work off the UI loop, and collects results through a
//! message channel.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{error, info};

use crate::auth::{AccountManager, AuthError, Session};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// A single sign-in produces one message; 8 leaves headroom.
const CHANNEL_BUFFER_SIZE: usize = 8;

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Showing the sign-in or signed-in screen
    Ready,
    /// A sign-in flow is running
    SigningIn,
    /// Shutting down
    Quitting,
}

/// Messages from background tasks back to the UI loop
enum AccountMessage {
    SignInFinished(Result<(), AuthError>),
}

pub struct App {
    pub accounts: Arc<AccountManager>,
    pub state: AppState,
    /// Latest published session, cached for rendering
    pub session: Session,
    /// Last sign-in failure, shown on the sign-in screen
    pub last_error: Option<String>,

    session_events: broadcast::Receiver<Session>,
    tx: mpsc::Sender<AccountMessage>,
    rx: mpsc::Receiver<AccountMessage>,
}

impl App {
    pub fn new(accounts: Arc<AccountManager>) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let session_events = accounts.subscribe();
        let session = accounts.session();

        Self {
            accounts,
            state: AppState::Ready,
            session,
            last_error: None,
            session_events,
            tx,
            rx,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Kick off the interactive sign-in flow in the background.
    pub fn start_sign_in(&mut self) {
        if self.state == AppState::SigningIn {
            return;
        }
        self.state = AppState::SigningIn;
        self.last_error = None;

        let accounts = Arc::clone(&self.accounts);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = accounts.sign_in().await;
            let _ = tx.send(AccountMessage::SignInFinished(result)).await;
        });
    }

    /// Kick off sign-out. Fire-and-forget: local teardown always happens and
    /// the session event updates the screen.
    pub fn start_sign_out(&mut self) {
        let accounts = Arc::clone(&self.accounts);
        tokio::spawn(async move {
            accounts.sign_out().await;
        });
    }

    /// Drain completed background work and session events. Called once per
    /// UI tick.
    pub fn check_background_tasks(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            match message {
                AccountMessage::SignInFinished(Ok(())) => {
                    self.state = AppState::Ready;
                }
                AccountMessage::SignInFinished(Err(e)) => {
                    error!(error = %e, "Sign-in failed");
                    self.state = AppState::Ready;
                    self.last_error = Some(format!("Sign-in failed: {}", e));
                }
            }
        }

        while let Ok(session) = self.session_events.try_recv() {
            info!(signed_in = session.is_authenticated(), "Session changed");
            self.session = session;
        }
    }

    pub fn quit(&mut self) {
        self.state = AppState::Quitting;
    }
}

// ============================================================================
// Tests
// ============================================================================
