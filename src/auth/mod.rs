//! Authentication module: session lifecycle and credential persistence.
//!
//! This module provides:
//! - `AccountManager`: sign-in/sign-out orchestration and session restoration
//! - `CredentialStore`: secure OS-level storage for tokens and profiles
//! - `AuthProvider`: callback-style interface to the external OAuth provider
//! - `oneshot`: one-shot bridging of provider callbacks into async code
//!
//! Sessions restore at startup only while the persisted token is unexpired.

pub mod credentials;
pub mod error;
pub mod oneshot;
pub mod provider;
pub mod session;
pub mod token;

pub use credentials::{CredentialStore, KeyringStorage, MemoryStorage, SecureStorage};
pub use error::{AuthError, ProviderError};
pub use provider::{AuthProvider, DemoProvider};
pub use session::{AccountManager, Session};
pub use token::{AuthToken, Profile};
