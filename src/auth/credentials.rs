// Allow dead code: MemoryStorage backs tests and keychain-less platforms
#![allow(dead_code)]

//! Secure, namespaced key/value persistence for session artifacts.
//!
//! `CredentialStore` serializes values to JSON and hands them to a
//! `SecureStorage` backend keyed by (service, key). The default backend is
//! the OS keychain via the `keyring` crate; `MemoryStorage` backs tests and
//! platforms without a keychain.
//!
//! Storage and serialization failures never surface past this module: writes
//! are lossy (logged and dropped) and unreadable or corrupt records read as
//! absent. Callers that need stronger guarantees should not be storing those
//! values here.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use keyring::Entry;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// Keyed byte-blob storage scoped by a service namespace.
///
/// One record per (service, key); writes overwrite, deletes are silent
/// no-ops when the record is absent.
pub trait SecureStorage: Send + Sync {
    fn put(&self, service: &str, key: &str, value: &str) -> Result<()>;
    fn get(&self, service: &str, key: &str) -> Result<Option<String>>;
    fn delete(&self, service: &str, key: &str) -> Result<()>;
}

// ============================================================================
// Backends
// ============================================================================

/// OS keychain backend (macOS Keychain, Windows Credential Manager, Secret
/// Service on Linux). Data is available after first unlock per the
/// platform's policy.
pub struct KeyringStorage;

impl SecureStorage for KeyringStorage {
    fn put(&self, service: &str, key: &str, value: &str) -> Result<()> {
        let entry = Entry::new(service, key).context("Failed to create keyring entry")?;
        entry
            .set_password(value)
            .context("Failed to store record in keychain")?;
        Ok(())
    }

    fn get(&self, service: &str, key: &str) -> Result<Option<String>> {
        let entry = Entry::new(service, key).context("Failed to create keyring entry")?;
        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read record from keychain"),
        }
    }

    fn delete(&self, service: &str, key: &str) -> Result<()> {
        let entry = Entry::new(service, key).context("Failed to create keyring entry")?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete record from keychain"),
        }
    }
}

/// In-memory backend for tests and environments without a keychain.
#[derive(Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<(String, String), String>>,
}

impl SecureStorage for MemoryStorage {
    fn put(&self, service: &str, key: &str, value: &str) -> Result<()> {
        self.records
            .lock()
            .unwrap()
            .insert((service.to_string(), key.to_string()), value.to_string());
        Ok(())
    }

    fn get(&self, service: &str, key: &str) -> Result<Option<String>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&(service.to_string(), key.to_string()))
            .cloned())
    }

    fn delete(&self, service: &str, key: &str) -> Result<()> {
        self.records
            .lock()
            .unwrap()
            .remove(&(service.to_string(), key.to_string()));
        Ok(())
    }
}

// ============================================================================
// Credential store
// ============================================================================

/// Service namespace for records owned by this application
const SERVICE_NAME: &str = "signon";

pub struct CredentialStore {
    service: String,
    backend: Arc<dyn SecureStorage>,
}

impl CredentialStore {
    /// Store backed by the OS keychain under the application namespace.
    pub fn new() -> Self {
        Self::with_backend(SERVICE_NAME, Arc::new(KeyringStorage))
    }

    /// Store over an explicit backend and namespace.
    pub fn with_backend(service: &str, backend: Arc<dyn SecureStorage>) -> Self {
        Self {
            service: service.to_string(),
            backend,
        }
    }

    /// Serialize and upsert a value under `key`. Lossy: serialization or
    /// backend failures are logged and dropped.
    pub fn put<T: Serialize>(&self, key: &str, value: &T) {
        let serialized = match serde_json::to_string(value) {
            Ok(s) => s,
            Err(e) => {
                warn!(key = key, error = %e, "Failed to serialize credential record");
                return;
            }
        };

        if let Err(e) = self.backend.put(&self.service, key, &serialized) {
            warn!(key = key, error = %e, "Failed to persist credential record");
        } else {
            debug!(key = key, "Credential record stored");
        }
    }

    /// Look up and deserialize a value. `None` covers absent, unreadable,
    /// and corrupt records alike.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let serialized = match self.backend.get(&self.service, key) {
            Ok(Some(s)) => s,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = key, error = %e, "Failed to read credential record");
                return None;
            }
        };

        match serde_json::from_str(&serialized) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = key, error = %e, "Discarding corrupt credential record");
                None
            }
        }
    }

    /// Remove a record if present; no-op otherwise.
    pub fn delete(&self, key: &str) {
        if let Err(e) = self.backend.delete(&self.service, key) {
            warn!(key = key, error = %e, "Failed to delete credential record");
        }
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
