//! Application configuration.
//!
//! The only configuration is the provider application key, read from the
//! process environment at startup (a `.env` file is honored if present).
//! The key initializes the auth provider once, process-wide, before first
//! use.

use anyhow::Result;

/// Environment variable holding the provider application key
const APP_KEY_VAR: &str = "SIGNON_APP_KEY";

#[derive(Debug, Clone)]
pub struct Config {
    pub app_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let app_key = std::env::var(APP_KEY_VAR).map_err(|_| {
            anyhow::anyhow!("{} is not set; add it to the environment or a .env file", APP_KEY_VAR)
        })?;
        Ok(Self { app_key })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var tests mutate process state; keep them to a single test so they
    // cannot race each other.
    #[test]
    fn test_from_env() {
        std::env::set_var(APP_KEY_VAR, "key-123");
        let config = Config::from_env().unwrap();
        assert_eq!(config.app_key, "key-123");

        std::env::remove_var(APP_KEY_VAR);
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains(APP_KEY_VAR));
    }
}
