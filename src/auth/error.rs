use thiserror::Error;

/// Failure surfaced by the auth provider's callbacks.
///
/// The provider is a black box (network, user-cancelled, SDK-internal all
/// look the same from here), so this carries only the provider's message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// The provider reported a failure (propagated to sign-in callers;
    /// sign-out logs it and proceeds with local teardown).
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The provider's callback completed with neither a value nor an error,
    /// or was dropped without ever firing.
    #[error("provider callback completed without a result")]
    IncompleteCallback,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::new("network_down");
        assert_eq!(err.to_string(), "network_down");

        let auth: AuthError = err.into();
        assert_eq!(auth.to_string(), "provider error: network_down");
    }

    #[test]
    fn test_incomplete_callback_display() {
        let err = AuthError::IncompleteCallback;
        assert!(err.to_string().contains("without a result"));
    }
}
