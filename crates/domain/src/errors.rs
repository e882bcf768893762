//! Error types used throughout Keygate
//!
//! Every failure the token service or the OAuth orchestrator can report is a
//! distinct `AuthError` variant so the HTTP layer can map it to a status code
//! without string matching. Use [`AuthError::kind`] for a stable label.

use thiserror::Error;

/// Main error type for Keygate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The token's embedded expiry has passed.
    #[error("Token expired")]
    TokenExpired,

    /// The token was revoked before its expiry.
    #[error("Token has been revoked")]
    TokenBlacklisted,

    /// Bad signature, malformed payload or wrong token type.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Unknown or unconfigured identity provider.
    #[error("Invalid provider: {0}")]
    InvalidProvider(String),

    /// Unknown, expired or already consumed OAuth state.
    #[error("Invalid or expired OAuth state")]
    InvalidState,

    /// The provider rejected the authorization code exchange.
    #[error("Invalid authorization code: {0}")]
    InvalidCode(String),

    /// The provider's userinfo endpoint could not be read.
    #[error("Failed to fetch user info: {0}")]
    UserInfoFetchFailed(String),

    /// The account-linking collaborator failed.
    #[error("Account linking failed: {0}")]
    AccountLinking(String),

    /// The provider-issued ID token is missing, malformed or unverifiable.
    #[error("Invalid provider token: {0}")]
    InvalidProviderToken(String),

    /// The provider could not be reached (transport failure or timeout).
    #[error("Provider {provider} unavailable: {message}")]
    ProviderUnavailable { provider: String, message: String },

    /// The caller cancelled the operation.
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Stable snake_case identifier, suitable for API error codes and log
    /// fields.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::TokenExpired => "token_expired",
            Self::TokenBlacklisted => "token_blacklisted",
            Self::InvalidToken(_) => "invalid_token",
            Self::InvalidProvider(_) => "invalid_provider",
            Self::InvalidState => "invalid_state",
            Self::InvalidCode(_) => "invalid_code",
            Self::UserInfoFetchFailed(_) => "user_info_fetch_failed",
            Self::AccountLinking(_) => "account_linking_failed",
            Self::InvalidProviderToken(_) => "invalid_provider_token",
            Self::ProviderUnavailable { .. } => "provider_unavailable",
            Self::Cancelled => "cancelled",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }

    /// True when the failure is attributable to the caller's input (token,
    /// provider name, state or code) rather than to Keygate or a provider
    /// outage.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::TokenExpired
                | Self::TokenBlacklisted
                | Self::InvalidToken(_)
                | Self::InvalidProvider(_)
                | Self::InvalidState
                | Self::InvalidCode(_)
                | Self::InvalidProviderToken(_)
        )
    }

    /// Shorthand for a [`AuthError::ProviderUnavailable`].
    pub fn provider_unavailable(provider: impl ToString, message: impl ToString) -> Self {
        Self::ProviderUnavailable { provider: provider.to_string(), message: message.to_string() }
    }
}

/// Result type alias for Keygate operations
pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinct() {
        let errors = [
            AuthError::TokenExpired,
            AuthError::TokenBlacklisted,
            AuthError::InvalidToken(String::new()),
            AuthError::InvalidProvider(String::new()),
            AuthError::InvalidState,
            AuthError::InvalidCode(String::new()),
            AuthError::UserInfoFetchFailed(String::new()),
            AuthError::AccountLinking(String::new()),
            AuthError::InvalidProviderToken(String::new()),
            AuthError::provider_unavailable("google", "timeout"),
            AuthError::Cancelled,
            AuthError::Config(String::new()),
            AuthError::Internal(String::new()),
        ];

        let mut kinds: Vec<_> = errors.iter().map(AuthError::kind).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn token_failures_are_client_errors() {
        assert!(AuthError::TokenExpired.is_client_error());
        assert!(AuthError::TokenBlacklisted.is_client_error());
        assert!(AuthError::InvalidState.is_client_error());
        assert!(!AuthError::provider_unavailable("apple", "dns").is_client_error());
        assert!(!AuthError::AccountLinking("db down".into()).is_client_error());
    }

    #[test]
    fn provider_unavailable_message_names_provider() {
        let err = AuthError::provider_unavailable("google", "connection refused");
        assert_eq!(err.to_string(), "Provider google unavailable: connection refused");
    }
}
