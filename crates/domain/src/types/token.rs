//! Bearer token types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::TOKEN_TYPE_BEARER;
use crate::impl_wire_name_conversions;

/// Which half of a token pair a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl_wire_name_conversions!(TokenType, crate::AuthError::InvalidToken {
    Access => "access",
    Refresh => "refresh",
});

/// Access and refresh token issued together.
///
/// Only the caller keeps the pair; Keygate stores nothing about it except a
/// revocation marker once a token is revoked or rotated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry of the access token
    pub expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
    /// Always "Bearer"
    pub token_type: String,
}

impl TokenPair {
    #[must_use]
    pub fn new(
        access_token: String,
        refresh_token: String,
        expires_at: DateTime<Utc>,
        refresh_expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at,
            refresh_expires_at,
            token_type: TOKEN_TYPE_BEARER.to_string(),
        }
    }

    /// Seconds until the access token expires, clamped at zero.
    #[must_use]
    pub fn expires_in(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds().max(0)
    }
}

/// Identity asserted by a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub user_id: String,
    pub email: String,
    /// Unique per token; the revocation key
    pub token_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub token_type: TokenType,
}

impl TokenClaims {
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
