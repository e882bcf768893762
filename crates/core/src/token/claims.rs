//! JWT payload

use chrono::{DateTime, Utc};
use keygate_domain::{AuthError, Result, TokenClaims, TokenType};
use serde::{Deserialize, Serialize};

/// Registered and private claims carried by every Keygate token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub email: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub typ: TokenType,
    pub iss: String,
    pub aud: String,
}

impl JwtClaims {
    pub fn expires_at(&self) -> Result<DateTime<Utc>> {
        timestamp(self.exp, "exp")
    }

    pub fn into_token_claims(self) -> Result<TokenClaims> {
        Ok(TokenClaims {
            issued_at: timestamp(self.iat, "iat")?,
            expires_at: timestamp(self.exp, "exp")?,
            user_id: self.sub,
            email: self.email,
            token_id: self.jti,
            token_type: self.typ,
        })
    }
}

fn timestamp(secs: i64, claim: &str) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| AuthError::InvalidToken(format!("{claim} claim out of range")))
}
