//! Verification-only token handle
//!
//! Holds the public key and the revocation list, never the private key, so
//! it can be handed to request handlers freely.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use keygate_domain::{AuthError, Result, TokenClaims, TokenType};
use tracing::debug;

use super::claims::JwtClaims;
use super::revocation::RevocationStore;

/// Checks signature, expiry and revocation of Keygate tokens.
///
/// The checks run in that order, so a forged token is always `InvalidToken`
/// and an expired one is `TokenExpired` even if it was also revoked.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    revocations: Arc<dyn RevocationStore>,
}

impl TokenVerifier {
    pub fn new(
        decoding_key: DecodingKey,
        issuer: &str,
        audience: &str,
        revocations: Arc<dyn RevocationStore>,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        // Expiry is checked after decoding so it can be reported separately.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        Self { decoding_key, validation, revocations }
    }

    pub fn verify_access(&self, token: &str) -> Result<TokenClaims> {
        self.verify(token, TokenType::Access)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<TokenClaims> {
        self.verify(token, TokenType::Refresh)
    }

    /// Full pipeline: signature and structure, token type, expiry,
    /// revocation.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<TokenClaims> {
        let claims = self.decode_ignoring_expiry(token)?;

        if claims.typ != expected {
            debug!(expected = %expected, actual = %claims.typ, "Token type mismatch");
            return Err(AuthError::InvalidToken(format!(
                "expected {expected} token, got {}",
                claims.typ
            )));
        }

        let claims = claims.into_token_claims()?;
        if claims.is_expired_at(Utc::now()) {
            return Err(AuthError::TokenExpired);
        }

        if self.revocations.is_revoked(&claims.token_id) {
            debug!(token_id = %claims.token_id, "Rejected revoked token");
            return Err(AuthError::TokenBlacklisted);
        }

        Ok(claims)
    }

    /// Signature, issuer and audience only. Accepts expired and revoked
    /// tokens of either type.
    pub fn decode_ignoring_expiry(&self, token: &str) -> Result<JwtClaims> {
        decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| {
                let reason = describe(err.kind());
                debug!(reason, "Token failed verification");
                AuthError::InvalidToken(reason.to_string())
            })
    }

    pub fn is_revoked(&self, token_id: &str) -> bool {
        self.revocations.is_revoked(token_id)
    }
}

fn describe(kind: &ErrorKind) -> &'static str {
    match kind {
        ErrorKind::InvalidSignature => "invalid signature",
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => "unsupported algorithm",
        ErrorKind::InvalidIssuer => "invalid issuer",
        ErrorKind::InvalidAudience => "invalid audience",
        ErrorKind::MissingRequiredClaim(_) => "missing required claim",
        ErrorKind::ExpiredSignature => "token expired",
        ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
            "malformed token"
        }
        _ => "token verification failed",
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("issuer", &self.validation.iss)
            .field("audience", &self.validation.aud)
            .finish_non_exhaustive()
    }
}
