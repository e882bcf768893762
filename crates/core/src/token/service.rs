//! Token issuance, verification, rotation and revocation

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::encode;
use keygate_domain::{AuthError, Result, TokenClaims, TokenConfig, TokenPair, TokenType};
use tracing::{debug, info};
use uuid::Uuid;

use super::claims::JwtClaims;
use super::keys::{PublicJwk, SigningKeys};
use super::revocation::RevocationStore;
use super::verifier::TokenVerifier;

/// Issues and checks RS256 access/refresh token pairs.
///
/// Stateless apart from the revocation list: a token is valid when its
/// signature checks out, it has not expired and its `jti` is not revoked.
pub struct TokenService {
    keys: SigningKeys,
    issuer: String,
    audience: String,
    access_ttl: chrono::Duration,
    refresh_ttl: chrono::Duration,
    verifier: TokenVerifier,
    revocations: Arc<dyn RevocationStore>,
}

impl TokenService {
    /// # Errors
    /// `AuthError::Config` for invalid TTLs or unusable key material.
    pub fn new(config: &TokenConfig, revocations: Arc<dyn RevocationStore>) -> Result<Self> {
        config.validate()?;
        let keys = SigningKeys::from_config(config)?;
        Self::with_keys(config, keys, revocations)
    }

    /// Build with already-loaded key material (the config's PEM fields are
    /// ignored).
    pub fn with_keys(
        config: &TokenConfig,
        keys: SigningKeys,
        revocations: Arc<dyn RevocationStore>,
    ) -> Result<Self> {
        let access_ttl = to_chrono(config.access_ttl())?;
        let refresh_ttl = to_chrono(config.refresh_ttl())?;
        let verifier = TokenVerifier::new(
            keys.decoding_key().clone(),
            &config.issuer,
            &config.audience,
            Arc::clone(&revocations),
        );

        info!(
            issuer = %config.issuer,
            key_id = %keys.key_id(),
            ephemeral_key = keys.is_ephemeral(),
            access_ttl_secs = config.access_ttl_secs,
            refresh_ttl_secs = config.refresh_ttl_secs,
            "Token service initialised"
        );

        Ok(Self {
            keys,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_ttl,
            refresh_ttl,
            verifier,
            revocations,
        })
    }

    /// Issue a fresh access/refresh pair for `user_id`.
    pub fn generate_token_pair(&self, user_id: &str, email: &str) -> Result<TokenPair> {
        if user_id.trim().is_empty() {
            return Err(AuthError::Internal("cannot issue tokens for an empty user id".into()));
        }

        let (access_token, expires_at) =
            self.issue(user_id, email, TokenType::Access, self.access_ttl)?;
        let (refresh_token, refresh_expires_at) =
            self.issue(user_id, email, TokenType::Refresh, self.refresh_ttl)?;

        debug!(user_id, "Issued token pair");
        Ok(TokenPair::new(access_token, refresh_token, expires_at, refresh_expires_at))
    }

    /// Sign one token. A negative `ttl` yields an already expired token.
    pub(crate) fn issue(
        &self,
        user_id: &str,
        email: &str,
        token_type: TokenType,
        ttl: chrono::Duration,
    ) -> Result<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let exp = now.checked_add_signed(ttl).ok_or_else(|| {
            AuthError::Config(format!("{token_type} token TTL of {}s is out of range", ttl.num_seconds()))
        })?;
        let claims = JwtClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            typ: token_type,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let expires_at = claims.expires_at()?;

        let token = encode(&self.keys.header(), &claims, self.keys.encoding_key())
            .map_err(|e| AuthError::Internal(format!("failed to sign {token_type} token: {e}")))?;
        Ok((token, expires_at))
    }

    pub fn validate_access_token(&self, token: &str) -> Result<TokenClaims> {
        self.verifier.verify_access(token)
    }

    pub fn validate_refresh_token(&self, token: &str) -> Result<TokenClaims> {
        self.verifier.verify_refresh(token)
    }

    /// Exchange a refresh token for a new pair.
    ///
    /// The presented token is revoked before the new pair is issued, so each
    /// refresh token can be used once. Of several concurrent calls with the
    /// same token exactly one succeeds; the rest get `TokenBlacklisted`.
    pub fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenPair> {
        let claims = self.verifier.verify_refresh(refresh_token)?;

        if !self.revocations.revoke_if_absent(&claims.token_id, claims.expires_at) {
            debug!(token_id = %claims.token_id, "Refresh token already rotated");
            return Err(AuthError::TokenBlacklisted);
        }

        let pair = self.generate_token_pair(&claims.user_id, &claims.email)?;
        info!(user_id = %claims.user_id, rotated = %claims.token_id, "Refresh token rotated");
        Ok(pair)
    }

    /// Revoke a token until its own expiry.
    ///
    /// The signature must verify; expiry is not required. Tokens that have
    /// already expired need no entry and succeed without one.
    pub fn blacklist_token(&self, token: &str) -> Result<()> {
        let claims = self.verifier.decode_ignoring_expiry(token)?.into_token_claims()?;

        if claims.is_expired_at(Utc::now()) {
            debug!(token_id = %claims.token_id, "Token already expired; nothing to revoke");
            return Ok(());
        }

        self.revocations.revoke(&claims.token_id, claims.expires_at);
        info!(
            token_id = %claims.token_id,
            token_type = %claims.token_type,
            user_id = %claims.user_id,
            "Token revoked"
        );
        Ok(())
    }

    /// Revoke both halves of a pair. Both are attempted; the first failure is
    /// returned.
    pub fn revoke_pair(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        let access = self.blacklist_token(access_token);
        let refresh = self.blacklist_token(refresh_token);
        access.and(refresh)
    }

    pub fn is_revoked(&self, token_id: &str) -> bool {
        self.revocations.is_revoked(token_id)
    }

    /// Verification-only handle sharing this service's key and revocation
    /// list.
    pub fn verifier(&self) -> TokenVerifier {
        self.verifier.clone()
    }

    pub fn public_key_pem(&self) -> &str {
        self.keys.public_key_pem()
    }

    pub fn public_jwk(&self) -> &PublicJwk {
        self.keys.public_jwk()
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

fn to_chrono(ttl: std::time::Duration) -> Result<chrono::Duration> {
    chrono::Duration::from_std(ttl)
        .map_err(|_| AuthError::Config(format!("token TTL of {}s is out of range", ttl.as_secs())))
}
