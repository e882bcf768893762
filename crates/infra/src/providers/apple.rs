//! Sign in with Apple adapter
//!
//! Apple has no userinfo endpoint; identity comes from the ID token returned
//! by the code exchange, verified against Apple's published JWKS.

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use keygate_core::IdentityProvider;
use keygate_domain::{AppleConfig, AuthError, OAuthProvider, OAuthUserInfo, ProviderTokens, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{exchange_authorization_code, lenient_bool, JwksCache};
use crate::errors::InfraError;
use crate::http::HttpClient;

/// Claims Keygate reads from an Apple ID token
#[derive(Debug, Deserialize)]
struct AppleIdClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    /// Apple sends this as a string (`"true"`) on some clients.
    #[serde(default, deserialize_with = "lenient_bool")]
    email_verified: bool,
    #[serde(default)]
    name: Option<String>,
}

impl From<AppleIdClaims> for OAuthUserInfo {
    fn from(claims: AppleIdClaims) -> Self {
        Self {
            provider_user_id: claims.sub,
            email: claims.email.unwrap_or_default(),
            email_verified: claims.email_verified,
            name: claims.name,
            locale: None,
            provider: OAuthProvider::Apple,
        }
    }
}

pub struct AppleProvider {
    settings: AppleConfig,
    http: HttpClient,
    jwks: JwksCache,
}

impl AppleProvider {
    pub fn new(settings: AppleConfig, http: HttpClient) -> Self {
        let jwks = JwksCache::new(OAuthProvider::Apple, settings.jwks_url.clone(), http.clone());
        Self { settings, http, jwks }
    }

    /// Use a prepared key cache (custom TTL, shared between instances).
    pub fn with_jwks(settings: AppleConfig, http: HttpClient, jwks: JwksCache) -> Self {
        Self { settings, http, jwks }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.settings.issuer.as_str()]);
        validation.set_audience(&[self.settings.client.client_id.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation
    }

    /// Verify `id_token` and extract the user's identity.
    ///
    /// # Errors
    /// `InvalidProviderToken` for a malformed token, an unknown key, a bad
    /// signature, or wrong issuer/audience/expiry.
    pub async fn verify_id_token(&self, id_token: &str) -> Result<OAuthUserInfo> {
        let claims = if self.settings.skip_signature_verification {
            warn!(provider = "apple", "Accepting Apple ID token without signature verification");
            let mut validation = self.validation();
            validation.insecure_disable_signature_validation();
            decode::<AppleIdClaims>(id_token, &DecodingKey::from_secret(&[]), &validation)
                .map_err(InfraError::from)?
                .claims
        } else {
            let header = decode_header(id_token).map_err(InfraError::from)?;
            let kid = header.kid.ok_or_else(|| {
                AuthError::InvalidProviderToken("id_token header has no key id".into())
            })?;
            let key = self.jwks.key(&kid).await?;
            decode::<AppleIdClaims>(id_token, &key, &self.validation())
                .map_err(InfraError::from)?
                .claims
        };

        debug!(provider = "apple", email_verified = claims.email_verified, "Verified ID token");
        Ok(claims.into())
    }
}

#[async_trait]
impl IdentityProvider for AppleProvider {
    fn provider(&self) -> OAuthProvider {
        OAuthProvider::Apple
    }

    async fn exchange_code(&self, code: &str, code_verifier: Option<&str>) -> Result<ProviderTokens> {
        exchange_authorization_code(
            &self.http,
            OAuthProvider::Apple,
            &self.settings.client,
            code,
            code_verifier,
        )
        .await
    }

    async fn fetch_user_info(&self, tokens: &ProviderTokens) -> Result<OAuthUserInfo> {
        let id_token = tokens.id_token.as_deref().filter(|t| !t.is_empty()).ok_or_else(|| {
            AuthError::InvalidProviderToken("token response carried no id_token".into())
        })?;
        self.verify_id_token(id_token).await
    }
}

impl std::fmt::Debug for AppleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppleProvider")
            .field("client_id", &self.settings.client.client_id)
            .field("issuer", &self.settings.issuer)
            .field("skip_signature_verification", &self.settings.skip_signature_verification)
            .finish_non_exhaustive()
    }
}
