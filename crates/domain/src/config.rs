//! Configuration structures
//!
//! Built once at process start (see `keygate_infra::config`) and passed by
//! reference into the token and OAuth services. Every section deserialises
//! from TOML/JSON with defaults for anything omitted.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    APPLE_AUTHORIZE_URL, APPLE_DEFAULT_SCOPES, APPLE_ISSUER, APPLE_JWKS_URL, APPLE_TOKEN_URL,
    DEFAULT_ACCESS_TOKEN_TTL_SECS, DEFAULT_PROVIDER_TIMEOUT_SECS, DEFAULT_REFRESH_TOKEN_TTL_SECS,
    DEFAULT_SIGNING_KEY_ID, DEFAULT_STATE_TTL_SECS, DEFAULT_TOKEN_AUDIENCE, DEFAULT_TOKEN_ISSUER,
    GOOGLE_AUTHORIZE_URL, GOOGLE_DEFAULT_SCOPES, GOOGLE_TOKEN_URL, GOOGLE_USERINFO_URL,
    MAX_TOKEN_TTL_SECS,
};
use crate::errors::{AuthError, Result};
use crate::types::OAuthProvider;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeygateConfig {
    pub token: TokenConfig,
    pub oauth: OAuthConfig,
    pub logging: LoggingConfig,
}

impl KeygateConfig {
    /// Reject configurations the services could not run with.
    ///
    /// # Errors
    /// Returns `AuthError::Config` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.token.validate()?;
        self.oauth.validate()
    }
}

/// Bearer token issuance settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub issuer: String,
    pub audience: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
    /// RSA private key (PKCS#8 or PKCS#1 PEM). When absent an ephemeral key
    /// is generated unless `require_key_material` is set.
    pub private_key_pem: Option<String>,
    /// Optional public key; must match the private key when both are given.
    pub public_key_pem: Option<String>,
    pub key_id: String,
    pub require_key_material: bool,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_TOKEN_ISSUER.to_string(),
            audience: DEFAULT_TOKEN_AUDIENCE.to_string(),
            access_ttl_secs: DEFAULT_ACCESS_TOKEN_TTL_SECS,
            refresh_ttl_secs: DEFAULT_REFRESH_TOKEN_TTL_SECS,
            private_key_pem: None,
            public_key_pem: None,
            key_id: DEFAULT_SIGNING_KEY_ID.to_string(),
            require_key_material: false,
        }
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .field("private_key_pem", &self.private_key_pem.as_ref().map(|_| "<redacted>"))
            .field("public_key_pem", &self.public_key_pem.is_some())
            .field("key_id", &self.key_id)
            .field("require_key_material", &self.require_key_material)
            .finish()
    }
}

impl TokenConfig {
    #[must_use]
    pub const fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_ttl_secs)
    }

    #[must_use]
    pub const fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_ttl_secs)
    }

    /// # Errors
    /// Returns `AuthError::Config` for zero or oversized TTLs, an access TTL
    /// longer than the refresh TTL, or missing key material when it is
    /// required.
    pub fn validate(&self) -> Result<()> {
        if self.access_ttl_secs == 0 || self.refresh_ttl_secs == 0 {
            return Err(AuthError::Config("token TTLs must be greater than zero".into()));
        }
        if self.refresh_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(AuthError::Config(format!(
                "token TTLs must not exceed {MAX_TOKEN_TTL_SECS}s"
            )));
        }
        if self.access_ttl_secs > self.refresh_ttl_secs {
            return Err(AuthError::Config(
                "access token TTL must not exceed refresh token TTL".into(),
            ));
        }
        if self.require_key_material && self.private_key_pem.is_none() {
            return Err(AuthError::Config("token.private_key_pem is required".into()));
        }
        if self.issuer.trim().is_empty() {
            return Err(AuthError::Config("token.issuer must not be empty".into()));
        }
        Ok(())
    }
}

/// Settings shared by every OAuth provider plus the per-provider sections
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    pub google: Option<ProviderConfig>,
    pub apple: Option<AppleConfig>,
    /// Lifetime of a pending authorization (state + PKCE verifier)
    pub state_ttl_secs: u64,
    /// Upper bound on each provider network call
    pub request_timeout_secs: u64,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            google: None,
            apple: None,
            state_ttl_secs: DEFAULT_STATE_TTL_SECS,
            request_timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
        }
    }
}

impl OAuthConfig {
    #[must_use]
    pub const fn state_ttl(&self) -> Duration {
        Duration::from_secs(self.state_ttl_secs)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Client settings for `provider`, if it is configured.
    #[must_use]
    pub fn provider(&self, provider: OAuthProvider) -> Option<&ProviderConfig> {
        match provider {
            OAuthProvider::Google => self.google.as_ref(),
            OAuthProvider::Apple => self.apple.as_ref().map(|apple| &apple.client),
        }
    }

    /// Providers that have a configuration section.
    #[must_use]
    pub fn configured_providers(&self) -> Vec<OAuthProvider> {
        OAuthProvider::ALL.into_iter().filter(|p| self.provider(*p).is_some()).collect()
    }

    /// # Errors
    /// Returns `AuthError::Config` for a zero state TTL or timeout, or an
    /// incomplete provider section.
    pub fn validate(&self) -> Result<()> {
        if self.state_ttl_secs == 0 {
            return Err(AuthError::Config("oauth.state_ttl_secs must be greater than zero".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(AuthError::Config(
                "oauth.request_timeout_secs must be greater than zero".into(),
            ));
        }
        for provider in self.configured_providers() {
            if let Some(settings) = self.provider(provider) {
                settings.validate(provider)?;
            }
        }
        Ok(())
    }
}

/// OAuth client registration at one provider
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    pub redirect_url: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    pub authorize_url: String,
    pub token_url: String,
    #[serde(default)]
    pub userinfo_url: Option<String>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("redirect_url", &self.redirect_url)
            .field("scopes", &self.scopes)
            .field("authorize_url", &self.authorize_url)
            .field("token_url", &self.token_url)
            .field("userinfo_url", &self.userinfo_url)
            .finish()
    }
}

impl ProviderConfig {
    /// Google settings with the standard endpoints and scopes.
    pub fn google(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: Some(client_secret.into()),
            redirect_url: redirect_url.into(),
            scopes: GOOGLE_DEFAULT_SCOPES.iter().map(ToString::to_string).collect(),
            authorize_url: GOOGLE_AUTHORIZE_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: Some(GOOGLE_USERINFO_URL.to_string()),
        }
    }

    /// Apple settings with the standard endpoints and scopes.
    ///
    /// `client_secret` is the signed client-secret JWT Apple expects.
    pub fn apple(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: Some(client_secret.into()),
            redirect_url: redirect_url.into(),
            scopes: APPLE_DEFAULT_SCOPES.iter().map(ToString::to_string).collect(),
            authorize_url: APPLE_AUTHORIZE_URL.to_string(),
            token_url: APPLE_TOKEN_URL.to_string(),
            userinfo_url: None,
        }
    }

    /// Space-separated scope list as sent on the authorization request.
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }

    fn validate(&self, provider: OAuthProvider) -> Result<()> {
        let missing = |field: &str| AuthError::Config(format!("oauth.{provider}.{field} is required"));
        if self.client_id.trim().is_empty() {
            return Err(missing("client_id"));
        }
        if self.redirect_url.trim().is_empty() {
            return Err(missing("redirect_url"));
        }
        if self.authorize_url.trim().is_empty() {
            return Err(missing("authorize_url"));
        }
        if self.token_url.trim().is_empty() {
            return Err(missing("token_url"));
        }
        if provider == OAuthProvider::Google && self.userinfo_url.is_none() {
            return Err(missing("userinfo_url"));
        }
        Ok(())
    }
}

/// Apple client settings plus ID-token verification parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppleConfig {
    #[serde(flatten)]
    pub client: ProviderConfig,
    #[serde(default = "default_apple_jwks_url")]
    pub jwks_url: String,
    #[serde(default = "default_apple_issuer")]
    pub issuer: String,
    /// Decode Apple ID tokens without checking their signature. Development
    /// only.
    #[serde(default)]
    pub skip_signature_verification: bool,
}

impl AppleConfig {
    #[must_use]
    pub fn new(client: ProviderConfig) -> Self {
        Self {
            client,
            jwks_url: default_apple_jwks_url(),
            issuer: default_apple_issuer(),
            skip_signature_verification: false,
        }
    }
}

fn default_apple_jwks_url() -> String {
    APPLE_JWKS_URL.to_string()
}

fn default_apple_issuer() -> String {
    APPLE_ISSUER.to_string()
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
