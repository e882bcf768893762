//! Remote JWK set with a per-`kid` key cache

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::DecodingKey;
use keygate_domain::{AuthError, OAuthProvider, Result};
use moka::future::Cache;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::errors::InfraError;
use crate::http::HttpClient;

/// How long fetched keys stay cached
pub const DEFAULT_JWKS_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

const MAX_CACHED_KEYS: u64 = 64;

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kty: String,
    #[serde(default)]
    kid: Option<String>,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
}

/// Decoding keys of one JWKS endpoint, cached by key id.
///
/// A lookup for an unknown `kid` refetches the set at most once; concurrent
/// misses share a single fetch.
#[derive(Clone)]
pub struct JwksCache {
    provider: OAuthProvider,
    url: String,
    http: HttpClient,
    keys: Cache<String, Arc<DecodingKey>>,
    refresh: Arc<Mutex<()>>,
}

impl JwksCache {
    pub fn new(provider: OAuthProvider, url: impl Into<String>, http: HttpClient) -> Self {
        Self::with_ttl(provider, url, http, DEFAULT_JWKS_CACHE_TTL)
    }

    pub fn with_ttl(
        provider: OAuthProvider,
        url: impl Into<String>,
        http: HttpClient,
        ttl: Duration,
    ) -> Self {
        Self {
            provider,
            url: url.into(),
            http,
            keys: Cache::builder().time_to_live(ttl).max_capacity(MAX_CACHED_KEYS).build(),
            refresh: Arc::new(Mutex::new(())),
        }
    }

    /// Decoding key for `kid`.
    ///
    /// # Errors
    /// `InvalidProviderToken` when the key set does not contain `kid`,
    /// `ProviderUnavailable` when the set cannot be fetched.
    pub async fn key(&self, kid: &str) -> Result<Arc<DecodingKey>> {
        if let Some(key) = self.keys.get(kid).await {
            return Ok(key);
        }

        let _guard = self.refresh.lock().await;
        // Another caller may have refreshed while this one waited.
        if let Some(key) = self.keys.get(kid).await {
            return Ok(key);
        }

        self.refresh_keys().await?;
        self.keys.get(kid).await.ok_or_else(|| {
            debug!(provider = %self.provider, kid, "Key id not in JWKS");
            AuthError::InvalidProviderToken(format!("unknown signing key `{kid}`"))
        })
    }

    /// Fetch the key set and cache every usable RSA key.
    pub async fn refresh_keys(&self) -> Result<usize> {
        let url = Url::parse(&self.url).map_err(InfraError::from)?;
        let response = self
            .http
            .send(self.http.get(url))
            .await
            .map_err(|err| err.for_provider(self.provider))?;

        let status = response.status();
        if !status.is_success() {
            warn!(provider = %self.provider, status = status.as_u16(), "JWKS fetch failed");
            return Err(AuthError::provider_unavailable(
                self.provider,
                format!("JWKS endpoint returned HTTP {}", status.as_u16()),
            ));
        }

        let set: JwkSet = response.json().await.map_err(|err| {
            AuthError::provider_unavailable(self.provider, format!("unreadable JWKS: {err}"))
        })?;

        let mut loaded = 0;
        for jwk in set.keys {
            let (Some(kid), Some(n), Some(e)) = (jwk.kid, jwk.n, jwk.e) else {
                continue;
            };
            if jwk.kty != "RSA" {
                continue;
            }
            match DecodingKey::from_rsa_components(&n, &e) {
                Ok(key) => {
                    self.keys.insert(kid, Arc::new(key)).await;
                    loaded += 1;
                }
                Err(err) => warn!(provider = %self.provider, kid = %kid, error = %err, "Skipping unusable JWK"),
            }
        }

        info!(provider = %self.provider, keys = loaded, "JWKS refreshed");
        Ok(loaded)
    }

    /// Drop every cached key; the next lookup refetches.
    pub fn invalidate(&self) {
        self.keys.invalidate_all();
    }
}

impl std::fmt::Debug for JwksCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwksCache")
            .field("provider", &self.provider)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}
