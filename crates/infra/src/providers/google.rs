//! Google OpenID Connect adapter

use async_trait::async_trait;
use keygate_core::IdentityProvider;
use keygate_domain::{AuthError, OAuthProvider, OAuthUserInfo, ProviderConfig, ProviderTokens, Result};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::{exchange_authorization_code, lenient_bool};
use crate::errors::{HttpError, InfraError};
use crate::http::HttpClient;

/// Google userinfo response (OpenID Connect standard claims)
#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    email_verified: bool,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    locale: Option<String>,
}

impl From<GoogleUserInfo> for OAuthUserInfo {
    fn from(info: GoogleUserInfo) -> Self {
        Self {
            provider_user_id: info.sub,
            email: info.email.unwrap_or_default(),
            email_verified: info.email_verified,
            name: info.name,
            locale: info.locale,
            provider: OAuthProvider::Google,
        }
    }
}

pub struct GoogleProvider {
    settings: ProviderConfig,
    http: HttpClient,
}

impl GoogleProvider {
    pub fn new(settings: ProviderConfig, http: HttpClient) -> Self {
        Self { settings, http }
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn provider(&self) -> OAuthProvider {
        OAuthProvider::Google
    }

    async fn exchange_code(&self, code: &str, code_verifier: Option<&str>) -> Result<ProviderTokens> {
        exchange_authorization_code(&self.http, OAuthProvider::Google, &self.settings, code, code_verifier)
            .await
    }

    async fn fetch_user_info(&self, tokens: &ProviderTokens) -> Result<OAuthUserInfo> {
        let url = self
            .settings
            .userinfo_url
            .as_deref()
            .ok_or_else(|| AuthError::Config("oauth.google.userinfo_url is required".into()))?;
        let url = Url::parse(url).map_err(InfraError::from)?;

        let response = self
            .http
            .send(self.http.get(url).bearer_auth(&tokens.access_token))
            .await
            .map_err(|err| err.for_provider(OAuthProvider::Google))?;

        let status = response.status();
        if !status.is_success() {
            warn!(provider = "google", status = status.as_u16(), "Userinfo request rejected");
            return Err(AuthError::UserInfoFetchFailed(format!(
                "userinfo endpoint returned HTTP {}",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|err| HttpError::from(err).for_provider(OAuthProvider::Google))?;
        let info: GoogleUserInfo = serde_json::from_str(&body)
            .map_err(|err| AuthError::UserInfoFetchFailed(format!("unreadable userinfo: {err}")))?;
        if info.sub.is_empty() {
            return Err(AuthError::UserInfoFetchFailed("userinfo carried no subject".into()));
        }

        debug!(provider = "google", email_verified = info.email_verified, "Fetched user info");
        Ok(info.into())
    }
}

impl std::fmt::Debug for GoogleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleProvider").field("settings", &self.settings).finish_non_exhaustive()
    }
}
