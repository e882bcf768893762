//! Identity provider adapters
//!
//! Implement `keygate_core::oauth::IdentityProvider` over HTTP:
//!
//! ```text
//! GoogleProvider ── POST token_url ──▶ access_token ── GET userinfo_url ──▶ OAuthUserInfo
//! AppleProvider  ── POST token_url ──▶ id_token ── verify (JwksCache) ──▶ OAuthUserInfo
//! ```
//!
//! Error mapping is the same for both:
//! - transport failure → `ProviderUnavailable`
//! - non-2xx from the token endpoint → `InvalidCode`
//! - userinfo failure → `UserInfoFetchFailed`
//! - bad Apple ID token → `InvalidProviderToken`

pub mod apple;
pub mod google;
pub mod jwks;

use std::sync::Arc;

use keygate_core::IdentityProvider;
use keygate_domain::{AuthError, OAuthConfig, OAuthProvider, ProviderConfig, ProviderTokens, Result};
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};
use url::Url;

pub use apple::AppleProvider;
pub use google::GoogleProvider;
pub use jwks::JwksCache;

use crate::errors::{HttpError, InfraError};
use crate::http::HttpClient;

/// Adapters for every provider that has a configuration section.
pub fn build_providers(config: &OAuthConfig, http: HttpClient) -> Vec<Arc<dyn IdentityProvider>> {
    let mut providers: Vec<Arc<dyn IdentityProvider>> = Vec::new();

    if let Some(google) = &config.google {
        providers.push(Arc::new(GoogleProvider::new(google.clone(), http.clone())));
    }
    if let Some(apple) = &config.apple {
        providers.push(Arc::new(AppleProvider::new(apple.clone(), http)));
    }

    debug!(count = providers.len(), "Identity providers built");
    providers
}

/// Error body of an RFC 6749 token endpoint
#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Authorization-code grant against `settings.token_url`.
pub(crate) async fn exchange_authorization_code(
    http: &HttpClient,
    provider: OAuthProvider,
    settings: &ProviderConfig,
    code: &str,
    code_verifier: Option<&str>,
) -> Result<ProviderTokens> {
    let mut form: Vec<(&str, &str)> = vec![
        ("grant_type", "authorization_code"),
        ("code", code),
        ("client_id", settings.client_id.as_str()),
        ("redirect_uri", settings.redirect_url.as_str()),
    ];
    if let Some(secret) = settings.client_secret.as_deref() {
        form.push(("client_secret", secret));
    }
    if let Some(verifier) = code_verifier {
        form.push(("code_verifier", verifier));
    }

    let token_url = Url::parse(&settings.token_url).map_err(InfraError::from)?;
    let response = http
        .send(http.post(token_url).form(&form))
        .await
        .map_err(|err| err.for_provider(provider))?;

    let status = response.status();
    let body =
        response.text().await.map_err(|err| HttpError::from(err).for_provider(provider))?;

    if !status.is_success() {
        let reason = match serde_json::from_str::<TokenErrorBody>(&body) {
            Ok(TokenErrorBody { error, error_description: Some(description) }) => {
                format!("{error}: {description}")
            }
            Ok(TokenErrorBody { error, error_description: None }) => error,
            Err(_) => format!("token endpoint returned HTTP {}", status.as_u16()),
        };
        warn!(provider = %provider, status = status.as_u16(), reason = %reason, "Code exchange rejected");
        return Err(AuthError::InvalidCode(reason));
    }

    let tokens: ProviderTokens = serde_json::from_str(&body).map_err(|err| {
        AuthError::InvalidCode(format!("unreadable token response: {err}"))
    })?;
    if tokens.access_token.is_empty() {
        return Err(AuthError::InvalidCode("token response carried no access_token".into()));
    }

    debug!(provider = %provider, has_id_token = tokens.id_token.is_some(), "Code exchanged");
    Ok(tokens)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolOrString {
    Bool(bool),
    String(String),
}

/// Accepts `true`, `"true"` and their false counterparts; absent or `null`
/// reads as `false`.
pub(crate) fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<BoolOrString>::deserialize(deserializer)? {
        Some(BoolOrString::Bool(value)) => value,
        Some(BoolOrString::String(value)) => value.trim().eq_ignore_ascii_case("true"),
        None => false,
    })
}
