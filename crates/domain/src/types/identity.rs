//! Federated identity types

use serde::{Deserialize, Serialize};

use crate::impl_wire_name_conversions;

/// Supported third-party identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Apple,
}

impl_wire_name_conversions!(OAuthProvider, crate::AuthError::InvalidProvider {
    Google => "google",
    Apple => "apple",
});

impl OAuthProvider {
    /// All providers Keygate knows how to talk to.
    pub const ALL: [Self; 2] = [Self::Google, Self::Apple];
}

/// User information normalised across providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthUserInfo {
    /// Stable subject identifier at the provider (`sub`)
    pub provider_user_id: String,
    pub email: String,
    pub email_verified: bool,
    pub name: Option<String>,
    pub locale: Option<String>,
    pub provider: OAuthProvider,
}

/// Outcome of linking a federated identity to a local account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkOutcome {
    pub user_id: String,
    pub is_new_user: bool,
}

/// Raw token-endpoint response from an identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderTokens {
    pub access_token: String,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
}
