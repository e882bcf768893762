//! Pending authorization attempts

use chrono::{DateTime, Utc};
use keygate_common::auth::PKCEChallenge;
use keygate_domain::OAuthProvider;
use serde::{Deserialize, Serialize};

/// What the state registry holds between the authorization redirect and the
/// callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAuthorization {
    /// Provider the state was issued for; a callback for any other provider
    /// is rejected.
    pub provider: OAuthProvider,
    pub state: String,
    pub pkce: Option<PKCEChallenge>,
    pub created_at: DateTime<Utc>,
}

impl PendingAuthorization {
    pub fn new(provider: OAuthProvider, state: String, pkce: Option<PKCEChallenge>) -> Self {
        Self { provider, state, pkce, created_at: Utc::now() }
    }

    /// Verifier to send with the code exchange, if PKCE was used.
    pub fn code_verifier(&self) -> Option<&str> {
        self.pkce.as_ref().map(|pkce| pkce.code_verifier.as_str())
    }
}
