//! Sign-in facade
//!
//! Composes the OAuth orchestrator and the token service into the four calls
//! an HTTP layer needs: begin, complete, refresh and logout.

use std::sync::Arc;

use keygate_domain::{OAuthProvider, OAuthUserInfo, Result, TokenClaims, TokenPair};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::oauth::OAuthOrchestrator;
use crate::token::TokenService;

/// Outcome of a completed federated sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInResult {
    pub user_id: String,
    pub is_new_user: bool,
    pub user_info: OAuthUserInfo,
    pub tokens: TokenPair,
}

/// Federated sign-in and session lifecycle
pub struct SignInService {
    oauth: Arc<OAuthOrchestrator>,
    tokens: Arc<TokenService>,
}

impl SignInService {
    pub fn new(oauth: Arc<OAuthOrchestrator>, tokens: Arc<TokenService>) -> Self {
        Self { oauth, tokens }
    }

    /// Start a sign-in; returns `(authorization_url, state)`.
    pub async fn begin(&self, provider: OAuthProvider, use_pkce: bool) -> Result<(String, String)> {
        self.oauth.generate_auth_url(provider, use_pkce).await
    }

    /// Finish a sign-in from the provider callback and issue a token pair.
    pub async fn complete(
        &self,
        provider: OAuthProvider,
        code: &str,
        state: &str,
        cancel: &CancellationToken,
    ) -> Result<SignInResult> {
        let user_info = self.oauth.handle_callback(provider, code, state, cancel).await?;
        let link = self.oauth.link_or_create_user(&user_info).await?;
        let tokens = self.tokens.generate_token_pair(&link.user_id, &user_info.email)?;

        info!(provider = %provider, user_id = %link.user_id, is_new_user = link.is_new_user, "Sign-in completed");
        Ok(SignInResult { user_id: link.user_id, is_new_user: link.is_new_user, user_info, tokens })
    }

    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        self.tokens.refresh_tokens(refresh_token)
    }

    /// Revoke both tokens of a session.
    pub fn logout(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        self.tokens.revoke_pair(access_token, refresh_token)
    }

    /// Validate the bearer token of an incoming request.
    pub fn authenticate(&self, access_token: &str) -> Result<TokenClaims> {
        self.tokens.validate_access_token(access_token)
    }

    pub fn oauth(&self) -> &OAuthOrchestrator {
        &self.oauth
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }
}
