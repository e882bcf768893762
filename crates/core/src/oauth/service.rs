//! OAuth authorization-code flow orchestration
//!
//! Per attempt: `Initiated` (URL issued, pending entry stored) →
//! `AwaitingCallback` → `Linked | Created | Failed`. The pending entry is
//! consumed on the first callback that presents its `state`, whatever the
//! outcome of the provider exchange.

use std::collections::HashMap;
use std::sync::Arc;

use keygate_common::auth::pkce::{generate_state, validate_state, CHALLENGE_METHOD};
use keygate_common::auth::PKCEChallenge;
use keygate_domain::{
    AuthError, LinkOutcome, OAuthConfig, OAuthProvider, OAuthUserInfo, ProviderConfig, Result,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use super::ports::{IdentityProvider, StateStore, UserLinker};
use super::PendingAuthorization;

/// Runs the sign-in flow against the configured identity providers.
pub struct OAuthOrchestrator {
    config: OAuthConfig,
    state_store: Arc<dyn StateStore>,
    linker: Arc<dyn UserLinker>,
    providers: HashMap<OAuthProvider, Arc<dyn IdentityProvider>>,
}

impl OAuthOrchestrator {
    pub fn new(
        config: OAuthConfig,
        state_store: Arc<dyn StateStore>,
        linker: Arc<dyn UserLinker>,
    ) -> Self {
        Self { config, state_store, linker, providers: HashMap::new() }
    }

    /// Register the adapter for a provider, replacing any earlier one.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.providers.insert(provider.provider(), provider);
        self
    }

    #[must_use]
    pub fn with_providers(
        self,
        providers: impl IntoIterator<Item = Arc<dyn IdentityProvider>>,
    ) -> Self {
        providers.into_iter().fold(self, Self::with_provider)
    }

    /// Providers with both a configuration section and a registered adapter.
    pub fn enabled_providers(&self) -> Vec<OAuthProvider> {
        self.config
            .configured_providers()
            .into_iter()
            .filter(|provider| self.providers.contains_key(provider))
            .collect()
    }

    /// Build the provider's authorization URL and record the attempt.
    ///
    /// Returns `(url, state)`. The pending entry lives for
    /// `OAuthConfig::state_ttl`.
    pub async fn generate_auth_url(
        &self,
        provider: OAuthProvider,
        use_pkce: bool,
    ) -> Result<(String, String)> {
        let client = self.client_config(provider)?;

        let state = generate_state();
        let pkce = use_pkce.then(|| PKCEChallenge::with_state(state.clone()));
        let url = authorization_url(provider, client, &state, pkce.as_ref())?;

        let pending = PendingAuthorization::new(provider, state.clone(), pkce);
        self.state_store.store_pkce_challenge(pending, self.config.state_ttl()).await?;

        info!(provider = %provider, pkce = use_pkce, "Authorization URL generated");
        Ok((url, state))
    }

    /// Complete an attempt: consume `state`, exchange `code` and fetch the
    /// user's identity.
    ///
    /// The provider is never contacted for an unknown, expired, replayed or
    /// mismatched `state`. Network calls are bounded by
    /// `OAuthConfig::request_timeout` and abort when `cancel` fires.
    pub async fn handle_callback(
        &self,
        provider: OAuthProvider,
        code: &str,
        state: &str,
        cancel: &CancellationToken,
    ) -> Result<OAuthUserInfo> {
        self.client_config(provider)?;
        let adapter = self.adapter(provider)?;

        let pending = self.state_store.take_pkce_challenge(state).await?.ok_or_else(|| {
            debug!(provider = %provider, "Callback state unknown, expired or already used");
            AuthError::InvalidState
        })?;

        if pending.provider != provider || !validate_state(&pending.state, state) {
            warn!(
                provider = %provider,
                issued_for = %pending.provider,
                "Callback state was issued for a different provider"
            );
            return Err(AuthError::InvalidState);
        }

        if code.trim().is_empty() {
            return Err(AuthError::InvalidCode("authorization code is empty".into()));
        }

        let result = self.exchange(adapter.as_ref(), code, pending.code_verifier(), cancel).await;
        match &result {
            Ok(user_info) => {
                info!(provider = %provider, email_verified = user_info.email_verified, "OAuth callback completed");
            }
            Err(err) => {
                warn!(provider = %provider, kind = err.kind(), error = %err, "OAuth callback failed");
            }
        }
        result
    }

    async fn exchange(
        &self,
        adapter: &dyn IdentityProvider,
        code: &str,
        code_verifier: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<OAuthUserInfo> {
        let provider = adapter.provider();
        let timeout = self.config.request_timeout();

        let network = async {
            let tokens = adapter.exchange_code(code, code_verifier).await?;
            adapter.fetch_user_info(&tokens).await
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AuthError::Cancelled),
            outcome = tokio::time::timeout(timeout, network) => outcome.unwrap_or_else(|_| {
                Err(AuthError::provider_unavailable(
                    provider,
                    format!("no response within {}s", timeout.as_secs()),
                ))
            }),
        }
    }

    /// Attach `user_info` to the account with the same email, or create one.
    pub async fn link_or_create_user(&self, user_info: &OAuthUserInfo) -> Result<LinkOutcome> {
        if user_info.email.trim().is_empty() {
            return Err(AuthError::AccountLinking("provider returned no email address".into()));
        }

        let existing =
            self.linker.find_user_by_email(&user_info.email).await.map_err(linking_error)?;

        let outcome = match existing {
            Some(user_id) => {
                self.linker
                    .link_oauth_account(&user_id, user_info)
                    .await
                    .map_err(linking_error)?;
                LinkOutcome { user_id, is_new_user: false }
            }
            None => {
                let user_id =
                    self.linker.create_user_from_oauth(user_info).await.map_err(linking_error)?;
                LinkOutcome { user_id, is_new_user: true }
            }
        };

        info!(
            provider = %user_info.provider,
            user_id = %outcome.user_id,
            is_new_user = outcome.is_new_user,
            "Federated identity linked"
        );
        Ok(outcome)
    }

    /// Authorization attempts awaiting a callback (diagnostic).
    pub fn pending_count(&self) -> usize {
        self.state_store.len()
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    fn client_config(&self, provider: OAuthProvider) -> Result<&ProviderConfig> {
        self.config
            .provider(provider)
            .ok_or_else(|| AuthError::InvalidProvider(format!("{provider} is not configured")))
    }

    fn adapter(&self, provider: OAuthProvider) -> Result<&Arc<dyn IdentityProvider>> {
        self.providers
            .get(&provider)
            .ok_or_else(|| AuthError::InvalidProvider(format!("{provider} has no registered adapter")))
    }
}

impl std::fmt::Debug for OAuthOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthOrchestrator")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .field("state_ttl_secs", &self.config.state_ttl_secs)
            .finish_non_exhaustive()
    }
}

fn linking_error(err: anyhow::Error) -> AuthError {
    AuthError::AccountLinking(format!("{err:#}"))
}

fn authorization_url(
    provider: OAuthProvider,
    client: &ProviderConfig,
    state: &str,
    pkce: Option<&PKCEChallenge>,
) -> Result<String> {
    let scope = client.scope_string();
    let mut params: Vec<(&str, &str)> = vec![
        ("response_type", "code"),
        ("client_id", client.client_id.as_str()),
        ("redirect_uri", client.redirect_url.as_str()),
        ("scope", scope.as_str()),
        ("state", state),
    ];

    if let Some(pkce) = pkce {
        params.push(("code_challenge", pkce.code_challenge.as_str()));
        params.push(("code_challenge_method", CHALLENGE_METHOD));
    }

    match provider {
        OAuthProvider::Google => params.push(("access_type", "offline")),
        OAuthProvider::Apple => params.push(("response_mode", "form_post")),
    }

    Url::parse_with_params(&client.authorize_url, &params)
        .map(String::from)
        .map_err(|e| AuthError::Config(format!("invalid {provider} authorize_url: {e}")))
}
