//! Port interfaces for the OAuth flow
//!
//! These traits define the boundaries between the orchestrator and the
//! infrastructure that stores pending authorizations, talks to identity
//! providers and owns user accounts.

use std::time::Duration;

use async_trait::async_trait;
use keygate_domain::{OAuthProvider, OAuthUserInfo, ProviderTokens, Result};

use super::PendingAuthorization;

/// Registry of in-flight authorization attempts keyed by `state`
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Store a pending authorization for `ttl`.
    async fn store_pkce_challenge(&self, pending: PendingAuthorization, ttl: Duration)
        -> Result<()>;

    /// Look up a pending authorization without consuming it.
    async fn get_pkce_challenge(&self, state: &str) -> Result<Option<PendingAuthorization>>;

    async fn delete_pkce_challenge(&self, state: &str) -> Result<()>;

    /// Consume a pending authorization.
    ///
    /// Returns the entry if it was live. An expired entry is removed too and
    /// reported as `None`. The default is get-then-delete, which is not
    /// atomic; implementations that can should override it so concurrent
    /// callers cannot both observe the same entry.
    async fn take_pkce_challenge(&self, state: &str) -> Result<Option<PendingAuthorization>> {
        let pending = self.get_pkce_challenge(state).await?;
        self.delete_pkce_challenge(state).await?;
        Ok(pending)
    }

    /// Pending attempts currently held (diagnostic)
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Account storage owned by the host application
#[async_trait]
pub trait UserLinker: Send + Sync {
    /// Local user id for `email`, if an account exists.
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<String>>;

    /// Attach a federated identity to an existing account.
    async fn link_oauth_account(&self, user_id: &str, user_info: &OAuthUserInfo)
        -> anyhow::Result<()>;

    /// Create an account from a federated identity; returns the new user id.
    async fn create_user_from_oauth(&self, user_info: &OAuthUserInfo) -> anyhow::Result<String>;
}

/// One identity provider's token and user-info endpoints
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn provider(&self) -> OAuthProvider;

    /// Exchange an authorization code (plus PKCE verifier, when one was
    /// issued) for provider tokens.
    async fn exchange_code(&self, code: &str, code_verifier: Option<&str>)
        -> Result<ProviderTokens>;

    /// Resolve normalised user information from the exchanged tokens.
    async fn fetch_user_info(&self, tokens: &ProviderTokens) -> Result<OAuthUserInfo>;
}
