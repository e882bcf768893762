//! Service wiring
//!
//! Builds the in-memory stores, the token service, the OAuth orchestrator
//! with HTTP provider adapters, and the sign-in facade from one
//! [`KeygateConfig`].

use std::sync::Arc;

use keygate_core::{
    InMemoryRevocationStore, InMemoryStateStore, OAuthOrchestrator, RevocationStore,
    SignInService, StateStore, TokenService, UserLinker,
};
use keygate_domain::{KeygateConfig, Result};
use tracing::info;

use crate::http::HttpClient;
use crate::providers::build_providers;

/// Fully wired Keygate services sharing one set of stores
pub struct Keygate {
    sign_in: Arc<SignInService>,
    state_store: Arc<InMemoryStateStore>,
    revocations: Arc<InMemoryRevocationStore>,
}

impl Keygate {
    /// Validate `config` and build every service.
    ///
    /// Must be called inside a Tokio runtime so the stores can start their
    /// sweepers.
    ///
    /// # Errors
    /// `AuthError::Config` for an invalid configuration, unusable key material
    /// or an HTTP client that cannot be built.
    pub fn from_config(config: &KeygateConfig, linker: Arc<dyn UserLinker>) -> Result<Self> {
        let http = HttpClient::builder().timeout(config.oauth.request_timeout()).build()?;
        Self::with_http(config, linker, http)
    }

    /// As [`Keygate::from_config`] with a caller-supplied HTTP client.
    pub fn with_http(
        config: &KeygateConfig,
        linker: Arc<dyn UserLinker>,
        http: HttpClient,
    ) -> Result<Self> {
        config.validate()?;

        let revocations = Arc::new(InMemoryRevocationStore::new());
        let tokens = Arc::new(TokenService::new(&config.token, revocations.clone())?);

        let state_store = Arc::new(InMemoryStateStore::with_ttl(config.oauth.state_ttl()));
        let oauth = OAuthOrchestrator::new(config.oauth.clone(), state_store.clone(), linker)
            .with_providers(build_providers(&config.oauth, http));

        info!(
            providers = ?oauth.enabled_providers(),
            issuer = %config.token.issuer,
            "Keygate services ready"
        );

        let sign_in = Arc::new(SignInService::new(Arc::new(oauth), tokens));
        Ok(Self { sign_in, state_store, revocations })
    }

    pub fn sign_in(&self) -> Arc<SignInService> {
        Arc::clone(&self.sign_in)
    }

    /// Stop the background sweepers. Stored state keeps its expiry
    /// semantics.
    pub fn shutdown(&self) {
        self.state_store.close();
        self.revocations.close();
        info!("Keygate services stopped");
    }
}

impl std::fmt::Debug for Keygate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keygate")
            .field("providers", &self.sign_in.oauth().enabled_providers())
            .field("pending_authorizations", &self.state_store.len())
            .field("revoked_tokens", &self.revocations.len())
            .finish()
    }
}
