//! In-memory state registry

use std::time::Duration;

use async_trait::async_trait;
use keygate_common::cache::{expiry_after, ExpiringStore, ExpiringStoreConfig};
use keygate_domain::constants::DEFAULT_STATE_TTL_SECS;
use keygate_domain::Result;

use super::ports::StateStore;
use super::PendingAuthorization;

/// Process-local [`StateStore`] with an atomic `take`.
#[derive(Debug)]
pub struct InMemoryStateStore {
    entries: ExpiringStore<String, PendingAuthorization>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(DEFAULT_STATE_TTL_SECS))
    }

    /// `ttl` only sets the sweep cadence; each entry carries the TTL it was
    /// stored with.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::with_config(ExpiringStoreConfig::named("oauth-state").with_default_ttl(ttl))
    }

    pub fn with_config(config: ExpiringStoreConfig) -> Self {
        Self { entries: ExpiringStore::new(config) }
    }

    pub fn close(&self) {
        self.entries.close();
    }
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn store_pkce_challenge(
        &self,
        pending: PendingAuthorization,
        ttl: Duration,
    ) -> Result<()> {
        self.entries.put(pending.state.clone(), pending, expiry_after(ttl));
        Ok(())
    }

    async fn get_pkce_challenge(&self, state: &str) -> Result<Option<PendingAuthorization>> {
        Ok(self.entries.get(&state.to_string()))
    }

    async fn delete_pkce_challenge(&self, state: &str) -> Result<()> {
        self.entries.delete(&state.to_string());
        Ok(())
    }

    async fn take_pkce_challenge(&self, state: &str) -> Result<Option<PendingAuthorization>> {
        Ok(self.entries.take(&state.to_string()))
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
