//! Token revocation list
//!
//! A revoked token id stays listed until the token would have expired
//! anyway; after that the signature check alone rejects it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use keygate_common::cache::{ExpiringStore, ExpiringStoreConfig};
use keygate_domain::constants::DEFAULT_ACCESS_TOKEN_TTL_SECS;

/// Storage for revoked token ids
pub trait RevocationStore: Send + Sync {
    /// Revoke `token_id` until `expires_at`. Re-revoking overwrites.
    fn revoke(&self, token_id: &str, expires_at: DateTime<Utc>);

    /// Revoke only if not already revoked; `true` when this call revoked.
    fn revoke_if_absent(&self, token_id: &str, expires_at: DateTime<Utc>) -> bool;

    fn is_revoked(&self, token_id: &str) -> bool;

    /// Entries held, including expired ones not yet swept.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local revocation list backed by an [`ExpiringStore`].
#[derive(Debug)]
pub struct InMemoryRevocationStore {
    entries: ExpiringStore<String, DateTime<Utc>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::with_config(
            ExpiringStoreConfig::named("revocations")
                .with_default_ttl(Duration::from_secs(DEFAULT_ACCESS_TOKEN_TTL_SECS)),
        )
    }

    pub fn with_config(config: ExpiringStoreConfig) -> Self {
        Self { entries: ExpiringStore::new(config) }
    }

    /// Stop the background sweep.
    pub fn close(&self) {
        self.entries.close();
    }

    pub fn purge_expired(&self) -> usize {
        self.entries.purge_expired()
    }
}

impl Default for InMemoryRevocationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RevocationStore for InMemoryRevocationStore {
    fn revoke(&self, token_id: &str, expires_at: DateTime<Utc>) {
        self.entries.put(token_id.to_string(), expires_at, expires_at);
    }

    fn revoke_if_absent(&self, token_id: &str, expires_at: DateTime<Utc>) -> bool {
        self.entries.insert_if_absent(token_id.to_string(), expires_at, expires_at)
    }

    fn is_revoked(&self, token_id: &str) -> bool {
        self.entries.contains(&token_id.to_string())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
