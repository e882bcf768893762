//! Expiring store configuration
//!
//! Controls the default entry lifetime and how often the background sweep
//! removes expired entries.

use std::time::Duration;

/// Sweep interval used when no TTL is configured.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Lower bound for an interval derived from the TTL.
pub const MIN_DERIVED_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Lower bound for an explicitly configured interval.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(10);

/// Configuration for [`ExpiringStore`](super::ExpiringStore)
#[derive(Debug, Clone)]
pub struct ExpiringStoreConfig {
    /// Name used in log fields
    pub name: String,

    /// Lifetime applied by `put_with_default_ttl` and used to derive the
    /// sweep interval (None = entries always carry an explicit expiry)
    pub default_ttl: Option<Duration>,

    /// Explicit sweep interval; overrides the TTL-derived one
    pub sweep_interval: Option<Duration>,
}

impl Default for ExpiringStoreConfig {
    fn default() -> Self {
        Self { name: "expiring-store".to_string(), default_ttl: None, sweep_interval: None }
    }
}

impl ExpiringStoreConfig {
    /// Create a configuration with the given store name
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Set the default entry lifetime
    #[must_use]
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Set an explicit sweep interval
    #[must_use]
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = Some(interval);
        self
    }

    /// Interval the background sweep actually runs at.
    ///
    /// An explicit interval wins (floored at [`MIN_SWEEP_INTERVAL`]).
    /// Otherwise half the default TTL, floored at
    /// [`MIN_DERIVED_SWEEP_INTERVAL`], or [`DEFAULT_SWEEP_INTERVAL`] when the
    /// TTL is unset or zero.
    pub fn effective_sweep_interval(&self) -> Duration {
        if let Some(interval) = self.sweep_interval {
            return interval.max(MIN_SWEEP_INTERVAL);
        }

        match self.default_ttl {
            Some(ttl) if !ttl.is_zero() => (ttl / 2).max(MIN_DERIVED_SWEEP_INTERVAL),
            _ => DEFAULT_SWEEP_INTERVAL,
        }
    }
}
