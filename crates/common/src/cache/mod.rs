//! Expiring key/value storage
//!
//! [`ExpiringStore`] is a thread-safe map where every entry carries an
//! absolute expiry instant. It backs the token revocation list and the
//! pending OAuth state registry.
//!
//! # Features
//!
//! - **Thread-safe**: `parking_lot::RwLock`, shared reads and exclusive writes
//! - **Exact expiry**: lookups ignore expired entries even before a sweep
//! - **Atomic consumption**: `take` and `insert_if_absent` for single-use
//!   values
//! - **Background sweep**: a tokio task bounded by a `CancellationToken`
//!
//! # Example
//! ```
//! use std::time::Duration;
//!
//! use keygate_common::cache::{ExpiringStore, ExpiringStoreConfig};
//!
//! let config = ExpiringStoreConfig::named("sessions").with_default_ttl(Duration::from_secs(600));
//! let store: ExpiringStore<String, String> = ExpiringStore::new(config);
//!
//! store.put_with_default_ttl("state".to_string(), "google".to_string());
//! assert!(store.contains(&"state".to_string()));
//! ```

pub mod config;
pub mod expiring;
pub mod stats;

pub use config::ExpiringStoreConfig;
pub use expiring::{expiry_after, ExpiringStore};
pub use stats::StoreStats;
