//! Reusable utilities shared across Keygate crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: PKCE and state generation (pure functions, no runtime)
//! - `runtime`: the expiring concurrent store and its background sweep
//!   (tokio, tracing)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod auth;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod cache;

#[cfg(feature = "foundation")]
pub use auth::PKCEChallenge;
#[cfg(feature = "runtime")]
pub use cache::{ExpiringStore, ExpiringStoreConfig, StoreStats};
