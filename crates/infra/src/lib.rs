//! # Keygate Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Google and Apple identity provider adapters (code exchange, userinfo,
//!   Apple ID token verification against a cached JWKS)
//! - HTTP client implementation
//! - Configuration loading (environment, `.env`, TOML/JSON files)
//! - Tracing subscriber setup
//! - Service wiring from a single configuration ([`Keygate`])
//!
//! ## Architecture
//! - Implements traits defined in `keygate-core`
//! - Depends on `keygate-domain` and `keygate-core`
//! - Contains all "impure" code (network, filesystem, global subscriber)

pub mod bootstrap;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod providers;

// Re-export commonly used items
pub use bootstrap::Keygate;
pub use errors::{HttpError, InfraError};
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::init_tracing;
pub use providers::{build_providers, AppleProvider, GoogleProvider, JwksCache};
