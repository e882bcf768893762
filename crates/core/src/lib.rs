//! # Keygate Core
//!
//! Authentication business logic - no HTTP or storage code.
//!
//! This crate contains:
//! - The token service (issue, verify, rotate, revoke)
//! - The OAuth orchestrator (authorization URLs, callbacks, account linking)
//! - The sign-in facade composing the two
//! - Port traits for state storage, revocation, identity providers and user
//!   accounts
//!
//! ## Architecture Principles
//! - Only depends on `keygate-common` and `keygate-domain`
//! - All external dependencies via traits
//! - Every service takes `&self` and is shared behind an `Arc`

pub mod oauth;
pub mod sign_in;
pub mod token;

pub use oauth::{
    IdentityProvider, InMemoryStateStore, OAuthOrchestrator, PendingAuthorization, StateStore,
    UserLinker,
};
pub use sign_in::{SignInResult, SignInService};
pub use token::{
    InMemoryRevocationStore, PublicJwk, RevocationStore, SigningKeys, TokenService, TokenVerifier,
};
