//! Federated sign-in via OAuth 2.0 authorization code + PKCE
//!
//! ```text
//! ┌──────────────────┐
//! │ OAuthOrchestrator│  URL generation, callback handling, account linking
//! └────────┬─────────┘
//!          ├──► StateStore        (pending attempts keyed by state)
//!          ├──► IdentityProvider  (per-provider token + userinfo calls)
//!          └──► UserLinker        (host application's accounts)
//! ```

pub mod pending;
pub mod ports;
pub mod service;
pub mod state_store;

pub use pending::PendingAuthorization;
pub use ports::{IdentityProvider, StateStore, UserLinker};
pub use service::OAuthOrchestrator;
pub use state_store::InMemoryStateStore;
