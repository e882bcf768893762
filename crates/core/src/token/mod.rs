//! Bearer tokens
//!
//! RS256 JWT access/refresh pairs with single-use refresh rotation and a
//! revocation list keyed by token id (`jti`).
//!
//! ```text
//! TokenService ──► SigningKeys      (private + public key)
//!      │
//!      └──► TokenVerifier ──► RevocationStore
//! ```

pub mod claims;
pub mod keys;
pub mod revocation;
pub mod service;
pub mod verifier;

pub use claims::JwtClaims;
pub use keys::{PublicJwk, SigningKeys};
pub use revocation::{InMemoryRevocationStore, RevocationStore};
pub use service::TokenService;
pub use verifier::TokenVerifier;
