//! OAuth 2.0 primitives
//!
//! - **PKCE**: RFC 7636 verifier/challenge generation (`S256` only)
//! - **State**: random CSRF tokens with constant-time comparison
//!
//! Provider-specific flows live in `keygate-core::oauth` and
//! `keygate-infra::providers`.

pub mod pkce;

pub use pkce::{
    generate_code_challenge, generate_code_verifier, generate_state, validate_state, PKCEChallenge,
};
