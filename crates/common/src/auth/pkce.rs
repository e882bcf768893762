//! PKCE (Proof Key for Code Exchange) implementation for OAuth 2.0
//!
//! Implements RFC 7636 with the `S256` method. The verifier stays server-side
//! until the token exchange; only the challenge and `state` are sent to the
//! provider.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Random bytes in a code verifier (128 base64url characters, the RFC 7636
/// maximum).
pub const VERIFIER_BYTES: usize = 96;

/// Random bytes in a state token (43 base64url characters).
pub const STATE_BYTES: usize = 32;

/// The only challenge method Keygate issues.
pub const CHALLENGE_METHOD: &str = "S256";

fn random_token(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a cryptographically secure code verifier
///
/// 96 random bytes, base64url without padding: always 128 characters.
pub fn generate_code_verifier() -> String {
    random_token(VERIFIER_BYTES)
}

/// Code challenge for a verifier: `BASE64URL(SHA256(ASCII(code_verifier)))`
pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Generate a random state token for CSRF protection
pub fn generate_state() -> String {
    random_token(STATE_BYTES)
}

/// Compare an expected and a received state in constant time.
pub fn validate_state(expected: &str, actual: &str) -> bool {
    expected.len() == actual.len()
        && expected.bytes().zip(actual.bytes()).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

/// PKCE material for one authorization attempt
///
/// The `code_verifier` is a secret; it is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PKCEChallenge {
    /// Random string (128 chars, base64url encoded)
    pub code_verifier: String,

    /// SHA256 hash of code_verifier (base64url encoded)
    pub code_challenge: String,

    /// Random CSRF protection token; also the registry key
    pub state: String,

    pub created_at: DateTime<Utc>,
}

impl PKCEChallenge {
    /// Generate a new PKCE challenge with fresh verifier and state
    ///
    /// # Examples
    /// ```
    /// use keygate_common::auth::pkce::{generate_code_challenge, PKCEChallenge};
    ///
    /// let challenge = PKCEChallenge::generate();
    /// assert_eq!(challenge.code_verifier.len(), 128);
    /// assert_eq!(challenge.code_challenge, generate_code_challenge(&challenge.code_verifier));
    /// ```
    pub fn generate() -> Self {
        Self::with_state(generate_state())
    }

    /// Generate a verifier/challenge pair bound to an existing state
    pub fn with_state(state: String) -> Self {
        let code_verifier = generate_code_verifier();
        let code_challenge = generate_code_challenge(&code_verifier);

        Self { code_verifier, code_challenge, state, created_at: Utc::now() }
    }

    /// Get the challenge method (always "S256" for SHA256)
    #[must_use]
    pub fn challenge_method(&self) -> &'static str {
        CHALLENGE_METHOD
    }

    /// Whether `verifier` hashes to this challenge.
    pub fn verifies(&self, verifier: &str) -> bool {
        validate_state(&self.code_challenge, &generate_code_challenge(verifier))
    }
}

impl std::fmt::Debug for PKCEChallenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PKCEChallenge")
            .field("code_verifier", &"[REDACTED]")
            .field("code_challenge", &self.code_challenge)
            .field("state", &self.state)
            .field("created_at", &self.created_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::pkce.
    use std::collections::HashSet;

    use super::*;

    fn is_base64url(value: &str) -> bool {
        value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    /// Validates the RFC 7636 Appendix B test vector.
    ///
    /// Assertions:
    /// - Ensures the known verifier hashes to the published challenge.
    #[test]
    fn test_rfc7636_vector() {
        assert_eq!(
            generate_code_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    /// Validates `PKCEChallenge::generate` output shape.
    ///
    /// Assertions:
    /// - Verifier is exactly 128 URL-safe characters.
    /// - State is 43 URL-safe characters.
    /// - Challenge matches the verifier.
    #[test]
    fn test_generate_pkce_challenge() {
        let challenge = PKCEChallenge::generate();

        assert_eq!(challenge.code_verifier.len(), 128);
        assert!(is_base64url(&challenge.code_verifier));
        assert_eq!(challenge.state.len(), 43);
        assert!(is_base64url(&challenge.state));
        assert_eq!(challenge.code_challenge.len(), 43);
        assert!(challenge.verifies(&challenge.code_verifier));
        assert_eq!(challenge.challenge_method(), "S256");
    }

    #[test]
    fn test_values_are_unique() {
        let states: HashSet<String> = (0..100).map(|_| generate_state()).collect();
        assert_eq!(states.len(), 100);

        let verifiers: HashSet<String> = (0..100).map(|_| generate_code_verifier()).collect();
        assert_eq!(verifiers.len(), 100);
    }

    #[test]
    fn test_with_state_keeps_state() {
        let challenge = PKCEChallenge::with_state("fixed".to_string());
        assert_eq!(challenge.state, "fixed");
        assert!(!challenge.verifies("not-the-verifier"));
    }

    #[test]
    fn test_validate_state() {
        assert!(validate_state("abc", "abc"));
        assert!(!validate_state("abc", "abd"));
        assert!(!validate_state("abc", "abcd"));
        assert!(!validate_state("abc", ""));
    }

    #[test]
    fn test_debug_redacts_verifier() {
        let challenge = PKCEChallenge::generate();
        let debug = format!("{challenge:?}");
        assert!(!debug.contains(&challenge.code_verifier));
        assert!(debug.contains("[REDACTED]"));
    }
}
