//! Shared test helpers for `keygate-core` integration tests.
//!
//! Lightweight mocks for the OAuth ports plus fixture key material, so the
//! flow tests can focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod linker;
pub mod providers;

use std::sync::Arc;

use keygate_core::{InMemoryRevocationStore, TokenService};
use keygate_domain::{AppleConfig, OAuthConfig, ProviderConfig, TokenConfig};

pub const SIGNING_KEY_PEM: &str = include_str!("../fixtures/signing_key.pem");

pub fn token_config() -> TokenConfig {
    TokenConfig { private_key_pem: Some(SIGNING_KEY_PEM.to_string()), ..TokenConfig::default() }
}

pub fn token_service() -> Arc<TokenService> {
    Arc::new(
        TokenService::new(&token_config(), Arc::new(InMemoryRevocationStore::new()))
            .expect("fixture key loads"),
    )
}

/// Both providers configured with test client registrations.
pub fn oauth_config() -> OAuthConfig {
    OAuthConfig {
        google: Some(ProviderConfig::google(
            "google-client-id",
            "google-secret",
            "https://app.test/auth/google/callback",
        )),
        apple: Some(AppleConfig::new(ProviderConfig::apple(
            "com.example.keygate",
            "apple-client-secret",
            "https://app.test/auth/apple/callback",
        ))),
        ..OAuthConfig::default()
    }
}
