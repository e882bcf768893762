//! Shared fixtures for the provider integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use keygate_core::{SigningKeys, UserLinker};
use keygate_domain::constants::APPLE_ISSUER;
use keygate_domain::{AppleConfig, OAuthUserInfo, ProviderConfig};
use serde_json::{json, Value};
use wiremock::MockServer;

pub const SIGNING_KEY_PEM: &str = include_str!("../fixtures/signing_key.pem");
pub const OTHER_KEY_PEM: &str = include_str!("../fixtures/other_key.pem");

pub const APPLE_CLIENT_ID: &str = "com.example.keygate";
pub const APPLE_KID: &str = "apple-test-kid";

pub fn google_config(server: &MockServer) -> ProviderConfig {
    let uri = server.uri();
    ProviderConfig {
        client_id: "google-client".into(),
        client_secret: Some("google-secret".into()),
        redirect_url: "https://app.test/cb/google".into(),
        scopes: vec!["openid".into(), "email".into()],
        authorize_url: format!("{uri}/o/oauth2/v2/auth"),
        token_url: format!("{uri}/token"),
        userinfo_url: Some(format!("{uri}/v1/userinfo")),
    }
}

pub fn apple_config(server: &MockServer) -> AppleConfig {
    let uri = server.uri();
    let mut apple = AppleConfig::new(ProviderConfig {
        client_id: APPLE_CLIENT_ID.into(),
        client_secret: Some("apple-client-secret-jwt".into()),
        redirect_url: "https://app.test/cb/apple".into(),
        scopes: vec!["name".into(), "email".into()],
        authorize_url: format!("{uri}/auth/authorize"),
        token_url: format!("{uri}/auth/token"),
        userinfo_url: None,
    });
    apple.jwks_url = format!("{uri}/auth/keys");
    apple
}

/// JWKS document publishing the fixture key under [`APPLE_KID`].
pub fn jwks_body() -> Value {
    let keys = SigningKeys::from_private_pem(SIGNING_KEY_PEM, None, APPLE_KID).expect("fixture key");
    json!({ "keys": [keys.public_jwk()] })
}

pub fn now_secs() -> i64 {
    let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).expect("clock after epoch");
    i64::try_from(elapsed.as_secs()).expect("seconds fit in i64")
}

/// Claims of a fresh Apple ID token for `sub`.
pub fn apple_claims(sub: &str, email: &str) -> Value {
    let now = now_secs();
    json!({
        "iss": APPLE_ISSUER,
        "aud": APPLE_CLIENT_ID,
        "sub": sub,
        "email": email,
        "email_verified": "true",
        "is_private_email": "false",
        "iat": now,
        "exp": now + 600,
    })
}

/// Sign `claims` as Apple would, with `key_pem` under `kid`.
pub fn sign_id_token(key_pem: &str, kid: &str, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(key_pem.as_bytes()).expect("fixture key");
    encode(&header, claims, &key).expect("id token signs")
}

/// Users keyed by email; created ids are `user-<n>`.
#[derive(Default)]
pub struct MemoryLinker {
    users: Mutex<HashMap<String, String>>,
}

impl MemoryLinker {
    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserLinker for MemoryLinker {
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<String>> {
        Ok(self.users.lock().unwrap().get(email).cloned())
    }

    async fn link_oauth_account(&self, _: &str, _: &OAuthUserInfo) -> anyhow::Result<()> {
        Ok(())
    }

    async fn create_user_from_oauth(&self, user_info: &OAuthUserInfo) -> anyhow::Result<String> {
        let mut users = self.users.lock().unwrap();
        let user_id = format!("user-{}", users.len() + 1);
        users.insert(user_info.email.clone(), user_id.clone());
        Ok(user_id)
    }
}
