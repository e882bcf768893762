use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use keygate_core::IdentityProvider;
use keygate_domain::{AuthError, OAuthProvider, OAuthUserInfo, ProviderTokens, Result};

/// Scripted `IdentityProvider`.
///
/// Records every exchange (code and verifier) and can be told to fail, or to
/// stall long enough to trip timeouts and cancellation.
pub struct MockIdentityProvider {
    provider: OAuthProvider,
    user_info: OAuthUserInfo,
    exchange_error: Option<AuthError>,
    delay: Option<Duration>,
    exchanges: AtomicUsize,
    verifiers: Mutex<Vec<Option<String>>>,
}

impl MockIdentityProvider {
    pub fn new(provider: OAuthProvider) -> Self {
        Self {
            provider,
            user_info: OAuthUserInfo {
                provider_user_id: format!("{provider}-sub-1"),
                email: "person@example.com".to_string(),
                email_verified: true,
                name: Some("Test Person".to_string()),
                locale: Some("en".to_string()),
                provider,
            },
            exchange_error: None,
            delay: None,
            exchanges: AtomicUsize::new(0),
            verifiers: Mutex::new(Vec::new()),
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.user_info.email = email.to_string();
        self
    }

    pub fn rejecting_code(mut self) -> Self {
        self.exchange_error = Some(AuthError::InvalidCode("invalid_grant".to_string()));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }

    pub fn verifiers(&self) -> Vec<Option<String>> {
        self.verifiers.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    fn provider(&self) -> OAuthProvider {
        self.provider
    }

    async fn exchange_code(&self, code: &str, code_verifier: Option<&str>) -> Result<ProviderTokens> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        self.verifiers.lock().unwrap().push(code_verifier.map(str::to_string));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = &self.exchange_error {
            return Err(err.clone());
        }

        Ok(ProviderTokens {
            access_token: format!("access-for-{code}"),
            id_token: None,
            refresh_token: None,
            expires_in: Some(3600),
            token_type: Some("Bearer".to_string()),
        })
    }

    async fn fetch_user_info(&self, tokens: &ProviderTokens) -> Result<OAuthUserInfo> {
        if !tokens.access_token.starts_with("access-for-") {
            return Err(AuthError::UserInfoFetchFailed("unexpected access token".to_string()));
        }
        Ok(self.user_info.clone())
    }
}
