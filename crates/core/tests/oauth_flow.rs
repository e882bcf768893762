//! Integration tests for the OAuth orchestrator
//!
//! Drives full authorization attempts against mock providers and a mock
//! account store.

mod support;

use std::sync::Arc;
use std::time::Duration;

use keygate_core::{InMemoryStateStore, OAuthOrchestrator};
use keygate_domain::{AuthError, OAuthConfig, OAuthProvider, OAuthUserInfo};
use support::linker::MockUserLinker;
use support::providers::MockIdentityProvider;
use tokio_util::sync::CancellationToken;

fn orchestrator_with(
    config: OAuthConfig,
    google: Arc<MockIdentityProvider>,
    linker: Arc<MockUserLinker>,
) -> OAuthOrchestrator {
    OAuthOrchestrator::new(config, Arc::new(InMemoryStateStore::new()), linker)
        .with_provider(google)
        .with_provider(Arc::new(MockIdentityProvider::new(OAuthProvider::Apple)))
}

/// Verifies a complete PKCE attempt end to end.
///
/// # Test Steps
/// 1. Generate a Google authorization URL with PKCE
/// 2. Handle the callback with the returned state
/// 3. Verify the provider received the stored verifier and the user info
///    came back tagged with the provider
/// 4. Verify the state cannot be replayed
#[tokio::test]
async fn test_pkce_flow_passes_verifier_and_consumes_state() {
    let google = Arc::new(MockIdentityProvider::new(OAuthProvider::Google));
    let orchestrator =
        orchestrator_with(support::oauth_config(), Arc::clone(&google), Arc::default());
    let cancel = CancellationToken::new();

    let (_url, state) =
        orchestrator.generate_auth_url(OAuthProvider::Google, true).await.expect("auth url");
    assert_eq!(orchestrator.pending_count(), 1);

    let info = orchestrator
        .handle_callback(OAuthProvider::Google, "auth-code", &state, &cancel)
        .await
        .expect("callback succeeds");
    assert_eq!(info.provider, OAuthProvider::Google);
    assert_eq!(info.email, "person@example.com");

    let verifiers = google.verifiers();
    assert_eq!(verifiers.len(), 1);
    assert_eq!(verifiers[0].as_ref().map(String::len), Some(128));

    let replay = orchestrator.handle_callback(OAuthProvider::Google, "auth-code", &state, &cancel).await;
    assert_eq!(replay, Err(AuthError::InvalidState));
    assert_eq!(google.exchange_count(), 1, "replay must not reach the provider");
    assert_eq!(orchestrator.pending_count(), 0);
}

/// Without PKCE no verifier is sent but the state is still enforced.
#[tokio::test]
async fn test_flow_without_pkce_sends_no_verifier() {
    let google = Arc::new(MockIdentityProvider::new(OAuthProvider::Google));
    let orchestrator =
        orchestrator_with(support::oauth_config(), Arc::clone(&google), Arc::default());

    let (_, state) = orchestrator.generate_auth_url(OAuthProvider::Google, false).await.expect("url");
    orchestrator
        .handle_callback(OAuthProvider::Google, "code", &state, &CancellationToken::new())
        .await
        .expect("callback");

    assert_eq!(google.verifiers(), vec![None]);
}

/// Validates the one-time-use guarantee under concurrency.
///
/// # Test Steps
/// 1. Issue one state
/// 2. Fire 16 concurrent callbacks with it
/// 3. Verify exactly one succeeds, the rest get `InvalidState`, and the
///    provider saw exactly one exchange
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callbacks_single_winner() {
    let google = Arc::new(MockIdentityProvider::new(OAuthProvider::Google));
    let orchestrator = Arc::new(orchestrator_with(
        support::oauth_config(),
        Arc::clone(&google),
        Arc::default(),
    ));
    let (_, state) = orchestrator.generate_auth_url(OAuthProvider::Google, true).await.expect("url");

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let orchestrator = Arc::clone(&orchestrator);
            let state = state.clone();
            tokio::spawn(async move {
                orchestrator
                    .handle_callback(OAuthProvider::Google, "code", &state, &CancellationToken::new())
                    .await
            })
        })
        .collect();

    let results = futures::future::join_all(tasks).await;
    let results: Vec<_> = results.into_iter().map(|r| r.expect("task panicked")).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| *e == AuthError::InvalidState));
    assert_eq!(google.exchange_count(), 1);
}

/// A failed code exchange still consumes the state.
#[tokio::test]
async fn test_rejected_code_consumes_state() {
    let google = Arc::new(MockIdentityProvider::new(OAuthProvider::Google).rejecting_code());
    let orchestrator =
        orchestrator_with(support::oauth_config(), Arc::clone(&google), Arc::default());
    let cancel = CancellationToken::new();

    let (_, state) = orchestrator.generate_auth_url(OAuthProvider::Google, true).await.expect("url");
    let first = orchestrator.handle_callback(OAuthProvider::Google, "bad", &state, &cancel).await;
    assert!(matches!(first, Err(AuthError::InvalidCode(_))));

    let retry = orchestrator.handle_callback(OAuthProvider::Google, "bad", &state, &cancel).await;
    assert_eq!(retry, Err(AuthError::InvalidState));
}

/// Cancellation aborts a stalled provider call.
#[tokio::test]
async fn test_cancellation_aborts_exchange() {
    let google = Arc::new(
        MockIdentityProvider::new(OAuthProvider::Google).with_delay(Duration::from_secs(30)),
    );
    let orchestrator =
        orchestrator_with(support::oauth_config(), Arc::clone(&google), Arc::default());
    let (_, state) = orchestrator.generate_auth_url(OAuthProvider::Google, true).await.expect("url");

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let result = orchestrator.handle_callback(OAuthProvider::Google, "code", &state, &cancel).await;
    assert_eq!(result, Err(AuthError::Cancelled));
    assert_eq!(orchestrator.pending_count(), 0);
}

/// A provider slower than the request timeout is reported unavailable.
#[tokio::test]
async fn test_timeout_maps_to_provider_unavailable() {
    let google = Arc::new(
        MockIdentityProvider::new(OAuthProvider::Google).with_delay(Duration::from_secs(30)),
    );
    let config = OAuthConfig { request_timeout_secs: 1, ..support::oauth_config() };
    let orchestrator = orchestrator_with(config, Arc::clone(&google), Arc::default());
    let (_, state) = orchestrator.generate_auth_url(OAuthProvider::Google, true).await.expect("url");

    let result = orchestrator
        .handle_callback(OAuthProvider::Google, "code", &state, &CancellationToken::new())
        .await;
    assert!(matches!(
        result,
        Err(AuthError::ProviderUnavailable { ref provider, .. }) if provider == "google"
    ));
}

/// An expired state is indistinguishable from a forged one.
#[tokio::test]
async fn test_expired_state_is_invalid() {
    let google = Arc::new(MockIdentityProvider::new(OAuthProvider::Google));
    let config = OAuthConfig { state_ttl_secs: 1, ..support::oauth_config() };
    let orchestrator = orchestrator_with(config, Arc::clone(&google), Arc::default());

    let (_, state) = orchestrator.generate_auth_url(OAuthProvider::Google, true).await.expect("url");
    tokio::time::sleep(Duration::from_millis(1100)).await;

    let result = orchestrator
        .handle_callback(OAuthProvider::Google, "code", &state, &CancellationToken::new())
        .await;
    assert_eq!(result, Err(AuthError::InvalidState));
    assert_eq!(google.exchange_count(), 0);
}

fn user_info(email: &str) -> OAuthUserInfo {
    OAuthUserInfo {
        provider_user_id: "google-sub-7".into(),
        email: email.into(),
        email_verified: true,
        name: Some("Known Person".into()),
        locale: None,
        provider: OAuthProvider::Google,
    }
}

/// Account linking: existing email links, unknown email creates.
#[tokio::test]
async fn test_link_or_create_user() {
    let linker = Arc::new(MockUserLinker::default().with_user("known@example.com", "user-42"));
    let orchestrator = orchestrator_with(
        support::oauth_config(),
        Arc::new(MockIdentityProvider::new(OAuthProvider::Google)),
        Arc::clone(&linker),
    );

    let outcome =
        orchestrator.link_or_create_user(&user_info("known@example.com")).await.expect("link");
    assert_eq!(outcome.user_id, "user-42");
    assert!(!outcome.is_new_user);
    assert_eq!(linker.links().len(), 1);
    assert_eq!(linker.links()[0].0, "user-42");

    let created =
        orchestrator.link_or_create_user(&user_info("new@example.com")).await.expect("create");
    assert!(created.is_new_user);
    assert_ne!(created.user_id, "user-42");
    assert_eq!(linker.user_count(), 2);
    assert_eq!(linker.links().len(), 1, "creating must not link");
}

/// Collaborator failures surface as `AccountLinking`.
#[tokio::test]
async fn test_linker_failure() {
    let orchestrator = orchestrator_with(
        support::oauth_config(),
        Arc::new(MockIdentityProvider::new(OAuthProvider::Google)),
        Arc::new(MockUserLinker::failing()),
    );
    let err = orchestrator.link_or_create_user(&user_info("x@example.com")).await.expect_err("linker down");
    assert_eq!(err.kind(), "account_linking_failed");
}
