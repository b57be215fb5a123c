//! End-to-end tests of the 401 recovery protocol against a mock backend:
//! single-flight refresh, retry-once, forced logout, and error passthrough.

use std::sync::Arc;

use futures::future::join_all;
use mockito::{Matcher, Server, ServerGuard};
use remotematch::{ApiClient, ApiError, Config, MemoryTokenStore, StoredTokens, TokenStore};

fn client_with_tokens(
    server: &ServerGuard,
    access: &str,
    refresh: &str,
) -> (ApiClient, Arc<MemoryTokenStore>) {
    let store = Arc::new(MemoryTokenStore::default());
    store
        .persist(&StoredTokens {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
        })
        .expect("memory store persist cannot fail");

    let config = Config {
        api_base_url: server.url(),
        request_timeout_secs: 5,
        last_email: None,
    };
    let client = ApiClient::new(&config, store.clone()).expect("client should build");
    (client, store)
}

fn signed_out_client(server: &ServerGuard) -> ApiClient {
    let config = Config {
        api_base_url: server.url(),
        request_timeout_secs: 5,
        last_email: None,
    };
    ApiClient::new(&config, Arc::new(MemoryTokenStore::default())).expect("client should build")
}

/// Three concurrent requests all hit 401 on the stale
/// token; exactly one refresh call goes out, and every request retries and
/// succeeds with the new token, which also becomes the persisted pair.
#[tokio::test]
async fn concurrent_401s_share_one_refresh() {
    let mut server = Server::new_async().await;
    let (client, store) = client_with_tokens(&server, "A1", "R1");

    let stale = server
        .mock("GET", "/jobs/sources")
        .match_header("authorization", "Bearer A1")
        .with_status(401)
        .expect(3)
        .create_async()
        .await;

    let refresh = server
        .mock("POST", "/auth/refresh")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "refreshToken": "R1"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"accessToken":"A2","refreshToken":"R2"}"#)
        .expect(1)
        .create_async()
        .await;

    let fresh = server
        .mock("GET", "/jobs/sources")
        .match_header("authorization", "Bearer A2")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"["RemoteOK","Remotive"]"#)
        .expect(3)
        .create_async()
        .await;

    let results = join_all([
        client.job_sources(),
        client.job_sources(),
        client.job_sources(),
    ])
    .await;

    for result in results {
        let sources = result.expect("request should succeed after refresh");
        assert_eq!(sources, vec!["RemoteOK".to_string(), "Remotive".to_string()]);
    }

    stale.assert_async().await;
    refresh.assert_async().await;
    fresh.assert_async().await;

    // The rotated pair is persisted
    let stored = store.load().unwrap().expect("tokens should be stored");
    assert_eq!(stored.access_token, "A2");
    assert_eq!(stored.refresh_token, "R2");
}

/// The refresh itself is rejected. Every caller fails with
/// the refresh error, the session is wiped, and later requests go out with
/// no Authorization header at all.
#[tokio::test]
async fn refresh_failure_forces_logout_and_rejects_waiters() {
    let mut server = Server::new_async().await;
    let (client, store) = client_with_tokens(&server, "A1", "R1");

    let stale = server
        .mock("GET", "/jobs/sources")
        .match_header("authorization", "Bearer A1")
        .with_status(401)
        .expect(3)
        .create_async()
        .await;

    let refresh = server
        .mock("POST", "/auth/refresh")
        .with_status(403)
        .with_body("refresh token revoked")
        .expect(1)
        .create_async()
        .await;

    let (x, y, z) = tokio::join!(
        client.job_sources(),
        client.job_sources(),
        client.job_sources()
    );
    for result in [x, y, z] {
        let err = result.expect_err("request should fail when refresh fails");
        assert!(
            matches!(err, ApiError::RefreshFailed(_)),
            "expected RefreshFailed, got {err:?}"
        );
    }

    stale.assert_async().await;
    refresh.assert_async().await;

    // Session and durable slots are gone
    assert!(!client.session().is_authenticated());
    assert!(store.load().unwrap().is_none());

    // Subsequent requests are anonymous until the next login
    let anonymous = server
        .mock("GET", "/jobs/sources")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .expect(1)
        .create_async()
        .await;

    let sources = client.job_sources().await.expect("anonymous call succeeds");
    assert!(sources.is_empty());
    anonymous.assert_async().await;
}

/// A request that still gets 401 after its one retry fails
/// with `Unauthorized` and never triggers a second refresh.
#[tokio::test]
async fn second_401_after_retry_is_final() {
    let mut server = Server::new_async().await;
    let (client, _store) = client_with_tokens(&server, "A1", "R1");

    // 401 regardless of which token is presented
    let always_stale = server
        .mock("GET", "/users/profile")
        .with_status(401)
        .expect(2)
        .create_async()
        .await;

    let refresh = server
        .mock("POST", "/auth/refresh")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"accessToken":"A2","refreshToken":"R2"}"#)
        .expect(1)
        .create_async()
        .await;

    let err = client.profile().await.expect_err("retried 401 is final");
    assert!(
        matches!(err, ApiError::Unauthorized),
        "expected Unauthorized, got {err:?}"
    );

    always_stale.assert_async().await;
    refresh.assert_async().await;
}

/// Non-401 failures are passed through untouched and never reach the
/// refresh path.
#[tokio::test]
async fn non_401_errors_skip_refresh() {
    let mut server = Server::new_async().await;
    let (client, store) = client_with_tokens(&server, "A1", "R1");

    let refresh = server
        .mock("POST", "/auth/refresh")
        .expect(0)
        .create_async()
        .await;

    let boom = server
        .mock("GET", "/jobs/sources")
        .with_status(500)
        .with_body("upstream exploded")
        .expect(1)
        .create_async()
        .await;

    let err = client.job_sources().await.expect_err("500 should surface");
    assert!(
        matches!(err, ApiError::ServerError(_)),
        "expected ServerError, got {err:?}"
    );

    boom.assert_async().await;
    refresh.assert_async().await;

    // The session is untouched
    assert!(client.session().is_authenticated());
    assert_eq!(store.load().unwrap().unwrap().access_token, "A1");
}

/// A 401 with no refresh token held is the final answer; there is nothing to
/// refresh with.
#[tokio::test]
async fn signed_out_401_is_surfaced_directly() {
    let mut server = Server::new_async().await;
    let client = signed_out_client(&server);

    let refresh = server
        .mock("POST", "/auth/refresh")
        .expect(0)
        .create_async()
        .await;

    let denied = server
        .mock("GET", "/jobs/sources")
        .match_header("authorization", Matcher::Missing)
        .with_status(401)
        .expect(1)
        .create_async()
        .await;

    let err = client.job_sources().await.expect_err("401 should surface");
    assert!(
        matches!(err, ApiError::Unauthorized),
        "expected Unauthorized, got {err:?}"
    );

    denied.assert_async().await;
    refresh.assert_async().await;
}

/// A refresh rotates the pair for requests issued afterwards, not just for
/// the ones queued behind it.
#[tokio::test]
async fn later_requests_use_rotated_pair() {
    let mut server = Server::new_async().await;
    let (client, _store) = client_with_tokens(&server, "A1", "R1");

    let stale = server
        .mock("GET", "/jobs/sources")
        .match_header("authorization", "Bearer A1")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;

    let refresh = server
        .mock("POST", "/auth/refresh")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"accessToken":"A2","refreshToken":"R2"}"#)
        .expect(1)
        .create_async()
        .await;

    let fresh = server
        .mock("GET", "/jobs/sources")
        .match_header("authorization", "Bearer A2")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .expect(2)
        .create_async()
        .await;

    client.job_sources().await.expect("first call succeeds");
    client.job_sources().await.expect("second call succeeds");

    stale.assert_async().await;
    refresh.assert_async().await;
    fresh.assert_async().await;
}
