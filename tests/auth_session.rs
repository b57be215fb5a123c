//! Login/logout lifecycle: session installation, durable persistence, and
//! best-effort remote logout.

use std::sync::Arc;

use mockito::{Matcher, Server, ServerGuard};
use remotematch::{ApiClient, ApiError, Config, MemoryTokenStore, StoredTokens, TokenStore};

const USER_JSON: &str = r#"{
    "_id": "66b1aa00",
    "email": "dev@example.com",
    "role": "user",
    "profile": {
        "skills": ["Rust"],
        "experienceLevel": "senior",
        "salaryRange": {"min": 120000, "max": 160000},
        "remotePreference": "global",
        "preferredRoles": ["Backend Engineer"]
    },
    "createdAt": "2026-05-12T08:00:00Z"
}"#;

fn auth_body(access: &str, refresh: &str) -> String {
    format!(
        r#"{{"user": {USER_JSON}, "accessToken": "{access}", "refreshToken": "{refresh}"}}"#
    )
}

fn build_client(server: &ServerGuard) -> (ApiClient, Arc<MemoryTokenStore>) {
    let store = Arc::new(MemoryTokenStore::default());
    let config = Config {
        api_base_url: server.url(),
        request_timeout_secs: 5,
        last_email: None,
    };
    let client = ApiClient::new(&config, store.clone()).expect("client should build");
    (client, store)
}

#[tokio::test]
async fn login_starts_and_persists_session() {
    let mut server = Server::new_async().await;
    let (client, store) = build_client(&server);
    assert!(!client.session().is_authenticated());

    let login = server
        .mock("POST", "/auth/login")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "email": "dev@example.com",
            "password": "hunter2"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(auth_body("A1", "R1"))
        .expect(1)
        .create_async()
        .await;

    let auth = client
        .login("dev@example.com", "hunter2")
        .await
        .expect("login should succeed");

    assert_eq!(auth.user.email, "dev@example.com");
    assert_eq!(auth.access_token, "A1");
    assert!(client.session().is_authenticated());

    let stored = store.load().unwrap().expect("tokens should be persisted");
    assert_eq!(stored.access_token, "A1");
    assert_eq!(stored.refresh_token, "R1");

    login.assert_async().await;
}

#[tokio::test]
async fn login_rejection_leaves_client_signed_out() {
    let mut server = Server::new_async().await;
    let (client, store) = build_client(&server);

    // A 401 from login means bad credentials, not an expired token; the
    // refresh path must stay untouched.
    let refresh = server
        .mock("POST", "/auth/refresh")
        .expect(0)
        .create_async()
        .await;

    let login = server
        .mock("POST", "/auth/login")
        .with_status(401)
        .with_body("invalid credentials")
        .expect(1)
        .create_async()
        .await;

    let err = client
        .login("dev@example.com", "wrong")
        .await
        .expect_err("login should fail");
    assert!(
        matches!(err, ApiError::Unauthorized),
        "expected Unauthorized, got {err:?}"
    );
    assert!(!client.session().is_authenticated());
    assert!(store.load().unwrap().is_none());

    login.assert_async().await;
    refresh.assert_async().await;
}

#[tokio::test]
async fn register_starts_session() {
    let mut server = Server::new_async().await;
    let (client, store) = build_client(&server);

    let register = server
        .mock("POST", "/auth/register")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "email": "new@example.com"
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(auth_body("A1", "R1"))
        .expect(1)
        .create_async()
        .await;

    let auth = client
        .register("new@example.com", "hunter2")
        .await
        .expect("registration should succeed");

    assert_eq!(auth.refresh_token, "R1");
    assert!(client.session().is_authenticated());
    assert!(store.load().unwrap().is_some());

    register.assert_async().await;
}

#[tokio::test]
async fn startup_seeds_session_from_store() {
    let mut server = Server::new_async().await;

    let store = Arc::new(MemoryTokenStore::default());
    store
        .persist(&StoredTokens {
            access_token: "A1".to_string(),
            refresh_token: "R1".to_string(),
        })
        .unwrap();

    let config = Config {
        api_base_url: server.url(),
        request_timeout_secs: 5,
        last_email: None,
    };
    let client = ApiClient::new(&config, store).expect("client should build");
    assert!(client.session().is_authenticated());

    let me = server
        .mock("GET", "/auth/me")
        .match_header("authorization", "Bearer A1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(USER_JSON)
        .expect(1)
        .create_async()
        .await;

    let user = client.current_user().await.expect("me should succeed");
    assert_eq!(user.email, "dev@example.com");
    assert_eq!(user.profile.experience_level, "senior");

    me.assert_async().await;
}

#[tokio::test]
async fn logout_clears_session_even_if_server_fails() {
    let mut server = Server::new_async().await;
    let (client, store) = build_client(&server);

    let login = server
        .mock("POST", "/auth/login")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(auth_body("A1", "R1"))
        .create_async()
        .await;
    client
        .login("dev@example.com", "hunter2")
        .await
        .expect("login should succeed");
    login.assert_async().await;

    let logout = server
        .mock("POST", "/auth/logout")
        .with_status(500)
        .with_body("session service down")
        .expect(1)
        .create_async()
        .await;

    client.logout().await;

    assert!(!client.session().is_authenticated());
    assert!(store.load().unwrap().is_none());
    logout.assert_async().await;
}
