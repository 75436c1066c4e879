use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use warden_api::app::SharedStore;
use warden_api::config::{ConfigError, SecurityConfig};
use warden_auth::{
    Argon2PasswordEncoder, CredentialRecord, CredentialStore, CredentialStoreError, Identity,
    PasswordEncoder, Role, SessionClaims, TokenSettings,
};
use warden_core::{UserId, Username};
use warden_infra::InMemoryCredentialStore;

const SECRET: &str = "test-secret";
const PASSWORD: &str = "correct horse";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(config: SecurityConfig, store: SharedStore) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = warden_api::app::build_app(&config, store).expect("valid allow-list");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    async fn spawn_default() -> Self {
        Self::spawn(config(), seeded_store()).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn config() -> SecurityConfig {
    SecurityConfig::new(TokenSettings::new(SECRET))
}

/// Argon2 is slow in debug builds; hash the shared password once.
fn password_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| Argon2PasswordEncoder::new().encode(PASSWORD).unwrap())
        .clone()
}

fn record(username: &str, enabled: bool, roles: &[&'static str]) -> CredentialRecord {
    CredentialRecord {
        id: UserId::generate(),
        username: Username::new(username).unwrap(),
        first_name: Some(username.to_string()),
        last_name: Some("Tester".to_string()),
        password_hash: password_hash(),
        enabled,
        roles: roles.iter().map(|r| Role::new(*r)).collect(),
    }
}

fn seeded_store() -> SharedStore {
    let store = InMemoryCredentialStore::new();
    store.upsert(record("alice", true, &["ADMIN", "USER"])).unwrap();
    store.upsert(record("bob", true, &["USER"])).unwrap();
    store.upsert(record("carol", false, &["USER"])).unwrap();
    store.upsert(record("dave", true, &["SUPERUSER"])).unwrap();
    Arc::new(store)
}

fn mint_jwt(secret: &str, roles: &[&'static str], expires_in: ChronoDuration) -> String {
    let identity = Identity::new(
        UserId::generate(),
        Username::new("mallory").unwrap(),
        None,
        None,
        roles.iter().map(|r| Role::new(*r).authority()).collect::<BTreeSet<_>>(),
    );
    let now = Utc::now();
    let claims = SessionClaims::for_identity(&identity, now - ChronoDuration::hours(1), now + expires_in);

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

async fn login(client: &reqwest::Client, srv: &TestServer, username: &str, password: &str) -> reqwest::Response {
    client
        .post(srv.url("/auth/login"))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .unwrap()
}

async fn access_token(client: &reqwest::Client, srv: &TestServer, username: &str) -> String {
    let res = login(client, srv, username, PASSWORD).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    body["accessToken"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn login_returns_token_that_authenticates_profile() {
    let srv = TestServer::spawn_default().await;
    let client = reqwest::Client::new();

    let token = access_token(&client, &srv, "alice").await;

    let res = client.get(srv.url("/me")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["username"], "alice");
    assert_eq!(body["displayName"], "alice Tester");
    assert_eq!(body["roles"], json!(["ADMIN", "USER"]));
    assert!(!body["id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn wrong_password_and_unknown_user_are_indistinguishable() {
    let srv = TestServer::spawn_default().await;
    let client = reqwest::Client::new();

    let bob = login(&client, &srv, "bob", "nope").await;
    let ghost = login(&client, &srv, "ghost", "nope").await;

    assert_eq!(bob.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(ghost.status(), StatusCode::UNAUTHORIZED);

    let bob: serde_json::Value = bob.json().await.unwrap();
    let ghost: serde_json::Value = ghost.json().await.unwrap();
    assert_eq!(bob, ghost);
    assert_eq!(bob["message"], "Bad credentials");
}

#[tokio::test]
async fn disabled_account_is_reported_only_with_the_right_password() {
    let srv = TestServer::spawn_default().await;
    let client = reqwest::Client::new();

    let res = login(&client, &srv, "carol", PASSWORD).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "User is disabled");

    let res = login(&client, &srv, "carol", "nope").await;
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Bad credentials");
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn_default().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/me")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthenticated");
    assert_eq!(body["message"], "Full authentication is required to access this resource");

    // Non-bearer scheme counts as no token.
    let res = client
        .get(srv.url("/me"))
        .header("Authorization", "Basic YWxpY2U6cHc=")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn every_token_failure_yields_the_same_401() {
    let srv = TestServer::spawn_default().await;
    let client = reqwest::Client::new();

    let garbage = "not.a.jwt".to_string();
    let forged = mint_jwt("other-secret", &["ADMIN"], ChronoDuration::minutes(10));
    let expired = mint_jwt(SECRET, &["ADMIN"], -ChronoDuration::minutes(1));

    let mut bodies = Vec::new();
    for token in [garbage, forged, expired] {
        let res = client.get(srv.url("/me")).bearer_auth(&token).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        bodies.push(res.json::<serde_json::Value>().await.unwrap());
    }
    assert!(bodies.windows(2).all(|w| w[0] == w[1]));
}

#[tokio::test]
async fn allow_listed_endpoint_ignores_invalid_token() {
    let srv = TestServer::spawn_default().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(srv.url("/health"))
        .bearer_auth("garbage")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn role_gate_admits_admin_and_rejects_others() {
    let srv = TestServer::spawn_default().await;
    let client = reqwest::Client::new();

    let alice = access_token(&client, &srv, "alice").await;
    let res = client
        .get(srv.url("/admin/status"))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    for username in ["bob", "dave"] {
        let token = access_token(&client, &srv, username).await;
        let res = client
            .get(srv.url("/admin/status"))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["message"], "Access is denied");
    }

    let res = client.get(srv.url("/admin/status")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn minted_token_with_valid_signature_is_trusted_without_store() {
    let srv = TestServer::spawn_default().await;
    let client = reqwest::Client::new();

    // "mallory" is not in the store: the token alone carries the identity.
    let token = mint_jwt(SECRET, &["ADMIN"], ChronoDuration::minutes(10));
    let res = client
        .get(srv.url("/admin/status"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["username"], "mallory");
}

#[tokio::test]
async fn two_logins_yield_distinct_tokens_that_both_work() {
    let srv = TestServer::spawn_default().await;
    let client = reqwest::Client::new();

    let first = access_token(&client, &srv, "bob").await;
    let second = access_token(&client, &srv, "bob").await;
    assert_ne!(first, second);

    for token in [first, second] {
        let res = client.get(srv.url("/me")).bearer_auth(&token).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn preflight_is_not_challenged() {
    let srv = TestServer::spawn_default().await;
    let client = reqwest::Client::new();

    let res = client
        .request(reqwest::Method::OPTIONS, srv.url("/admin/status"))
        .send()
        .await
        .unwrap();
    assert_ne!(res.status(), StatusCode::UNAUTHORIZED);
    assert_ne!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn preflight_can_be_disabled() {
    let mut cfg = config();
    cfg.permit_preflight = false;
    let srv = TestServer::spawn(cfg, seeded_store()).await;
    let client = reqwest::Client::new();

    let res = client
        .request(reqwest::Method::OPTIONS, srv.url("/me"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

struct DownStore;

#[async_trait::async_trait]
impl CredentialStore for DownStore {
    async fn find_by_username(
        &self,
        _username: &str,
    ) -> Result<Option<CredentialRecord>, CredentialStoreError> {
        Err(CredentialStoreError::Unavailable("connection refused".into()))
    }
}

struct SlowStore;

#[async_trait::async_trait]
impl CredentialStore for SlowStore {
    async fn find_by_username(
        &self,
        _username: &str,
    ) -> Result<Option<CredentialRecord>, CredentialStoreError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(None)
    }
}

#[tokio::test]
async fn store_outage_is_a_503_not_a_401() {
    let srv = TestServer::spawn(config(), Arc::new(DownStore)).await;
    let client = reqwest::Client::new();

    let res = login(&client, &srv, "alice", PASSWORD).await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "service_unavailable");
}

#[tokio::test]
async fn slow_store_lookup_times_out_as_503() {
    let mut cfg = config();
    cfg.store_timeout_ms = 50;
    let srv = TestServer::spawn(cfg, Arc::new(SlowStore)).await;
    let client = reqwest::Client::new();

    let res = login(&client, &srv, "alice", PASSWORD).await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn unusable_token_lifetime_is_rejected_at_startup() {
    for millis in [0, -1000, i64::MAX / 2] {
        let mut cfg = config();
        cfg.token = TokenSettings::new(SECRET).with_expiration_millis(millis);
        assert!(matches!(
            warden_api::app::build_app(&cfg, seeded_store()),
            Err(ConfigError::Token(_))
        ));
    }
}

#[tokio::test]
async fn head_follows_get_allow_list_entry() {
    let srv = TestServer::spawn_default().await;
    let client = reqwest::Client::new();

    let res = client.head(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.head(srv.url("/me")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn allow_listed_profile_without_token_is_401_not_500() {
    let mut cfg = config();
    cfg.unsecured_endpoints = vec!["/me".into(), "/admin/**".into()];
    let srv = TestServer::spawn(cfg, seeded_store()).await;
    let client = reqwest::Client::new();

    for path in ["/me", "/admin/status"] {
        let res = client.get(srv.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{path}");
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["error"], "unauthenticated");
    }
}

#[tokio::test]
async fn login_does_not_block_concurrent_requests() {
    let srv = TestServer::spawn_default().await;
    let client = reqwest::Client::new();

    let logins: Vec<_> = (0..4)
        .map(|_| {
            let client = client.clone();
            let url = srv.url("/auth/login");
            tokio::spawn(async move {
                client
                    .post(url)
                    .json(&json!({ "username": "bob", "password": "nope" }))
                    .send()
                    .await
                    .unwrap()
                    .status()
            })
        })
        .collect();

    let started = std::time::Instant::now();
    let res = client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(started.elapsed() < Duration::from_millis(500));

    for login in logins {
        assert_eq!(login.await.unwrap(), StatusCode::UNAUTHORIZED);
    }
}
