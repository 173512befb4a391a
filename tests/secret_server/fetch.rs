//! Secret retrieval and response caching.

use super::support::*;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tss_lookup::config::TlsSettings;
use tss_lookup::lookup::{Lookup, LookupContext, SessionContext};
use tss_lookup::secrets::{SecretFetcher, SecretServerError, ACCESS_TOKEN_CACHE_KEY};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_fetch_sends_bearer_token() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(secret_path("42")))
        .and(header("authorization", format!("Bearer {}", TEST_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(secret_body("alice", "p")))
        .expect(1)
        .mount(&server)
        .await;

    let file = default_auth_file();
    let base = base_url(&server);
    let tls = TlsSettings::default();
    let ctx = SessionContext::new();

    let record = SecretFetcher::new(&base, &tls, Some(file.path()))
        .fetch_secret("secrets/42", &ctx)
        .await
        .unwrap()
        .found()
        .expect("secret should be found");

    assert_eq!(record.name.as_deref(), Some("db-admin"));
    assert_eq!(record.items.len(), 3);
}

#[tokio::test]
async fn test_bad_request_is_not_found_and_never_cached() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(secret_path("999")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Access Denied or Secret Does Not Exist"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let file = default_auth_file();
    let base = base_url(&server);
    let tls = TlsSettings::default();
    let ctx = SessionContext::new().with_explain();
    let fetcher = SecretFetcher::new(&base, &tls, Some(file.path()));

    assert_eq!(fetcher.fetch_secret("secrets/999", &ctx).await.unwrap(), Lookup::NotFound);
    assert_eq!(fetcher.fetch_secret("secrets/999", &ctx).await.unwrap(), Lookup::NotFound);

    assert!(!ctx.cache_has_key(&secret_path("999")));
    assert!(ctx.explanations().iter().any(|line| line.starts_with("400 Bad Request for ")));
}

#[tokio::test]
async fn test_success_is_cached_by_request_path() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    mount_secret(&server, "42", secret_body("alice", "p"), 1).await;

    let file = default_auth_file();
    let base = base_url(&server);
    let tls = TlsSettings::default();
    let ctx = SessionContext::new().with_explain();
    let fetcher = SecretFetcher::new(&base, &tls, Some(file.path()));

    let first = fetcher.fetch_secret("secrets/42", &ctx).await.unwrap();
    let second = fetcher.fetch_secret("secrets/42", &ctx).await.unwrap();

    assert_eq!(first, second);
    assert!(matches!(ctx.cached_value(&secret_path("42")), Some(Value::String(_))));
    assert!(ctx
        .explanations()
        .contains(&format!("Returning cached value for {}", secret_path("42"))));
}

#[tokio::test]
async fn test_cache_hit_needs_no_token_or_request() {
    let server = MockServer::start().await;
    forbid_requests(&server).await;

    let ctx = SessionContext::new();
    ctx.cache(&secret_path("7"), Value::String(secret_body("bob", "q").to_string()));

    let base = base_url(&server);
    let tls = TlsSettings::default();
    // No auth file at all: a cache hit must not need one.
    let record = SecretFetcher::new(&base, &tls, None)
        .fetch_secret("secrets/7", &ctx)
        .await
        .unwrap()
        .found()
        .unwrap();

    assert_eq!(record.credential_fields().get("Username").map(String::as_str), Some("bob"));
    assert!(!ctx.cache_has_key(ACCESS_TOKEN_CACHE_KEY));
}

#[tokio::test]
async fn test_endpoint_is_interpolated() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    mount_secret(&server, "1337", secret_body("carol", "r"), 1).await;

    let file = default_auth_file();
    let base = base_url(&server);
    let tls = TlsSettings::default();
    let ctx = SessionContext::new()
        .with_scope(HashMap::from([("secret".to_string(), "1337".to_string())]));

    let result = SecretFetcher::new(&base, &tls, Some(file.path()))
        .fetch_secret("secrets/%{secret}", &ctx)
        .await
        .unwrap();

    assert!(result.is_found());
    assert!(ctx.cache_has_key(&secret_path("1337")));
}

#[tokio::test]
async fn test_unexpected_status_carries_code_and_reason() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(secret_path("42")))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let file = default_auth_file();
    let base = base_url(&server);
    let tls = TlsSettings::default();
    let ctx = SessionContext::new();

    let err = SecretFetcher::new(&base, &tls, Some(file.path()))
        .fetch_secret("secrets/42", &ctx)
        .await
        .unwrap_err();

    assert!(matches!(err, SecretServerError::UnexpectedStatus { status: 403, .. }));
    assert_eq!(err.to_string(), "secret server lookup failed. 403 : Forbidden");
}

#[tokio::test]
async fn test_malformed_body_is_not_cached() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(secret_path("42")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 42 })))
        .expect(2)
        .mount(&server)
        .await;

    let file = default_auth_file();
    let base = base_url(&server);
    let tls = TlsSettings::default();
    let ctx = SessionContext::new();
    let fetcher = SecretFetcher::new(&base, &tls, Some(file.path()));

    for _ in 0..2 {
        let err = fetcher.fetch_secret("secrets/42", &ctx).await.unwrap_err();
        assert!(matches!(err, SecretServerError::Serialization(_)));
    }
    assert!(!ctx.cache_has_key(&secret_path("42")));
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(secret_path("42")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(secret_body("alice", "p"))
                .set_delay(Duration::from_secs(7)),
        )
        .mount(&server)
        .await;

    let file = default_auth_file();
    let base = base_url(&server);
    let tls = TlsSettings::default();
    let ctx = SessionContext::new();

    let err = SecretFetcher::new(&base, &tls, Some(file.path()))
        .fetch_secret("secrets/42", &ctx)
        .await
        .unwrap_err();

    match err {
        SecretServerError::Http(e) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {:?}", other),
    }
}
