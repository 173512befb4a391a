//! End-to-end key resolution through `resolve`.

use super::support::*;
use tss_lookup::lookup::{LookupContext, SessionContext};
use tss_lookup::{resolve, FieldMap, Lookup, LookupOptions};
use wiremock::MockServer;

fn expected(username: &str, password: &str) -> FieldMap {
    FieldMap::from([
        ("Password".to_string(), password.to_string()),
        ("Username".to_string(), username.to_string()),
    ])
}

#[tokio::test]
async fn test_secret_key_resolves_to_username_and_password() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    mount_secret(&server, "42", secret_body("alice", "p"), 1).await;

    let file = default_auth_file();
    let ctx = SessionContext::new();

    let fields = resolve("secret_server::42", &options(&server, &file), &ctx)
        .await
        .unwrap()
        .found()
        .expect("secret_server::42 should resolve");

    // Notes is dropped.
    assert_eq!(fields.into_inner(), expected("alice", "p"));
}

#[tokio::test]
async fn test_keys_in_one_session_share_a_token() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    mount_secret(&server, "42", secret_body("alice", "p"), 1).await;
    mount_secret(&server, "43", secret_body("bob", "q"), 1).await;

    let file = default_auth_file();
    let options = options(&server, &file);
    let ctx = SessionContext::new();

    let first = resolve("secret_server::42", &options, &ctx).await.unwrap().found().unwrap();
    let second = resolve("secret_server::43", &options, &ctx).await.unwrap().found().unwrap();
    // Served from the session cache.
    let again = resolve("secret_server::42", &options, &ctx).await.unwrap().found().unwrap();

    assert_eq!(first.expose_secret(), &expected("alice", "p"));
    assert_eq!(second.expose_secret(), &expected("bob", "q"));
    assert_eq!(again, first);
}

#[tokio::test]
async fn test_foreign_and_malformed_keys_make_no_requests() {
    let server = MockServer::start().await;
    forbid_requests(&server).await;

    let file = default_auth_file();
    let options = options(&server, &file);
    let ctx = SessionContext::new();

    for key in [
        "profile::db::password",
        "secret_server::",
        "secret_server::abc",
        "SECRET_SERVER::1",
    ] {
        assert_eq!(resolve(key, &options, &ctx).await.unwrap(), Lookup::NotFound, "{}", key);
    }
    assert_eq!(ctx.cache_len(), 0);
}

#[tokio::test]
async fn test_unknown_secret_is_not_found() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    wiremock::Mock::given(wiremock::matchers::path(secret_path("404")))
        .respond_with(wiremock::ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;

    let file = default_auth_file();
    let ctx = SessionContext::new();

    let result = resolve("secret_server::404", &options(&server, &file), &ctx).await.unwrap();
    assert_eq!(result, Lookup::NotFound);
}

#[tokio::test]
async fn test_missing_uri_fails_before_any_request() {
    let server = MockServer::start().await;
    forbid_requests(&server).await;

    let file = default_auth_file();
    let options = LookupOptions { uri: None, ..options(&server, &file) };
    let ctx = SessionContext::new();

    let err = resolve("secret_server::42", &options, &ctx).await.unwrap_err();
    assert!(err.is_config());
    assert_eq!(err.to_string(), "Cannot use Secret Server backend: No URI defined.");
}

#[tokio::test]
async fn test_auth_file_without_password_is_lookup_error() {
    let server = MockServer::start().await;
    forbid_requests(&server).await;

    let file = auth_file("username = svc-puppet\ndomain = CORP\n");
    let ctx = SessionContext::new();

    let err = resolve("secret_server::42", &options(&server, &file), &ctx).await.unwrap_err();

    assert!(!err.is_config());
    let message = err.to_string();
    assert!(message.starts_with("Secret server lookup failed: Failed auth file parsing"));
    assert!(message.contains(&file.path().display().to_string()));
}

#[tokio::test]
async fn test_use_ssl_false_downgrades_https_uri() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    mount_secret(&server, "42", secret_body("alice", "p"), 1).await;

    let file = default_auth_file();
    let options = LookupOptions {
        uri: Some(server.uri().replacen("http://", "https://", 1)),
        use_ssl: Some(false),
        ..options(&server, &file)
    };
    let ctx = SessionContext::new();

    let result = resolve("secret_server::42", &options, &ctx).await.unwrap();
    assert!(result.is_found());
}

#[tokio::test]
async fn test_options_from_host_map() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    mount_secret(&server, "42", secret_body("alice", "p"), 1).await;

    let file = default_auth_file();
    let map = serde_json::json!({
        "uri": server.uri(),
        "auth_file": file.path(),
        "ssl_verify": true
    });
    let options = LookupOptions::from_map(map.as_object().unwrap()).unwrap();
    let ctx = SessionContext::new();

    let fields = resolve("secret_server::42", &options, &ctx).await.unwrap().found().unwrap();
    assert_eq!(fields.expose_secret().get("Username").map(String::as_str), Some("alice"));
    assert!(ctx.cache_has_key(&secret_path("42")));
}

#[tokio::test]
async fn test_results_render_redacted() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    mount_secret(&server, "42", secret_body("alice", TEST_PASSWORD), 1).await;

    let file = default_auth_file();
    let ctx = SessionContext::new();

    let result = resolve("secret_server::42", &options(&server, &file), &ctx).await.unwrap();

    let debug = format!("{:?}", result);
    assert!(!debug.contains(TEST_PASSWORD));
    assert!(!debug.contains("alice"));
    assert!(!format!("{:?}", ctx).contains(TEST_TOKEN));
}
