//! Shared fixtures: a mock Secret Server, credential files and options.

use serde_json::{json, Value};
use std::io::Write;
use tempfile::NamedTempFile;
use tss_lookup::LookupOptions;
use url::Url;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN_PATH: &str = "/SecretServer/oauth2/token";
pub const TEST_TOKEN: &str = "tok-5f2b9c7e";
pub const TEST_PASSWORD: &str = "p4ssw0rd-from-file";

pub fn secret_path(id: &str) -> String {
    format!("/SecretServer/api/v1/secrets/{}", id)
}

/// Write a credential file and keep it alive for the test.
pub fn auth_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create auth file");
    file.write_all(contents.as_bytes()).expect("write auth file");
    file
}

pub fn default_auth_file() -> NamedTempFile {
    auth_file(&format!("username = svc-puppet\npassword = {}\n", TEST_PASSWORD))
}

pub fn base_url(server: &MockServer) -> Url {
    Url::parse(&server.uri()).expect("mock server uri")
}

pub fn options(server: &MockServer, auth_file: &NamedTempFile) -> LookupOptions {
    LookupOptions {
        uri: Some(server.uri()),
        auth_file: Some(auth_file.path().to_path_buf()),
        ..Default::default()
    }
}

/// Secret record with `Username`, `Password` and an unrelated `Notes` item.
pub fn secret_body(username: &str, password: &str) -> Value {
    json!({
        "id": 42,
        "name": "db-admin",
        "secretTemplateName": "Windows Account",
        "items": [
            { "itemId": 1, "fieldName": "Username", "slug": "username", "itemValue": username },
            { "itemId": 2, "fieldName": "Password", "slug": "password", "itemValue": password },
            { "itemId": 3, "fieldName": "Notes", "slug": "notes", "itemValue": "rotated weekly" }
        ]
    })
}

pub async fn mount_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": TEST_TOKEN,
            "token_type": "bearer",
            "expires_in": 1199
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

pub async fn mount_secret(server: &MockServer, id: &str, body: Value, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(secret_path(id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Fail verification if any request reaches the server.
pub async fn forbid_requests(server: &MockServer) {
    Mock::given(any()).respond_with(ResponseTemplate::new(500)).expect(0).mount(server).await;
}
