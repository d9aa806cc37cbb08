//! Shared fixtures for the wiremock-backed integration tests.

#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use prompetize::crypto::KeyMaterial;
use prompetize::sync::{ApiConfig, AuthConfig, AuthToken, GitHubAuth, GitHubClient};
use prompetize::{KeyValueStore, LocalCache, MemoryStore};
use std::sync::Arc;
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";

pub fn cache() -> Arc<LocalCache> {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    Arc::new(LocalCache::new(
        store,
        &KeyMaterial::new("pw").with_iterations(1_000),
    ))
}

fn auth(cache: &Arc<LocalCache>) -> Arc<GitHubAuth> {
    Arc::new(GitHubAuth::new(
        Arc::clone(cache),
        AuthConfig {
            client_id: "client".to_string(),
            redirect_uri: "https://example.test/cb".to_string(),
            scopes: vec!["repo".to_string()],
        },
    ))
}

fn api_config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        base_url: server.uri(),
        ..ApiConfig::default()
    }
}

/// Client with a stored token, sharing `cache` with the caller.
pub async fn authenticated_client(
    server: &MockServer,
    cache: &Arc<LocalCache>,
) -> Arc<GitHubClient> {
    let auth = auth(cache);
    auth.save_token(&AuthToken::new(TOKEN))
        .await
        .expect("store token");
    Arc::new(GitHubClient::new(api_config(server), auth).expect("build client"))
}

pub fn anonymous_client(server: &MockServer) -> Arc<GitHubClient> {
    Arc::new(GitHubClient::new(api_config(server), auth(&cache())).expect("build client"))
}

/// Contents-API response body, wrapped the way GitHub wraps base64.
pub fn contents_body(content: &str, sha: &str) -> serde_json::Value {
    let encoded = BASE64.encode(content.as_bytes());
    let wrapped = encoded
        .as_bytes()
        .chunks(60)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect::<Vec<_>>()
        .join("\n");
    serde_json::json!({ "content": wrapped, "sha": sha, "encoding": "base64" })
}

pub fn decode_content(body: &serde_json::Value) -> String {
    let encoded = body["content"].as_str().expect("content field");
    String::from_utf8(BASE64.decode(encoded).expect("base64")).expect("utf-8")
}

pub fn repository_json(owner: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": 1,
        "name": name,
        "full_name": format!("{}/{}", owner, name),
        "private": false,
        "description": null,
        "default_branch": "main",
        "owner": { "login": owner, "id": 7 }
    })
}
