#![allow(dead_code)]

use gitauth_sdk::{GitAuthClient, SessionTokenAuth};
use serde_json::{json, Value};

pub const SESSION_HEADER: &str = "Session-Token";
pub const SESSION_TOKEN: &str = "test-session-token";

/// Client pointed at the mock server, authenticated with the test session token
pub fn client_for(server: &mockito::ServerGuard) -> GitAuthClient {
    GitAuthClient::new(&server.url())
        .expect("valid mock server url")
        .with_authenticator(SessionTokenAuth::new(SESSION_HEADER, SESSION_TOKEN))
}

pub fn identity(login: &str) -> Value {
    json!({
        "login": login,
        "avatar_url": format!("https://avatars.example.com/u/{}", login),
        "profile_url": format!("https://github.com/{}", login),
        "name": login.to_uppercase(),
    })
}

pub fn repo(owner: &str, name: &str) -> Value {
    json!({
        "name": name,
        "description": format!("{} repository", name),
        "owner": identity(owner),
        "url": format!("https://github.com/{}/{}", owner, name),
        "stargazers_count": 3,
        "language": "Rust",
        "default_branch": "main",
    })
}

pub fn repos(owner: &str, count: usize) -> Vec<Value> {
    (0..count).map(|i| repo(owner, &format!("repo-{}", i))).collect()
}

pub fn error_body(message: &str) -> String {
    json!({ "message": message }).to_string()
}
