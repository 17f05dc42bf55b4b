mod common;

use common::{client_for, identity, SESSION_HEADER, SESSION_TOKEN};
use gitauth_sdk::GitAuthError;
use serde_json::json;

const STATUS_PATH: &str = "/api/v2/gitauth/github";

#[tokio::test]
async fn authenticated_session_with_installations() {
    let mut server = mockito::Server::new_async().await;
    let body = json!({
        "authenticated": true,
        "device": true,
        "type": "github",
        "user": identity("kylecarbs"),
        "app_installable": true,
        "installations": [
            {
                "id": 42,
                "account": identity("coder"),
                "configure_url": "https://github.com/organizations/coder/settings/installations/42",
            },
            {
                "id": 43,
                "account": identity("kylecarbs"),
                "configure_url": "https://github.com/settings/installations/43",
            },
        ],
        "app_install_url": "https://github.com/apps/workspaces/installations/new",
    });
    let mock = server
        .mock("GET", STATUS_PATH)
        .match_header(SESSION_HEADER, SESSION_TOKEN)
        .with_status(200)
        .with_body(body.to_string())
        .create_async()
        .await;

    let session = client_for(&server).auth_status("github").await.unwrap();

    assert!(session.authenticated);
    assert!(session.device);
    assert_eq!(session.provider_type, "github");
    assert_eq!(session.user.as_ref().map(|u| u.login.as_str()), Some("kylecarbs"));
    assert!(session.app_installable);
    let ids: Vec<i64> = session.installations.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![42, 43]);
    assert_eq!(session.installations[0].account.login, "coder");
    mock.assert_async().await;
}

#[tokio::test]
async fn unauthenticated_session_is_not_an_error() {
    let mut server = mockito::Server::new_async().await;
    let body = json!({
        "authenticated": false,
        "device": true,
        "type": "github",
        "user": null,
        "app_installable": false,
        "installations": null,
        "app_install_url": "",
    });
    server
        .mock("GET", STATUS_PATH)
        .with_status(200)
        .with_body(body.to_string())
        .create_async()
        .await;

    let session = client_for(&server).auth_status("github").await.unwrap();
    assert!(!session.authenticated);
    assert!(session.user.is_none());
    assert!(session.installations.is_empty());
}

#[tokio::test]
async fn unauthenticated_session_drops_stray_identity() {
    let mut server = mockito::Server::new_async().await;
    let body = json!({
        "authenticated": false,
        "device": false,
        "type": "github",
        "user": identity("ghost"),
        "app_installable": false,
        "installations": [],
        "app_install_url": "",
    });
    server
        .mock("GET", STATUS_PATH)
        .with_status(200)
        .with_body(body.to_string())
        .create_async()
        .await;

    let session = client_for(&server).auth_status("github").await.unwrap();
    assert!(session.user.is_none());
}

#[tokio::test]
async fn status_is_idempotent() {
    let mut server = mockito::Server::new_async().await;
    let body = json!({
        "authenticated": true,
        "device": false,
        "type": "github",
        "user": identity("kylecarbs"),
        "app_installable": false,
        "installations": [],
        "app_install_url": "",
    });
    let mock = server
        .mock("GET", STATUS_PATH)
        .with_status(200)
        .with_body(body.to_string())
        .expect(2)
        .create_async()
        .await;

    let client = client_for(&server);
    let first = client.auth_status("github").await.unwrap();
    let second = client.auth_status("github").await.unwrap();
    assert_eq!(first, second);
    mock.assert_async().await;
}

#[tokio::test]
async fn garbage_success_body_is_decode_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", STATUS_PATH)
        .with_status(200)
        .with_body("<html>login</html>")
        .create_async()
        .await;

    let err = client_for(&server).auth_status("github").await.unwrap_err();
    assert!(matches!(err, GitAuthError::Decode(_)));
}

#[tokio::test]
async fn expired_session_token_is_provider_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", STATUS_PATH)
        .with_status(401)
        .with_body(
            json!({
                "message": "You must be logged in to do this.",
                "detail": "session token expired",
            })
            .to_string(),
        )
        .create_async()
        .await;

    let err = client_for(&server).auth_status("github").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(
        err.to_string(),
        "You must be logged in to do this.: session token expired"
    );
}
