//! End-to-end tests against an in-process fake backend.
//!
//! These drive the real reqwest transport over loopback HTTP.

mod backend;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

use medtrack_client::api::{auth, medications, prescriptions, upload};
use medtrack_client::gateway::{Gateway, ReqwestTransport};
use medtrack_client::session::{Credentials, FileStorage, IdentityStorage, MemoryStorage};
use medtrack_client::{ClientError, Config, Endpoint, Identity, MedTrack, RequestOptions};

fn gateway(url: &str, storage: Arc<dyn IdentityStorage>) -> Gateway {
    Gateway::new(
        &Config::with_api_url(url),
        Arc::new(ReqwestTransport::new()),
        storage,
    )
    .unwrap()
}

fn signed_in() -> Arc<dyn IdentityStorage> {
    Arc::new(MemoryStorage::with_identity("user", &Identity::new("u-1", "ana")).unwrap())
}

#[tokio::test]
async fn anonymous_calls_carry_no_identity_header() {
    let backend = backend::spawn().await;
    let gateway = gateway(&backend.url, Arc::new(MemoryStorage::new("user")));

    let err = assert_err!(auth::current_user(&gateway).await);

    assert_eq!(err.status(), Some(401));
    assert_eq!(err.to_string(), "Not authenticated");
    let headers = backend.seen.last();
    assert!(headers.get("x-user-id").is_none());
    assert_eq!(headers["ngrok-skip-browser-warning"], "true");
    assert_eq!(headers["content-type"], "application/json");
}

#[tokio::test]
async fn signed_in_calls_carry_identity_header() {
    let backend = backend::spawn().await;
    let gateway = gateway(&backend.url, signed_in());

    let identity = assert_ok!(auth::current_user(&gateway).await);

    assert_eq!(identity, Identity::new("u-1", "ana"));
    assert_eq!(backend.seen.last()["x-user-id"], "u-1");
}

#[tokio::test]
async fn success_body_is_returned_exactly() {
    let backend = backend::spawn().await;
    let gateway = gateway(&backend.url, signed_in());

    let body = assert_ok!(
        gateway
            .call_value(Endpoint::CurrentUser, RequestOptions::get())
            .await
    );

    assert_eq!(body, json!({"user_id": "u-1", "username": "ana"}));
}

#[tokio::test]
async fn path_segments_are_encoded_and_detail_surfaces() {
    let backend = backend::spawn().await;
    let gateway = gateway(&backend.url, signed_in());

    let found = assert_ok!(prescriptions::list(&gateway, "Ana Lima").await);
    assert_eq!(found[0].patient_name, "Ana Lima");
    assert_eq!(found[0].medicines[0].scheduled_times, vec!["08:30", "20:30"]);

    let err = assert_err!(prescriptions::list(&gateway, "Nobody").await);
    assert!(matches!(
        err,
        ClientError::Request { status: 404, ref message } if message == "patient not found"
    ));
}

#[tokio::test]
async fn non_json_failure_gets_generic_message() {
    let backend = backend::spawn().await;
    let gateway = gateway(&backend.url, signed_in());

    let err = assert_err!(medications::daily_status(&gateway, "ana").await);

    assert_eq!(err.status(), Some(502));
    assert_eq!(err.to_string(), "request failed with status 502");
}

#[tokio::test]
async fn form_reply_is_url_encoded() {
    let backend = backend::spawn().await;
    let gateway = gateway(&backend.url, signed_in());

    let outcome = assert_ok!(medications::respond(&gateway, "+15550100", "yes").await);

    assert_eq!(outcome.is_taken, Some(true));
    assert_eq!(outcome.message, "reply from +15550100");
    assert_eq!(
        backend.seen.last()["content-type"],
        "application/x-www-form-urlencoded"
    );
}

#[tokio::test]
async fn multipart_upload_reaches_backend() {
    let backend = backend::spawn().await;
    let gateway = gateway(&backend.url, signed_in());

    let response = assert_ok!(upload::upload_file(&gateway, "scan.pdf", b"%PDF-1.4".to_vec()).await);

    assert_eq!(response.filename, "scan.pdf");
    assert_eq!(response.public_id, "application/pdf:8");
    let content_type = backend.seen.last()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("multipart/form-data; boundary="));
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let url = backend::dead_url().await;
    let gateway = gateway(&url, signed_in());

    let err = assert_err!(auth::current_user(&gateway).await);

    assert!(matches!(err, ClientError::Network(_)));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn login_persists_across_restarts_until_logout() {
    let backend = backend::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        medtrack_session_dir: Some(dir.path().to_path_buf()),
        ..Config::with_api_url(&backend.url)
    };

    let first = assert_ok!(MedTrack::from_config(&config));
    let identity = assert_ok!(
        first
            .session()
            .login(&Credentials {
                username_or_email: "ana".to_string(),
                password: "secret".to_string(),
            })
            .await
    );
    assert_eq!(identity.email.as_deref(), Some("ana@example.com"));
    assert!(dir.path().join("user.json").exists());

    let restarted = assert_ok!(MedTrack::from_config(&config));
    assert_eq!(restarted.session().current(), Some(identity));
    assert_ok!(auth::current_user(restarted.gateway()).await);
    assert_eq!(backend.seen.last()["x-user-id"], "u-1");

    restarted.session().logout();
    assert!(!dir.path().join("user.json").exists());
    assert_eq!(
        FileStorage::new(dir.path(), "user").load().unwrap(),
        None
    );

    let err = assert_err!(auth::current_user(first.gateway()).await);
    assert_eq!(err.to_string(), "Not authenticated");
    assert!(backend.seen.last().get("x-user-id").is_none());
}

#[tokio::test]
async fn rejected_login_leaves_session_anonymous() {
    let backend = backend::spawn().await;
    let app = assert_ok!(MedTrack::with_parts(
        &Config::with_api_url(&backend.url),
        Arc::new(ReqwestTransport::new()),
        Arc::new(MemoryStorage::new("user")),
    ));

    let err = assert_err!(
        app.session()
            .login(&Credentials {
                username_or_email: "ana".to_string(),
                password: "wrong".to_string(),
            })
            .await
    );

    assert_eq!(err.to_string(), "Invalid credentials");
    assert!(!app.session().is_authenticated());
    assert_eq!(backend.seen.count(), 1);
}
