mod common;

use axum::http::StatusCode;
use common::{assert_redirect, body_string, TestApp};

#[tokio::test]
async fn login_with_valid_invite_code() {
    let app = TestApp::new().await;
    let (_user_id, invite_code) = app.create_user("Custodian").await;

    let cookie = app.login(&invite_code).await;
    assert!(cookie.contains('='));

    let resp = app.get("/", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("Custodian"));
}

#[tokio::test]
async fn login_with_invalid_code_shows_error() {
    let app = TestApp::new().await;

    let resp = app
        .post_form("/login", "invite_code=not-a-code", None)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("Invalid invite code"));
}

#[tokio::test]
async fn protected_routes_redirect_to_login() {
    let app = TestApp::new().await;

    for uri in ["/", "/collections", "/archive"] {
        let resp = app.get(uri, None).await;
        assert_redirect(&resp, "/login");
    }
}

#[tokio::test]
async fn logout_clears_session() {
    let app = TestApp::new().await;
    let (_user_id, invite_code) = app.create_user("Custodian").await;
    let cookie = app.login(&invite_code).await;

    let resp = app.post_form("/logout", "", Some(&cookie)).await;
    assert_redirect(&resp, "/login");

    let resp = app.get("/", Some(&cookie)).await;
    assert_redirect(&resp, "/login");
}
