use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use clap::Parser;
use httpmock::prelude::*;
use serde_json::{json, Value};
use tower::ServiceExt;
use weather_sync::auth::mailer::SEND_PATH;
use weather_sync::auth::users::UserStore;
use weather_sync::auth::{build_router, AuthState};
use weather_sync::AuthConfig;

async fn auth_app(extra_args: &[&str]) -> (Router, AuthState) {
    let mut args = vec!["auth-service", "--jwt-secret", "test-secret"];
    args.extend_from_slice(extra_args);
    let config = AuthConfig::try_parse_from(args).unwrap();

    let users = UserStore::in_memory().await.unwrap();
    users.seed("operator", "river-2025", true).await.unwrap();
    users.seed("retired_op", "river-2025", false).await.unwrap();

    let state = AuthState::new(users, &config).unwrap();
    (build_router(state.clone(), None), state)
}

async fn post(router: &Router, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn login(router: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    post(
        router,
        "/login",
        json!({"username": username, "password": password}),
        None,
    )
    .await
}

#[tokio::test]
async fn test_login_success_issues_bearer_token() {
    let (router, state) = auth_app(&[]).await;

    let (status, body) = login(&router, "operator", "river-2025").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["expires_in"], 1800);
    let claims = state
        .tokens
        .verify(body["access_token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.sub, "operator");
}

#[tokio::test]
async fn test_login_wrong_password_is_unauthorized() {
    let (router, _) = auth_app(&[]).await;

    let (status, body) = login(&router, "operator", "wrong").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "error");
    assert!(body.get("access_token").is_none());
}

#[tokio::test]
async fn test_login_inactive_user_is_forbidden() {
    let (router, _) = auth_app(&[]).await;

    let (status, body) = login(&router, "retired_op", "river-2025").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.get("access_token").is_none());
}

#[tokio::test]
async fn test_login_unknown_user_is_not_found() {
    let (router, _) = auth_app(&[]).await;
    let (status, _) = login(&router, "ghost_user", "river-2025").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_rejects_malformed_username() {
    let (router, _) = auth_app(&[]).await;

    let (status, _) = login(&router, "op", "river-2025").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = login(&router, "x' OR '1'='1", "river-2025").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(&router, "/login", json!({"username": "operator"}), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_flood_report_requires_token() {
    let (router, _) = auth_app(&[]).await;
    let report = json!({"location": "Puente Sur", "description": "River over the bank"});

    let (status, _) = post(&router, "/flood-report", report.clone(), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = post(&router, "/flood-report", report, Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_flood_report_missing_mail_config_fails_before_delivery() {
    let sendgrid = MockServer::start();
    let send_mock = sendgrid.mock(|when, then| {
        when.method(POST).path(SEND_PATH);
        then.status(202);
    });
    let base_url = sendgrid.base_url();
    let (router, state) = auth_app(&["--sendgrid-base-url", &base_url, "--mail-from", "noreply@example.org"]).await;
    let token = state.tokens.issue("operator").unwrap();

    let (status, body) = post(
        &router,
        "/flood-report",
        json!({"location": "Puente Sur", "description": "River over the bank"}),
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    send_mock.assert_hits(0);
}

#[tokio::test]
async fn test_flood_report_is_emailed() {
    let sendgrid = MockServer::start();
    let send_mock = sendgrid.mock(|when, then| {
        when.method(POST)
            .path(SEND_PATH)
            .header("Authorization", "Bearer sg-key")
            .body_contains("alerts@example.org")
            .body_contains("Flood report submitted by operator")
            .body_contains("Puente Sur");
        then.status(202);
    });
    let base_url = sendgrid.base_url();
    let (router, state) = auth_app(&[
        "--sendgrid-base-url",
        &base_url,
        "--sendgrid-api-key",
        "sg-key",
        "--mail-from",
        "noreply@example.org",
        "--flood-report-recipient",
        "alerts@example.org",
    ])
    .await;
    let token = state.tokens.issue("operator").unwrap();

    let (status, body) = post(
        &router,
        "/flood-report",
        json!({
            "location": "Puente Sur",
            "description": "River over the bank",
            "latitude": 4.6,
            "longitude": -74.08
        }),
        Some(&token),
    )
    .await;

    send_mock.assert();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reported_by"], "operator");
}

#[tokio::test]
async fn test_flood_report_provider_rejection_is_server_error() {
    let sendgrid = MockServer::start();
    sendgrid.mock(|when, then| {
        when.method(POST).path(SEND_PATH);
        then.status(403).json_body(json!({"errors": [{"message": "forbidden"}]}));
    });
    let base_url = sendgrid.base_url();
    let (router, state) = auth_app(&[
        "--sendgrid-base-url",
        &base_url,
        "--sendgrid-api-key",
        "sg-key",
        "--mail-from",
        "noreply@example.org",
        "--flood-report-recipient",
        "alerts@example.org",
    ])
    .await;
    let token = state.tokens.issue("operator").unwrap();

    let (status, _) = post(
        &router,
        "/flood-report",
        json!({"location": "Puente Sur", "description": "River over the bank"}),
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
