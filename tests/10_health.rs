mod common;

use anyhow::Result;
use axum::http::Method;
use reqwest::StatusCode;
use salesdesk_api::testing::FailPoint;
use serde_json::Value;

#[tokio::test]
async fn spawned_server_answers_public_routes() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let root = client.get(format!("{}/", server.base_url)).send().await?;
    assert_eq!(root.status(), StatusCode::OK);
    let body = root.json::<Value>().await?;
    assert!(body["message"].as_str().unwrap_or_default().starts_with("Hello"));

    let info = client
        .get(format!("{}/semiconductor-info", server.base_url))
        .send()
        .await?;
    assert_eq!(info.status(), StatusCode::OK);
    let body = info.json::<Value>().await?;
    assert!(body["text"].as_str().unwrap_or_default().contains("Semiconductors"));

    Ok(())
}

#[tokio::test]
async fn spawned_server_reports_unreachable_platform() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/health", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "degraded");
    assert!(body.get("platform_error").is_some(), "body: {}", body);

    Ok(())
}

#[tokio::test]
async fn spawned_server_rejects_missing_credentials() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/visits", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "UNAUTHORIZED");

    Ok(())
}

#[tokio::test]
async fn health_reflects_platform_state() {
    let app = common::TestApp::new();

    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(body["status"], "ok");

    app.platform.fail(FailPoint::Health, 503, "maintenance").await;
    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, axum::http::StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["platform_error"].as_str().unwrap().contains("maintenance"));
}

#[tokio::test]
async fn me_returns_resolved_user_without_password() {
    let app = common::TestApp::new();
    let token = app.login_as("u-1", "rep@example.com").await;

    let (status, body) = app.request(Method::GET, "/me", Some(&token), None).await;
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["id"], "u-1");
    assert_eq!(body["data"]["email"], "rep@example.com");
    assert!(body["data"].get("password").is_none());
}
