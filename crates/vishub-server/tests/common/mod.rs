#![allow(dead_code)]

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;
use vishub_ai::{RandomEstimator, RandomEvaluator};
use vishub_server::app;
use vishub_server::config::ServerConfig;
use vishub_server::state::AppState;
use vishub_storage::auth::hash_password;
use vishub_storage::HubStore;

pub struct TestContext {
    pub temp_dir: TempDir,
    pub state: AppState,
    pub app: axum::Router,
}

/// 构建测试上下文：临时 SQLite 库 + admin 账号 + 提及概率 1.0 的
/// 伪随机评估器（让健康检查结果可断言）。
pub async fn build_test_context() -> Result<TestContext> {
    let temp_dir = tempfile::tempdir()?;
    let db_url = format!("sqlite://{}/vishub.db?mode=rwc", temp_dir.path().display());
    let store = Arc::new(HubStore::new(&db_url, temp_dir.path()).await?);

    let password_hash = hash_password("changeme")?;
    let _ = store.create_user("admin", &password_hash).await?;

    let state = AppState {
        store,
        evaluator: Arc::new(RandomEvaluator::new(1.0)),
        estimator: Arc::new(RandomEstimator),
        jwt_secret: Arc::new("test-secret".to_string()),
        token_expire_secs: 3600,
        start_time: Utc::now(),
        config: Arc::new(ServerConfig::default()),
    };

    let app = app::build_http_app(state.clone());

    Ok(TestContext {
        temp_dir,
        state,
        app,
    })
}

pub async fn request_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value, Option<String>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder = builder.header("Content-Type", "application/json");

    let req_body = body.unwrap_or(Value::Null).to_string();
    let req = builder
        .body(Body::from(req_body))
        .expect("request should build");

    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");

    let status = resp.status();
    let trace_id = resp
        .headers()
        .get("x-trace-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };

    (status, json, trace_id)
}

pub async fn request_no_body(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
) -> (StatusCode, Value, Option<String>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let req = builder.body(Body::empty()).expect("request should build");

    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");
    let status = resp.status();
    let trace_id = resp
        .headers()
        .get("x-trace-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };

    (status, json, trace_id)
}

pub async fn login_with(app: &axum::Router, username: &str, password: &str) -> String {
    let (status, body, _) = request_json(
        app,
        "POST",
        "/v1/auth/login",
        None,
        Some(json!({"username": username, "password": password})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["err_code"], 0);
    body["data"]["token"]
        .as_str()
        .expect("token should exist")
        .to_string()
}

pub async fn login_and_get_token(app: &axum::Router) -> String {
    login_with(app, "admin", "changeme").await
}

/// 通过 onboarding 接口创建项目，返回项目 ID。
pub async fn create_project(app: &axum::Router, token: &str, site_url: &str) -> String {
    let (status, body, _) = request_json(
        app,
        "POST",
        "/v1/projects",
        Some(token),
        Some(json!({
            "siteUrl": site_url,
            "cmsProvider": "wordpress",
            "industry": "saas",
            "description": "A lightweight project tracker",
            "differentiators": ["fast setup"],
            "competitors": ["Rival One", "Rival Two"]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["err_code"], 0);
    body["data"]["id"]
        .as_str()
        .expect("project id should exist")
        .to_string()
}

pub fn assert_ok_envelope(json: &Value) {
    assert_eq!(json["err_code"], 0);
    assert!(json["err_msg"].is_string());
    assert!(json.get("trace_id").is_some());
}

pub fn assert_err_envelope(json: &Value, err_code: i32) {
    assert_eq!(json["err_code"], err_code);
    assert!(json["err_msg"].is_string());
    assert!(json.get("trace_id").is_some());
}
