mod common;

use axum::http::StatusCode;
use common::{
    assert_err_envelope, assert_ok_envelope, build_test_context, create_project, login_and_get_token,
    login_with, request_json, request_no_body,
};
use serde_json::json;
use vishub_storage::auth::hash_password;

#[tokio::test]
async fn create_project_returns_onboarding_defaults() {
    let ctx = build_test_context().await.expect("test context should build");
    let token = login_and_get_token(&ctx.app).await;

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/projects",
        Some(&token),
        Some(json!({
            "siteUrl": "https://www.acme-tools.com",
            "cmsProvider": "wordpress",
            "industry": "hardware retail",
            "competitors": ["Toolify"],
            "cmsCredentials": "{\"apiKey\":\"wp_live_abc\"}"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);

    let project = &body["data"];
    assert_eq!(project["siteUrl"], "https://www.acme-tools.com");
    assert_eq!(project["autopilotEnabled"], false);
    assert_eq!(project["autopilotScopes"], json!([]));
    assert_eq!(project["siteScriptStatus"], "missing");
    assert_eq!(project["hasCmsCredentials"], true);
    assert_eq!(project["competitors"], json!(["Toolify"]));
}

#[tokio::test]
async fn create_project_rejects_invalid_url() {
    let ctx = build_test_context().await.expect("test context should build");
    let token = login_and_get_token(&ctx.app).await;

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/projects",
        Some(&token),
        Some(json!({"siteUrl": "not a url"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1001);
    assert!(body["err_msg"].as_str().unwrap().contains("siteUrl"));
}

#[tokio::test]
async fn ownership_is_not_leaked_across_users() {
    let ctx = build_test_context().await.expect("test context should build");
    let token = login_and_get_token(&ctx.app).await;
    let project_id = create_project(&ctx.app, &token, "https://www.acme-tools.com").await;

    // 所有者可见
    let (status, body, _) = request_no_body(
        &ctx.app,
        "GET",
        &format!("/v1/projects/{project_id}"),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);

    // 其他用户拿到的是 404，而不是 403 — 不泄露项目存在性
    let hash = hash_password("other-pass").unwrap();
    ctx.state
        .store
        .create_user("other", &hash)
        .await
        .expect("second user should create");
    let other_token = login_with(&ctx.app, "other", "other-pass").await;

    let (status, body, _) = request_no_body(
        &ctx.app,
        "GET",
        &format!("/v1/projects/{project_id}"),
        Some(&other_token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_err_envelope(&body, 1004);
}

#[tokio::test]
async fn site_script_flow_flips_status() {
    let ctx = build_test_context().await.expect("test context should build");
    let token = login_and_get_token(&ctx.app).await;
    let project_id = create_project(&ctx.app, &token, "https://www.acme-tools.com").await;

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        &format!("/v1/projects/{project_id}/site-script"),
        Some(&token),
        Some(json!({"status": "connected"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["siteScriptStatus"], "connected");

    let (_, body, _) = request_no_body(
        &ctx.app,
        "GET",
        &format!("/v1/projects/{project_id}"),
        Some(&token),
    )
    .await;
    assert_eq!(body["data"]["siteScriptStatus"], "connected");
}

#[tokio::test]
async fn schedule_flags_upsert_and_read_back() {
    let ctx = build_test_context().await.expect("test context should build");
    let token = login_and_get_token(&ctx.app).await;
    let project_id = create_project(&ctx.app, &token, "https://www.acme-tools.com").await;

    // 未配置过时返回全 false
    let (status, body, _) = request_no_body(
        &ctx.app,
        "GET",
        &format!("/v1/schedule?projectId={project_id}"),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["schedule"]["weeklyHealthCheck"], false);
    assert_eq!(body["data"]["schedule"]["monthlyCompetitorRetest"], false);

    // 只开 weekly，monthly 保持 false
    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/schedule",
        Some(&token),
        Some(json!({"projectId": project_id, "weeklyHealthCheck": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["schedule"]["weeklyHealthCheck"], true);
    assert_eq!(body["data"]["schedule"]["monthlyCompetitorRetest"], false);

    // 再开 monthly，weekly 保持 true
    let (_, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/schedule",
        Some(&token),
        Some(json!({"projectId": project_id, "monthlyCompetitorRetest": true})),
    )
    .await;
    assert_eq!(body["data"]["schedule"]["weeklyHealthCheck"], true);
    assert_eq!(body["data"]["schedule"]["monthlyCompetitorRetest"], true);
}
