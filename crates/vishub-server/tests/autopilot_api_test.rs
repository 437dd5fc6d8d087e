mod common;

use axum::http::StatusCode;
use common::{
    assert_err_envelope, assert_ok_envelope, build_test_context, create_project, login_and_get_token,
    request_json, request_no_body,
};
use serde_json::json;

async fn connect_site(app: &axum::Router, token: &str, project_id: &str) {
    let (status, _, _) = request_json(
        app,
        "POST",
        &format!("/v1/projects/{project_id}/site-script"),
        Some(token),
        Some(json!({"status": "connected"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn toggle_without_scopes_persists_default_safe_subset() {
    let ctx = build_test_context().await.expect("test context should build");
    let token = login_and_get_token(&ctx.app).await;
    let project_id = create_project(&ctx.app, &token, "https://www.acme-tools.com").await;

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/autopilot/toggle",
        Some(&token),
        Some(json!({"projectId": project_id, "enabled": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);

    // 默认安全子集，顺序与内容都固定；不含 internalLinks / geoPages
    assert_eq!(
        body["data"]["project"]["autopilotScopes"],
        json!(["meta", "h1", "altText", "robots", "sitemap"])
    );
    assert_eq!(body["data"]["project"]["autopilotEnabled"], true);
    // 站点未接入：无试运行
    assert!(body["data"]["dryRunResults"].is_null());
}

#[tokio::test]
async fn toggle_rejects_unknown_scope_without_mutation() {
    let ctx = build_test_context().await.expect("test context should build");
    let token = login_and_get_token(&ctx.app).await;
    let project_id = create_project(&ctx.app, &token, "https://www.acme-tools.com").await;

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/autopilot/toggle",
        Some(&token),
        Some(json!({
            "projectId": project_id,
            "enabled": true,
            "scopes": ["meta", "bogus-scope"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1001);
    assert!(body["err_msg"].as_str().unwrap().contains("bogus-scope"));

    // 整个调用拒绝：项目未被改动
    let (_, body, _) = request_no_body(
        &ctx.app,
        "GET",
        &format!("/v1/projects/{project_id}"),
        Some(&token),
    )
    .await;
    assert_eq!(body["data"]["autopilotEnabled"], false);
    assert_eq!(body["data"]["autopilotScopes"], json!([]));
}

#[tokio::test]
async fn toggle_computes_dry_run_only_when_enabled_and_connected() {
    let ctx = build_test_context().await.expect("test context should build");
    let token = login_and_get_token(&ctx.app).await;
    let project_id = create_project(&ctx.app, &token, "https://www.acme-tools.com").await;
    connect_site(&ctx.app, &token, &project_id).await;

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/autopilot/toggle",
        Some(&token),
        Some(json!({
            "projectId": project_id,
            "enabled": true,
            "scopes": ["meta", "h1"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let dry_run = &body["data"]["dryRunResults"];
    assert_eq!(dry_run["canApplyFixes"], true);
    assert_eq!(dry_run["potentialFixes"], 2);
    let estimated = dry_run["estimatedChanges"].as_u64().unwrap();
    assert!((5..=24).contains(&estimated));

    // 关闭时不计算试运行
    let (_, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/autopilot/toggle",
        Some(&token),
        Some(json!({"projectId": project_id, "enabled": false})),
    )
    .await;
    assert!(body["data"]["dryRunResults"].is_null());
    assert_eq!(body["data"]["message"], "Autopilot disabled");
}

#[tokio::test]
async fn apply_preconditions_fail_in_documented_order() {
    let ctx = build_test_context().await.expect("test context should build");
    let token = login_and_get_token(&ctx.app).await;
    let project_id = create_project(&ctx.app, &token, "https://www.acme-tools.com").await;

    // autopilot 未启用且站点未接入：必须先报「autopilot not enabled」
    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/autopilot/apply",
        Some(&token),
        Some(json!({"projectId": project_id})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_err_envelope(&body, 1301);
    assert_eq!(body["err_msg"], "autopilot not enabled");

    // 启用后站点仍未接入：报「site script not connected」
    let (_, _, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/autopilot/toggle",
        Some(&token),
        Some(json!({"projectId": project_id, "enabled": true})),
    )
    .await;
    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/autopilot/apply",
        Some(&token),
        Some(json!({"projectId": project_id})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_err_envelope(&body, 1302);
    assert_eq!(body["err_msg"], "site script not connected");
}

#[tokio::test]
async fn full_apply_cycle_records_jobs_log_and_rate_limit() {
    let ctx = build_test_context().await.expect("test context should build");
    let token = login_and_get_token(&ctx.app).await;
    let project_id = create_project(&ctx.app, &token, "https://www.acme-tools.com").await;
    connect_site(&ctx.app, &token, &project_id).await;
    let (_, _, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/autopilot/toggle",
        Some(&token),
        Some(json!({"projectId": project_id, "enabled": true})),
    )
    .await;

    // meta(3 pages) + h1(2 pages) → appliedCount 5, 两个 job
    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/autopilot/apply",
        Some(&token),
        Some(json!({"projectId": project_id, "scopes": ["meta", "h1"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);
    assert_eq!(body["data"]["appliedCount"], 5);
    assert_eq!(body["data"]["jobIds"].as_array().unwrap().len(), 2);
    let fixes = body["data"]["fixes"].as_array().unwrap();
    assert_eq!(fixes.len(), 2);
    assert_eq!(fixes[0]["scope"], "meta");
    assert_eq!(fixes[0]["count"], 3);
    assert_eq!(fixes[1]["scope"], "h1");
    assert_eq!(fixes[1]["count"], 2);

    // 审计记录成对出现，均可回滚
    let (status, body, _) = request_no_body(
        &ctx.app,
        "GET",
        &format!("/v1/changelog?projectId={project_id}"),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let entries = body["data"]["changelog"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    for entry in entries {
        assert_eq!(entry["canRollback"], true);
        assert_eq!(entry["source"], "autopilot");
        assert_eq!(entry["appliedBy"], "admin");
    }
    assert_eq!(body["data"]["totalCount"], 2);

    // 10 分钟窗口内第二次 apply：429，且不产生新任务
    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/autopilot/apply",
        Some(&token),
        Some(json!({"projectId": project_id, "scopes": ["meta"]})),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_err_envelope(&body, 1303);
    assert!(body["err_msg"].as_str().unwrap().contains("10 minutes"));

    let (_, body, _) = request_no_body(
        &ctx.app,
        "GET",
        &format!("/v1/changelog?projectId={project_id}"),
        Some(&token),
    )
    .await;
    assert_eq!(body["data"]["totalCount"], 2);
}

#[tokio::test]
async fn apply_falls_back_to_project_scopes_then_builtin_set() {
    let ctx = build_test_context().await.expect("test context should build");
    let token = login_and_get_token(&ctx.app).await;
    let project_id = create_project(&ctx.app, &token, "https://www.acme-tools.com").await;
    connect_site(&ctx.app, &token, &project_id).await;

    // 项目配置只有 altText
    let (_, _, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/autopilot/toggle",
        Some(&token),
        Some(json!({
            "projectId": project_id,
            "enabled": true,
            "scopes": ["altText"]
        })),
    )
    .await;

    // apply 未传 scopes：回退到项目配置
    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/autopilot/apply",
        Some(&token),
        Some(json!({"projectId": project_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["appliedCount"], 12);
    let fixes = body["data"]["fixes"].as_array().unwrap();
    assert_eq!(fixes.len(), 1);
    assert_eq!(fixes[0]["scope"], "altText");
}
