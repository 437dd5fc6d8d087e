mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{
    assert_err_envelope, build_test_context, create_project, login_and_get_token, request_no_body,
};
use vishub_common::types::{ChangeSource, Sentiment};
use vishub_storage::{ChangeLogRow, TestResultRow};

fn result_row(project_id: &str, rank: Option<i32>, days_ago: i64) -> TestResultRow {
    let seen = Utc::now() - Duration::days(days_ago);
    TestResultRow {
        id: uuid::Uuid::new_v4().to_string(),
        project_id: project_id.to_string(),
        company_name: "acme tools".to_string(),
        prompt: "best tools for small teams".to_string(),
        mentioned: rank.is_some(),
        rank,
        sentiment: Sentiment::Positive,
        matched_url: None,
        last_seen: seen,
        created_at: seen,
    }
}

fn log_row(
    project_id: &str,
    scope: &str,
    count: u64,
    rollback_token: Option<String>,
    minutes_ago: i64,
) -> ChangeLogRow {
    ChangeLogRow {
        id: uuid::Uuid::new_v4().to_string(),
        project_id: project_id.to_string(),
        scope: scope.to_string(),
        before: serde_json::json!({"status": "needs_fix"}),
        after: serde_json::json!({"status": "fixed", "count": count}),
        source: ChangeSource::Autopilot,
        applied_by: "admin".to_string(),
        applied_at: Utc::now() - Duration::minutes(minutes_ago),
        rollback_token,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn wins_widen_to_fourteen_days_when_primary_window_is_empty() {
    let ctx = build_test_context().await.expect("test context should build");
    let token = login_and_get_token(&ctx.app).await;
    let project_id = create_project(&ctx.app, &token, "https://www.acme-tools.com").await;

    // 7 天内没有结果，10 天前有一条被提及且有排名的
    ctx.state
        .store
        .insert_test_result(&result_row(&project_id, Some(3), 10))
        .await
        .expect("seed should insert");

    let (status, body, _) = request_no_body(
        &ctx.app,
        "GET",
        &format!("/v1/wins?projectId={project_id}"),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let wins = body["data"]["wins"].as_array().unwrap();
    assert_eq!(wins.len(), 1);
    assert_eq!(wins[0]["rank"], 3);
    assert_eq!(body["data"]["totalCount"], 1);
}

#[tokio::test]
async fn wins_do_not_widen_past_fourteen_days() {
    let ctx = build_test_context().await.expect("test context should build");
    let token = login_and_get_token(&ctx.app).await;
    let project_id = create_project(&ctx.app, &token, "https://www.acme-tools.com").await;

    // 只有 20 天前的结果：两级窗口都为空，返回空数组
    ctx.state
        .store
        .insert_test_result(&result_row(&project_id, Some(1), 20))
        .await
        .expect("seed should insert");

    let (status, body, _) = request_no_body(
        &ctx.app,
        "GET",
        &format!("/v1/wins?projectId={project_id}"),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["wins"].as_array().unwrap().len(), 0);
    assert_eq!(body["data"]["totalCount"], 0);
}

#[tokio::test]
async fn wins_exclude_unranked_and_unmentioned_rows() {
    let ctx = build_test_context().await.expect("test context should build");
    let token = login_and_get_token(&ctx.app).await;
    let project_id = create_project(&ctx.app, &token, "https://www.acme-tools.com").await;

    ctx.state
        .store
        .insert_test_result(&result_row(&project_id, None, 1))
        .await
        .expect("seed should insert");
    ctx.state
        .store
        .insert_test_result(&result_row(&project_id, Some(2), 1))
        .await
        .expect("seed should insert");

    let (_, body, _) = request_no_body(
        &ctx.app,
        "GET",
        &format!("/v1/wins?projectId={project_id}"),
        Some(&token),
    )
    .await;
    let wins = body["data"]["wins"].as_array().unwrap();
    assert_eq!(wins.len(), 1);
    assert_eq!(wins[0]["rank"], 2);
}

#[tokio::test]
async fn changelog_renders_descriptions_from_scope_templates() {
    let ctx = build_test_context().await.expect("test context should build");
    let token = login_and_get_token(&ctx.app).await;
    let project_id = create_project(&ctx.app, &token, "https://www.acme-tools.com").await;

    let token_value = vishub_storage::auth::generate_token();
    ctx.state
        .store
        .insert_change_log(&log_row(&project_id, "robots", 0, None, 30))
        .await
        .expect("seed should insert");
    ctx.state
        .store
        .insert_change_log(&log_row(
            &project_id,
            "unknown-scope",
            4,
            Some(token_value),
            10,
        ))
        .await
        .expect("seed should insert");

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

    // applied_at 倒序：最近的 unknown-scope 在前
    assert_eq!(entries[0]["scope"], "unknown-scope");
    assert_eq!(entries[0]["description"], "Applied unknown-scope fixes");
    assert_eq!(entries[0]["canRollback"], true);

    assert_eq!(entries[1]["scope"], "robots");
    assert_eq!(
        entries[1]["description"],
        "Updated robots.txt configuration"
    );
    // 没有回滚令牌 ⟺ 不可回滚
    assert_eq!(entries[1]["canRollback"], false);
}

#[tokio::test]
async fn list_limits_are_validated_per_endpoint() {
    let ctx = build_test_context().await.expect("test context should build");
    let token = login_and_get_token(&ctx.app).await;
    let project_id = create_project(&ctx.app, &token, "https://www.acme-tools.com").await;

    let (status, body, _) = request_no_body(
        &ctx.app,
        "GET",
        &format!("/v1/wins?projectId={project_id}&limit=51"),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1001);

    let (status, body, _) = request_no_body(
        &ctx.app,
        "GET",
        &format!("/v1/changelog?projectId={project_id}&limit=101"),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1001);
}
