mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::{
    assert_err_envelope, assert_ok_envelope, build_test_context, create_project, login_and_get_token,
    request_json,
};
use serde_json::json;
use vishub_common::types::{Effort, Impact, Owner, RecommendationStatus};
use vishub_storage::RecommendationRow;

fn stored_recommendation(
    project_id: &str,
    title: &str,
    impact: Impact,
    effort: Effort,
) -> RecommendationRow {
    RecommendationRow {
        id: uuid::Uuid::new_v4().to_string(),
        project_id: project_id.to_string(),
        title: title.to_string(),
        rationale: "seeded by test".to_string(),
        impact,
        effort,
        suggested_owner: Owner::Content,
        action_type: "content_optimization".to_string(),
        links: vec![],
        status: RecommendationStatus::Todo,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn empty_candidates_return_three_defaults_in_fixed_order() {
    let ctx = build_test_context().await.expect("test context should build");
    let token = login_and_get_token(&ctx.app).await;
    let project_id = create_project(&ctx.app, &token, "https://www.acme-tools.com").await;

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/recommendations/top",
        Some(&token),
        Some(json!({"projectId": project_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);

    let recs = body["data"]["recommendations"].as_array().unwrap();
    assert_eq!(recs.len(), 3);
    assert_eq!(recs[0]["title"], "Create location-specific content");
    assert_eq!(recs[1]["title"], "Engage in industry forums");
    assert_eq!(recs[2]["title"], "Monitor competitor mentions");
    // 默认目录补位项没有库存 ID
    for rec in recs {
        assert!(rec["id"].is_null());
        assert_eq!(rec["status"], "todo");
    }
}

#[tokio::test]
async fn top_n_invariant_holds_for_every_valid_limit() {
    let ctx = build_test_context().await.expect("test context should build");
    let token = login_and_get_token(&ctx.app).await;
    let project_id = create_project(&ctx.app, &token, "https://www.acme-tools.com").await;

    // 两条库存候选：不论 limit 是多少，返回恰好 limit 条
    for (title, impact) in [("stored high", Impact::High), ("stored low", Impact::Low)] {
        ctx.state
            .store
            .insert_recommendation(&stored_recommendation(
                &project_id,
                title,
                impact,
                Effort::Low,
            ))
            .await
            .expect("seed should insert");
    }

    for limit in 1..=10u32 {
        let (status, body, _) = request_json(
            &ctx.app,
            "POST",
            "/v1/recommendations/top",
            Some(&token),
            Some(json!({"projectId": project_id, "limit": limit})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let recs = body["data"]["recommendations"].as_array().unwrap();
        assert_eq!(recs.len(), limit as usize, "limit={limit}");
    }
}

#[tokio::test]
async fn limit_outside_range_is_rejected() {
    let ctx = build_test_context().await.expect("test context should build");
    let token = login_and_get_token(&ctx.app).await;
    let project_id = create_project(&ctx.app, &token, "https://www.acme-tools.com").await;

    for bad_limit in [0u32, 11] {
        let (status, body, _) = request_json(
            &ctx.app,
            "POST",
            "/v1/recommendations/top",
            Some(&token),
            Some(json!({"projectId": project_id, "limit": bad_limit})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "limit={bad_limit}");
        assert_err_envelope(&body, 1001);
        assert!(body["err_msg"].as_str().unwrap().contains("limit"));
    }
}

#[tokio::test]
async fn stored_candidates_rank_above_defaults_by_priority() {
    let ctx = build_test_context().await.expect("test context should build");
    let token = login_and_get_token(&ctx.app).await;
    let project_id = create_project(&ctx.app, &token, "https://www.acme-tools.com").await;

    // 插入顺序故意与优先级相反
    ctx.state
        .store
        .insert_recommendation(&stored_recommendation(
            &project_id,
            "low impact high effort",
            Impact::Low,
            Effort::High,
        ))
        .await
        .unwrap();
    ctx.state
        .store
        .insert_recommendation(&stored_recommendation(
            &project_id,
            "high impact low effort",
            Impact::High,
            Effort::Low,
        ))
        .await
        .unwrap();

    let (_, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/recommendations/top",
        Some(&token),
        Some(json!({"projectId": project_id, "limit": 3})),
    )
    .await;

    let recs = body["data"]["recommendations"].as_array().unwrap();
    assert_eq!(recs[0]["title"], "high impact low effort");
    assert_eq!(recs[1]["title"], "low impact high effort");
    // 第三条由默认目录补位
    assert_eq!(recs[2]["title"], "Create location-specific content");
    assert!(recs[0]["id"].is_string());
    assert!(recs[2]["id"].is_null());
}

#[tokio::test]
async fn status_transition_removes_candidate_from_top_list() {
    let ctx = build_test_context().await.expect("test context should build");
    let token = login_and_get_token(&ctx.app).await;
    let project_id = create_project(&ctx.app, &token, "https://www.acme-tools.com").await;

    let row = stored_recommendation(&project_id, "only stored", Impact::High, Effort::Low);
    ctx.state
        .store
        .insert_recommendation(&row)
        .await
        .expect("seed should insert");

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        &format!("/v1/recommendations/{}/status", row.id),
        Some(&token),
        Some(json!({"projectId": project_id, "status": "done"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "done");

    // done 状态不再是候选：top-3 全部来自默认目录
    let (_, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/recommendations/top",
        Some(&token),
        Some(json!({"projectId": project_id})),
    )
    .await;
    let recs = body["data"]["recommendations"].as_array().unwrap();
    assert_eq!(recs.len(), 3);
    for rec in recs {
        assert!(rec["id"].is_null());
    }
}

#[tokio::test]
async fn unknown_recommendation_or_project_yields_not_found() {
    let ctx = build_test_context().await.expect("test context should build");
    let token = login_and_get_token(&ctx.app).await;
    let project_id = create_project(&ctx.app, &token, "https://www.acme-tools.com").await;

    let missing = uuid::Uuid::new_v4().to_string();
    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        &format!("/v1/recommendations/{missing}/status"),
        Some(&token),
        Some(json!({"projectId": project_id, "status": "in_progress"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_err_envelope(&body, 1004);

    let missing_project = uuid::Uuid::new_v4().to_string();
    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/recommendations/top",
        Some(&token),
        Some(json!({"projectId": missing_project})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_err_envelope(&body, 1004);
}
