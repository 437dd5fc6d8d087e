mod common;

use axum::http::StatusCode;
use common::{
    assert_err_envelope, assert_ok_envelope, build_test_context, create_project, login_and_get_token,
    request_json, request_no_body,
};
use serde_json::json;

#[tokio::test]
async fn health_check_completes_with_summary() {
    let ctx = build_test_context().await.expect("test context should build");
    let token = login_and_get_token(&ctx.app).await;
    let project_id = create_project(&ctx.app, &token, "https://www.acme-tools.com").await;

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/health-check/run",
        Some(&token),
        Some(json!({"projectId": project_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);

    assert_eq!(body["data"]["status"], "completed");
    assert!(body["data"]["jobId"].is_string());

    let results = &body["data"]["results"];
    assert_eq!(results["promptsAnalyzed"], 5);
    // 测试评估器的提及概率为 1.0：每条提示词都命中
    assert_eq!(results["mentionsFound"], 5);
    assert_eq!(results["recommendationsGenerated"], 3);
}

#[tokio::test]
async fn health_check_seeds_become_top_recommendations() {
    let ctx = build_test_context().await.expect("test context should build");
    let token = login_and_get_token(&ctx.app).await;
    let project_id = create_project(&ctx.app, &token, "https://www.acme-tools.com").await;

    let (_, _, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/health-check/run",
        Some(&token),
        Some(json!({"projectId": project_id})),
    )
    .await;

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/recommendations/top",
        Some(&token),
        Some(json!({"projectId": project_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let recs = body["data"]["recommendations"].as_array().unwrap();
    assert_eq!(recs.len(), 3);
    // 全部来自库存种子（有 ID），排序为 impact 降序、effort 升序
    for rec in recs {
        assert!(rec["id"].is_string());
    }
    assert_eq!(
        recs[0]["title"],
        "Create an FAQ page answering buyer questions"
    );
    assert_eq!(recs[1]["title"], "Optimize your content for AI search");
    assert_eq!(recs[2]["title"], "Add structured data markup");
}

#[tokio::test]
async fn health_check_results_surface_as_wins() {
    let ctx = build_test_context().await.expect("test context should build");
    let token = login_and_get_token(&ctx.app).await;
    let project_id = create_project(&ctx.app, &token, "https://www.acme-tools.com").await;

    let (_, _, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/health-check/run",
        Some(&token),
        Some(json!({"projectId": project_id})),
    )
    .await;

    let (status, body, _) = request_no_body(
        &ctx.app,
        "GET",
        &format!("/v1/wins?projectId={project_id}"),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let wins = body["data"]["wins"].as_array().unwrap();
    assert_eq!(wins.len(), 5);
    let mut previous_rank = 0i64;
    for win in wins {
        assert_eq!(win["appears"], true);
        let rank = win["rank"].as_i64().unwrap();
        assert!((1..=10).contains(&rank));
        // 排名升序
        assert!(rank >= previous_rank);
        previous_rank = rank;
        assert_eq!(win["companyName"], "acme tools");
    }
    assert_eq!(body["data"]["totalCount"], 5);
}

#[tokio::test]
async fn health_check_validates_project_id_and_ownership() {
    let ctx = build_test_context().await.expect("test context should build");
    let token = login_and_get_token(&ctx.app).await;

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/health-check/run",
        Some(&token),
        Some(json!({"projectId": "not-a-uuid"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1001);

    let missing = uuid::Uuid::new_v4().to_string();
    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/health-check/run",
        Some(&token),
        Some(json!({"projectId": missing})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_err_envelope(&body, 1004);
}
