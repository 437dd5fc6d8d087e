use crate::api::{
    error_response, error_response_with_fallback, load_owned_project, success_response,
    validate_project_id,
};
use crate::auth::Claims;
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};
use vishub_common::types::{Effort, Impact, Owner, RecommendationStatus};
use vishub_engine::{default_catalog, select_top_n, RecommendationTemplate, TopPick};
use vishub_storage::RecommendationRow;

const DEFAULT_LIMIT: usize = 3;
const MAX_LIMIT: usize = 10;

/// Top-N 推荐请求
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct TopRecommendationsRequest {
    project_id: String,
    /// 1..10，默认 3
    #[serde(default)]
    limit: Option<u32>,
}

/// 推荐项
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct RecommendationResponse {
    /// 库存候选有 ID；默认目录补位项没有
    id: Option<String>,
    title: String,
    rationale: String,
    impact: Impact,
    effort: Effort,
    suggested_owner: Owner,
    action_type: String,
    links: Vec<String>,
    status: RecommendationStatus,
}

impl From<RecommendationRow> for RecommendationResponse {
    fn from(r: RecommendationRow) -> Self {
        Self {
            id: Some(r.id),
            title: r.title,
            rationale: r.rationale,
            impact: r.impact,
            effort: r.effort,
            suggested_owner: r.suggested_owner,
            action_type: r.action_type,
            links: r.links,
            status: r.status,
        }
    }
}

impl From<&'static RecommendationTemplate> for RecommendationResponse {
    fn from(t: &'static RecommendationTemplate) -> Self {
        Self {
            id: None,
            title: t.title.to_string(),
            rationale: t.rationale.to_string(),
            impact: t.impact,
            effort: t.effort,
            suggested_owner: t.suggested_owner,
            action_type: t.action_type.to_string(),
            links: vec![],
            status: RecommendationStatus::Todo,
        }
    }
}

#[derive(Serialize, ToSchema)]
struct TopRecommendationsResponse {
    recommendations: Vec<RecommendationResponse>,
}

/// 存储失败时的兜底响应体：默认目录截断到 limit。
fn fallback_recommendations(limit: usize) -> TopRecommendationsResponse {
    TopRecommendationsResponse {
        recommendations: default_catalog()
            .iter()
            .take(limit)
            .map(RecommendationResponse::from)
            .collect(),
    }
}

/// Top-N 推荐列表 — 恒定返回恰好 N 条。
/// 候选不足时按固定顺序用默认目录补齐；
/// 查询失败时返回 500 且响应体带兜底数据（默认目录截断）。
#[utoipa::path(
    post,
    path = "/v1/recommendations/top",
    tag = "Recommendations",
    security(("bearer_auth" = [])),
    request_body = TopRecommendationsRequest,
    responses(
        (status = 200, description = "恰好 N 条推荐", body = TopRecommendationsResponse),
        (status = 400, description = "请求参数错误", body = crate::api::ApiError),
        (status = 401, description = "未认证", body = crate::api::ApiError),
        (status = 404, description = "项目不存在", body = crate::api::ApiError)
    )
)]
async fn top_recommendations(
    Extension(trace_id): Extension<TraceId>,
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<TopRecommendationsRequest>,
) -> impl IntoResponse {
    let limit = match req.limit {
        None => DEFAULT_LIMIT,
        Some(l) if (1..=MAX_LIMIT as u32).contains(&l) => l as usize,
        Some(_) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &trace_id,
                "validation_error",
                &format!("limit: must be between 1 and {MAX_LIMIT}"),
            );
        }
    };

    let project_id = match validate_project_id(&trace_id, &req.project_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let project = match load_owned_project(&state, &trace_id, &project_id, &claims.sub).await {
        Ok(project) => project,
        Err(resp) => return resp,
    };

    let candidates = match state.store.list_todo_recommendations(&project.id).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "Failed to query recommendation candidates");
            return error_response_with_fallback(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
                fallback_recommendations(limit),
            );
        }
    };

    let picks = select_top_n(candidates, limit, |r| (r.impact, r.effort));
    let recommendations = picks
        .into_iter()
        .map(|pick| match pick {
            TopPick::Stored(row) => RecommendationResponse::from(row),
            TopPick::Default(template) => RecommendationResponse::from(template),
        })
        .collect();

    success_response(
        StatusCode::OK,
        &trace_id,
        TopRecommendationsResponse { recommendations },
    )
}

/// 推荐状态流转请求
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct UpdateStatusRequest {
    project_id: String,
    status: RecommendationStatus,
}

/// 推荐项状态流转（todo → in_progress → done）。
#[utoipa::path(
    post,
    path = "/v1/recommendations/{id}/status",
    tag = "Recommendations",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "推荐项 ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "状态已更新", body = RecommendationResponse),
        (status = 401, description = "未认证", body = crate::api::ApiError),
        (status = 404, description = "推荐项不存在", body = crate::api::ApiError)
    )
)]
async fn update_recommendation_status(
    Extension(trace_id): Extension<TraceId>,
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> impl IntoResponse {
    let project_id = match validate_project_id(&trace_id, &req.project_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let project = match load_owned_project(&state, &trace_id, &project_id, &claims.sub).await {
        Ok(project) => project,
        Err(resp) => return resp,
    };

    match state
        .store
        .set_recommendation_status(&id, &project.id, req.status)
        .await
    {
        Ok(Some(updated)) => {
            success_response(StatusCode::OK, &trace_id, RecommendationResponse::from(updated))
        }
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "not_found",
            "Recommendation not found",
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to update recommendation status");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

pub fn recommendation_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(top_recommendations))
        .routes(routes!(update_recommendation_status))
}
