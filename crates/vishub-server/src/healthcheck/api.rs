use crate::api::{load_owned_project, success_response, validate_project_id};
use crate::auth::Claims;
use crate::healthcheck::runner::{self, HealthCheckOutcome};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

/// 健康检查请求
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct RunHealthCheckRequest {
    project_id: String,
}

/// 健康检查结果摘要
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct HealthCheckResults {
    prompts_analyzed: u32,
    mentions_found: u32,
    recommendations_generated: u32,
}

/// 健康检查响应
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct RunHealthCheckResponse {
    job_id: String,
    /// completed：同步完成；queued：处理阶段失败，转后台完成语义
    status: String,
    message: String,
    results: Option<HealthCheckResults>,
}

/// 对项目执行一轮健康检查（5 条买家意图提示词 + 推荐种子）。
/// 所有权校验失败是致命错误；处理阶段的失败不向调用方抛错，
/// 而是返回 queued 状态。
#[utoipa::path(
    post,
    path = "/v1/health-check/run",
    tag = "HealthCheck",
    security(("bearer_auth" = [])),
    request_body = RunHealthCheckRequest,
    responses(
        (status = 200, description = "检查完成或已排队", body = RunHealthCheckResponse),
        (status = 400, description = "请求参数错误", body = crate::api::ApiError),
        (status = 401, description = "未认证", body = crate::api::ApiError),
        (status = 404, description = "项目不存在", body = crate::api::ApiError)
    )
)]
async fn run_health_check(
    Extension(trace_id): Extension<TraceId>,
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<RunHealthCheckRequest>,
) -> impl IntoResponse {
    let project_id = match validate_project_id(&trace_id, &req.project_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let project = match load_owned_project(&state, &trace_id, &project_id, &claims.sub).await {
        Ok(project) => project,
        Err(resp) => return resp,
    };

    let job_id = uuid::Uuid::new_v4().to_string();
    let outcome =
        runner::run_health_check(&state.store, state.evaluator.as_ref(), &project).await;

    let response = match outcome {
        HealthCheckOutcome::Completed(summary) => RunHealthCheckResponse {
            job_id,
            status: "completed".to_string(),
            message: format!(
                "Analyzed {} prompts, found {} mentions",
                summary.prompts_analyzed, summary.mentions_found
            ),
            results: Some(HealthCheckResults {
                prompts_analyzed: summary.prompts_analyzed,
                mentions_found: summary.mentions_found,
                recommendations_generated: summary.recommendations_generated,
            }),
        },
        HealthCheckOutcome::Queued => RunHealthCheckResponse {
            job_id,
            status: "queued".to_string(),
            message: "Health check queued for background completion".to_string(),
            results: None,
        },
    };

    success_response(StatusCode::OK, &trace_id, response)
}

pub fn health_check_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(run_health_check))
}
