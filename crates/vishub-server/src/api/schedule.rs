use crate::api::{error_response, load_owned_project, success_response, validate_project_id};
use crate::auth::Claims;
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};
use vishub_storage::ScheduleFlagRow;

/// 周期任务开关
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ScheduleResponse {
    project_id: String,
    weekly_health_check: bool,
    monthly_competitor_retest: bool,
}

impl From<ScheduleFlagRow> for ScheduleResponse {
    fn from(f: ScheduleFlagRow) -> Self {
        Self {
            project_id: f.project_id,
            weekly_health_check: f.weekly_health_check,
            monthly_competitor_retest: f.monthly_competitor_retest,
        }
    }
}

#[derive(Serialize, ToSchema)]
struct ScheduleEnvelope {
    schedule: ScheduleResponse,
}

/// 周期任务开关 upsert 请求（None 字段保持原值）
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct UpsertScheduleRequest {
    project_id: String,
    #[serde(default)]
    weekly_health_check: Option<bool>,
    #[serde(default)]
    monthly_competitor_retest: Option<bool>,
}

/// 设置周期任务开关（周检 / 月度竞品复测），upsert 语义。
#[utoipa::path(
    post,
    path = "/v1/schedule",
    tag = "Schedule",
    security(("bearer_auth" = [])),
    request_body = UpsertScheduleRequest,
    responses(
        (status = 200, description = "开关已保存", body = ScheduleEnvelope),
        (status = 400, description = "请求参数错误", body = crate::api::ApiError),
        (status = 401, description = "未认证", body = crate::api::ApiError),
        (status = 404, description = "项目不存在", body = crate::api::ApiError)
    )
)]
async fn upsert_schedule(
    Extension(trace_id): Extension<TraceId>,
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<UpsertScheduleRequest>,
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
        .upsert_schedule_flags(
            &project.id,
            req.weekly_health_check,
            req.monthly_competitor_retest,
        )
        .await
    {
        Ok(flags) => {
            tracing::info!(
                project_id = %project.id,
                weekly = flags.weekly_health_check,
                monthly = flags.monthly_competitor_retest,
                "Schedule flags updated"
            );
            success_response(
                StatusCode::OK,
                &trace_id,
                ScheduleEnvelope {
                    schedule: ScheduleResponse::from(flags),
                },
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to upsert schedule flags");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
struct ScheduleParams {
    /// 项目 ID
    #[serde(rename = "projectId")]
    #[param(required = true, rename = "projectId")]
    project_id: String,
}

/// 查询周期任务开关。未配置过的项目返回全 false。
#[utoipa::path(
    get,
    path = "/v1/schedule",
    tag = "Schedule",
    security(("bearer_auth" = [])),
    params(ScheduleParams),
    responses(
        (status = 200, description = "当前开关状态", body = ScheduleEnvelope),
        (status = 401, description = "未认证", body = crate::api::ApiError),
        (status = 404, description = "项目不存在", body = crate::api::ApiError)
    )
)]
async fn get_schedule(
    Extension(trace_id): Extension<TraceId>,
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Query(params): Query<ScheduleParams>,
) -> impl IntoResponse {
    let project_id = match validate_project_id(&trace_id, &params.project_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let project = match load_owned_project(&state, &trace_id, &project_id, &claims.sub).await {
        Ok(project) => project,
        Err(resp) => return resp,
    };

    match state.store.get_schedule_flags(&project.id).await {
        Ok(Some(flags)) => success_response(
            StatusCode::OK,
            &trace_id,
            ScheduleEnvelope {
                schedule: ScheduleResponse::from(flags),
            },
        ),
        Ok(None) => success_response(
            StatusCode::OK,
            &trace_id,
            ScheduleEnvelope {
                schedule: ScheduleResponse {
                    project_id: project.id,
                    weekly_health_check: false,
                    monthly_competitor_retest: false,
                },
            },
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to query schedule flags");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

pub fn schedule_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(upsert_schedule, get_schedule))
}
