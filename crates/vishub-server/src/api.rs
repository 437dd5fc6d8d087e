pub mod autopilot;
pub mod changelog;
pub mod projects;
pub mod recommendations;
pub mod schedule;
pub mod wins;

use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

/// API 错误响应
#[derive(Serialize, ToSchema)]
pub struct ApiError {
    /// 错误码
    pub err_code: i32,
    /// 错误信息
    pub err_msg: String,
    /// 链路追踪 ID（默认空字符串）
    pub trace_id: String,
}

/// API 统一响应包裹
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    /// 错误码（成功时为 0）
    pub err_code: i32,
    /// 错误信息（成功时为 success）
    pub err_msg: String,
    /// 链路追踪 ID（默认空字符串）
    pub trace_id: String,
    /// 业务数据（有数据时返回）
    pub data: Option<T>,
}

pub fn success_response<T>(status: StatusCode, trace_id: &str, data: T) -> Response
where
    T: Serialize,
{
    (
        status,
        Json(ApiResponse {
            err_code: 0,
            err_msg: "success".to_string(),
            trace_id: trace_id.to_string(),
            data: Some(data),
        }),
    )
        .into_response()
}

fn to_custom_error_code(code: &str) -> i32 {
    match code {
        "validation_error" => 1001,
        "unauthorized" => 1002,
        "token_expired" => 1003,
        "not_found" => 1004,
        "conflict" => 1005,
        "autopilot_disabled" => 1301,
        "site_not_connected" => 1302,
        "rate_limited" => 1303,
        "internal_error" => 1500,
        "storage_error" => 1501,
        "evaluator_error" => 1502,
        _ => 1999,
    }
}

pub fn error_response(status: StatusCode, trace_id: &str, code: &str, msg: &str) -> Response {
    (
        status,
        Json(ApiResponse::<Value> {
            err_code: to_custom_error_code(code),
            err_msg: msg.to_string(),
            trace_id: trace_id.to_string(),
            data: None,
        }),
    )
        .into_response()
}

/// 错误响应 + 兜底数据。
/// recommendations / wins / changelog 在存储失败时仍返回可渲染的空数据，
/// 前端在非 2xx 下也能展示「暂无数据」，错误码照常携带。
pub fn error_response_with_fallback<T>(
    status: StatusCode,
    trace_id: &str,
    code: &str,
    msg: &str,
    fallback: T,
) -> Response
where
    T: Serialize,
{
    (
        status,
        Json(ApiResponse {
            err_code: to_custom_error_code(code),
            err_msg: msg.to_string(),
            trace_id: trace_id.to_string(),
            data: Some(fallback),
        }),
    )
        .into_response()
}

/// 健康检查响应
#[derive(Serialize, ToSchema)]
struct HealthResponse {
    /// 服务版本号
    version: String,
    /// 运行时长（秒）
    uptime_secs: i64,
    /// 存储状态
    storage_status: String,
}

/// 获取服务健康状态。无需鉴权。
#[utoipa::path(
    get,
    path = "/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "服务健康状态", body = HealthResponse)
    )
)]
async fn health(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let uptime = (Utc::now() - state.start_time).num_seconds();
    let storage_status = match state.store.count_users().await {
        Ok(_) => "ok".to_string(),
        Err(_) => "degraded".to_string(),
    };
    success_response(
        StatusCode::OK,
        &trace_id,
        HealthResponse {
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: uptime,
            storage_status,
        },
    )
}

/// 校验 projectId 形参必须是合法 UUID（畸形输入 → 400，字段级错误信息）。
pub(crate) fn validate_project_id(trace_id: &str, raw: &str) -> Result<String, Response> {
    match uuid::Uuid::parse_str(raw) {
        Ok(id) => Ok(id.to_string()),
        Err(_) => Err(error_response(
            StatusCode::BAD_REQUEST,
            trace_id,
            "validation_error",
            "projectId: must be a valid UUID",
        )),
    }
}

/// 按所有者加载项目。不存在与不属于当前用户统一返回 404，
/// 避免向非所有者泄露项目存在性。
pub(crate) async fn load_owned_project(
    state: &AppState,
    trace_id: &str,
    project_id: &str,
    user_id: &str,
) -> Result<vishub_storage::ProjectRow, Response> {
    match state.store.get_project_for_user(project_id, user_id).await {
        Ok(Some(project)) => Ok(project),
        Ok(None) => Err(error_response(
            StatusCode::NOT_FOUND,
            trace_id,
            "not_found",
            "Project not found",
        )),
        Err(e) => {
            tracing::error!(error = %e, project_id = %project_id, "Failed to load project");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                trace_id,
                "storage_error",
                "Database error",
            ))
        }
    }
}

pub fn public_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(health))
}

pub fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(crate::auth::login))
}

pub fn protected_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(crate::auth::change_password))
        .merge(projects::project_routes())
        .merge(autopilot::autopilot_routes())
        .merge(recommendations::recommendation_routes())
        .merge(wins::wins_routes())
        .merge(changelog::changelog_routes())
        .merge(schedule::schedule_routes())
        .merge(crate::healthcheck::api::health_check_routes())
}
