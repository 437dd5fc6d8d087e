use crate::api::projects::ProjectResponse;
use crate::api::{error_response, load_owned_project, success_response, validate_project_id};
use crate::auth::Claims;
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};
use vishub_ai::DryRunEstimate;
use vishub_common::types::{ChangeJobStatus, ChangeSource, Scope, SiteScriptStatus};
use vishub_engine::{matching_fixes, resolve_apply_scopes, validate_scopes};
use vishub_storage::{ChangeJobRow, ChangeLogRow};

/// 变更速率限制窗口（分钟）
const RATE_LIMIT_WINDOW_MINUTES: i64 = 10;

/// autopilot 开关请求
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ToggleAutopilotRequest {
    project_id: String,
    enabled: bool,
    /// 缺省时写入默认安全子集（不含 internalLinks / geoPages）
    #[serde(default)]
    scopes: Option<Vec<String>>,
}

/// autopilot 开关响应
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ToggleAutopilotResponse {
    project: ProjectResponse,
    /// 仅在启用且站点已接入时给出；始终是估算值
    dry_run_results: Option<DryRunEstimate>,
    message: String,
}

/// 开关 autopilot 并持久化作用域集合。
/// 作用域白名单校验失败时整个调用拒绝，不产生任何变更。
#[utoipa::path(
    post,
    path = "/v1/autopilot/toggle",
    tag = "Autopilot",
    security(("bearer_auth" = [])),
    request_body = ToggleAutopilotRequest,
    responses(
        (status = 200, description = "开关已持久化", body = ToggleAutopilotResponse),
        (status = 400, description = "作用域校验失败", body = crate::api::ApiError),
        (status = 401, description = "未认证", body = crate::api::ApiError),
        (status = 404, description = "项目不存在", body = crate::api::ApiError)
    )
)]
async fn toggle_autopilot(
    Extension(trace_id): Extension<TraceId>,
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<ToggleAutopilotRequest>,
) -> impl IntoResponse {
    let project_id = match validate_project_id(&trace_id, &req.project_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    // 校验先于任何存储写入：未知作用域使整个调用失败
    let scopes: Vec<Scope> = match &req.scopes {
        Some(raw) => match validate_scopes(raw) {
            Ok(scopes) => scopes,
            Err(e) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    &trace_id,
                    "validation_error",
                    &format!("scopes: {e}"),
                );
            }
        },
        None => vishub_engine::default_toggle_scopes(),
    };

    let project = match load_owned_project(&state, &trace_id, &project_id, &claims.sub).await {
        Ok(project) => project,
        Err(resp) => return resp,
    };

    let updated = match state
        .store
        .set_autopilot(&project.id, req.enabled, &scopes)
        .await
    {
        Ok(Some(updated)) => updated,
        Ok(None) => {
            return error_response(
                StatusCode::NOT_FOUND,
                &trace_id,
                "not_found",
                "Project not found",
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to persist autopilot toggle");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            );
        }
    };

    // 试运行只在「启用 + 站点已接入」时计算
    let dry_run_results = if req.enabled
        && updated.site_script_status == SiteScriptStatus::Connected
    {
        match state.estimator.estimate(&updated.autopilot_scopes).await {
            Ok(estimate) => Some(estimate),
            Err(e) => {
                tracing::warn!(error = %e, "Dry run estimate failed, returning null");
                None
            }
        }
    } else {
        None
    };

    let message = if req.enabled {
        format!(
            "Autopilot enabled with {} scopes",
            updated.autopilot_scopes.len()
        )
    } else {
        "Autopilot disabled".to_string()
    };

    tracing::info!(
        project_id = %updated.id,
        enabled = req.enabled,
        scope_count = updated.autopilot_scopes.len(),
        "Autopilot toggled"
    );

    success_response(
        StatusCode::OK,
        &trace_id,
        ToggleAutopilotResponse {
            project: ProjectResponse::from(updated),
            dry_run_results,
            message,
        },
    )
}

/// 变更应用请求
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ApplyChangesRequest {
    project_id: String,
    /// 显式作用域优先；缺省回退到项目配置，再回退到内置兜底集合
    #[serde(default)]
    scopes: Option<Vec<String>>,
}

/// 单条已应用修复
#[derive(Serialize, ToSchema)]
struct AppliedFix {
    scope: Scope,
    description: String,
    count: u32,
}

/// 变更应用响应
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ApplyChangesResponse {
    /// 宣称修复的页面元素总数（目录值之和，不做站点回验）
    applied_count: u32,
    job_ids: Vec<String>,
    fixes: Vec<AppliedFix>,
}

/// 应用 autopilot 修复。
///
/// 前置条件按固定顺序检查，先失败者先报：
/// 存在且属于调用方 → autopilot 已启用 → 站点已接入 → 10 分钟窗口内无变更任务。
/// 每个命中的目录条目写一对 ChangeJob / ChangeLog（携带回滚令牌），
/// 跨作用域不保证原子性：部分失败留下有效的部分状态。
#[utoipa::path(
    post,
    path = "/v1/autopilot/apply",
    tag = "Autopilot",
    security(("bearer_auth" = [])),
    request_body = ApplyChangesRequest,
    responses(
        (status = 200, description = "修复已记录", body = ApplyChangesResponse),
        (status = 400, description = "作用域校验失败", body = crate::api::ApiError),
        (status = 401, description = "未认证", body = crate::api::ApiError),
        (status = 403, description = "前置条件不满足", body = crate::api::ApiError),
        (status = 404, description = "项目不存在", body = crate::api::ApiError),
        (status = 429, description = "速率限制", body = crate::api::ApiError)
    )
)]
async fn apply_changes(
    Extension(trace_id): Extension<TraceId>,
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<ApplyChangesRequest>,
) -> impl IntoResponse {
    let project_id = match validate_project_id(&trace_id, &req.project_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let explicit_scopes: Option<Vec<Scope>> = match &req.scopes {
        Some(raw) => match validate_scopes(raw) {
            Ok(scopes) => Some(scopes),
            Err(e) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    &trace_id,
                    "validation_error",
                    &format!("scopes: {e}"),
                );
            }
        },
        None => None,
    };

    // 检查 1：存在且属于调用方
    let project = match load_owned_project(&state, &trace_id, &project_id, &claims.sub).await {
        Ok(project) => project,
        Err(resp) => return resp,
    };

    // 检查 2：autopilot 已启用
    if !project.autopilot_enabled {
        return error_response(
            StatusCode::FORBIDDEN,
            &trace_id,
            "autopilot_disabled",
            "autopilot not enabled",
        );
    }

    // 检查 3：站点脚本已接入
    if project.site_script_status != SiteScriptStatus::Connected {
        return error_response(
            StatusCode::FORBIDDEN,
            &trace_id,
            "site_not_connected",
            "site script not connected",
        );
    }

    // 检查 4：速率限制。读后写，与并发 apply 之间存在竞争窗口，
    // 与源系统行为一致，不加项目级锁。
    let window_start = Utc::now() - Duration::minutes(RATE_LIMIT_WINDOW_MINUTES);
    match state
        .store
        .count_change_jobs_since(&project.id, window_start)
        .await
    {
        Ok(0) => {}
        Ok(_) => {
            return error_response(
                StatusCode::TOO_MANY_REQUESTS,
                &trace_id,
                "rate_limited",
                "Changes were applied recently. Wait 10 minutes between autopilot runs.",
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to check rate limit window");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            );
        }
    }

    let resolved = resolve_apply_scopes(explicit_scopes, &project.autopilot_scopes);
    let now = Utc::now();

    let mut applied_count: u32 = 0;
    let mut job_ids = Vec::new();
    let mut fixes = Vec::new();

    // 按目录顺序逐作用域写入 job + log 对
    for fix in matching_fixes(&resolved) {
        let job_id = uuid::Uuid::new_v4().to_string();
        let rollback_token = vishub_storage::auth::generate_token();
        let pages: Vec<String> = fix.pages.iter().map(|p| p.to_string()).collect();

        let job = ChangeJobRow {
            id: job_id.clone(),
            project_id: project.id.clone(),
            scope: fix.scope,
            description: fix.description.to_string(),
            pages: pages.clone(),
            fix_count: fix.count as i32,
            status: ChangeJobStatus::Applied,
            applied_at: Some(now),
            rollback_token: Some(rollback_token.clone()),
            created_at: now,
        };
        if let Err(e) = state.store.insert_change_job(&job).await {
            tracing::error!(error = %e, scope = %fix.scope, "Failed to record change job");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Failed to record change job",
            );
        }

        let log_entry = ChangeLogRow {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: project.id.clone(),
            scope: fix.scope.as_str().to_string(),
            before: json!({ "status": "needs_fix", "pages": &pages }),
            after: json!({ "status": "fixed", "pages": &pages, "count": fix.count }),
            source: ChangeSource::Autopilot,
            applied_by: claims.username.clone(),
            applied_at: now,
            rollback_token: Some(rollback_token),
            created_at: now,
        };
        if let Err(e) = state.store.insert_change_log(&log_entry).await {
            tracing::error!(error = %e, scope = %fix.scope, "Failed to record change log entry");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Failed to record change log entry",
            );
        }

        applied_count += fix.count;
        job_ids.push(job_id);
        fixes.push(AppliedFix {
            scope: fix.scope,
            description: fix.description.to_string(),
            count: fix.count,
        });
    }

    tracing::info!(
        project_id = %project.id,
        applied_count,
        job_count = job_ids.len(),
        "Autopilot changes applied"
    );

    success_response(
        StatusCode::OK,
        &trace_id,
        ApplyChangesResponse {
            applied_count,
            job_ids,
            fixes,
        },
    )
}

pub fn autopilot_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(toggle_autopilot))
        .routes(routes!(apply_changes))
}
