use crate::api::{
    error_response, error_response_with_fallback, load_owned_project, success_response,
    validate_project_id,
};
use crate::auth::Claims;
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};
use vishub_common::types::ChangeSource;
use vishub_engine::describe_change;
use vishub_storage::ChangeLogRow;

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 100;

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
struct ChangelogParams {
    /// 项目 ID
    #[serde(rename = "projectId")]
    #[param(required = true, rename = "projectId")]
    project_id: String,
    /// 1..100，默认 50
    #[param(required = false)]
    limit: Option<u32>,
}

/// 一条变更审计记录
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ChangelogEntryResponse {
    id: String,
    scope: String,
    /// 按固定模板渲染的人类可读描述
    description: String,
    source: ChangeSource,
    applied_by: String,
    applied_at: DateTime<Utc>,
    /// 回滚令牌存在 ⟺ 变更可回滚
    can_rollback: bool,
    before: serde_json::Value,
    after: serde_json::Value,
}

impl From<ChangeLogRow> for ChangelogEntryResponse {
    fn from(e: ChangeLogRow) -> Self {
        let count = e
            .after
            .get("count")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        Self {
            description: describe_change(&e.scope, count),
            id: e.id,
            scope: e.scope,
            source: e.source,
            applied_by: e.applied_by,
            applied_at: e.applied_at,
            can_rollback: e.rollback_token.is_some(),
            before: e.before,
            after: e.after,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ChangelogResponse {
    changelog: Vec<ChangelogEntryResponse>,
    total_count: u64,
}

/// 变更审计记录，applied_at 倒序。
/// 存储失败时返回 500 且响应体带空兜底数据。
#[utoipa::path(
    get,
    path = "/v1/changelog",
    tag = "Changelog",
    security(("bearer_auth" = [])),
    params(ChangelogParams),
    responses(
        (status = 200, description = "变更审计列表", body = ChangelogResponse),
        (status = 400, description = "请求参数错误", body = crate::api::ApiError),
        (status = 401, description = "未认证", body = crate::api::ApiError),
        (status = 404, description = "项目不存在", body = crate::api::ApiError)
    )
)]
async fn list_changelog(
    Extension(trace_id): Extension<TraceId>,
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Query(params): Query<ChangelogParams>,
) -> impl IntoResponse {
    let limit = match params.limit {
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

    let project_id = match validate_project_id(&trace_id, &params.project_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let project = match load_owned_project(&state, &trace_id, &project_id, &claims.sub).await {
        Ok(project) => project,
        Err(resp) => return resp,
    };

    let entries = match state.store.list_change_log(&project.id, limit).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "Failed to query changelog");
            return error_response_with_fallback(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
                ChangelogResponse {
                    changelog: vec![],
                    total_count: 0,
                },
            );
        }
    };

    let total_count = match state.store.count_change_log(&project.id).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to count changelog, using page length");
            entries.len() as u64
        }
    };

    success_response(
        StatusCode::OK,
        &trace_id,
        ChangelogResponse {
            changelog: entries
                .into_iter()
                .map(ChangelogEntryResponse::from)
                .collect(),
            total_count,
        },
    )
}

pub fn changelog_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(list_changelog))
}
