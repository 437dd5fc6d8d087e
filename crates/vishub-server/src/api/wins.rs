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
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};
use vishub_common::types::Sentiment;
use vishub_storage::TestResultRow;

const DEFAULT_LIMIT: usize = 8;
const MAX_LIMIT: usize = 50;

/// 主窗口：7 天；兜底窗口：14 天，不再继续放宽
const PRIMARY_WINDOW_DAYS: i64 = 7;
const FALLBACK_WINDOW_DAYS: i64 = 14;

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
struct WinsParams {
    /// 项目 ID
    #[serde(rename = "projectId")]
    #[param(required = true, rename = "projectId")]
    project_id: String,
    /// 1..50，默认 8
    #[param(required = false)]
    limit: Option<u32>,
}

/// 一条「win」：被提及且有排名的提示词结果
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct WinResponse {
    id: String,
    prompt: String,
    /// 始终为 true（win 的定义即被提及）
    appears: bool,
    rank: Option<i32>,
    sentiment: Sentiment,
    matched_url: Option<String>,
    company_name: String,
    last_seen: DateTime<Utc>,
}

impl From<TestResultRow> for WinResponse {
    fn from(r: TestResultRow) -> Self {
        Self {
            id: r.id,
            prompt: r.prompt,
            appears: r.mentioned,
            rank: r.rank,
            sentiment: r.sentiment,
            matched_url: r.matched_url,
            company_name: r.company_name,
            last_seen: r.last_seen,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct WinsResponse {
    wins: Vec<WinResponse>,
    total_count: u64,
}

/// 近期 wins 列表，排名升序。
/// 7 天窗口为空时放宽一次到 14 天（新鲜度优先、可用性兜底），不再继续放宽。
#[utoipa::path(
    get,
    path = "/v1/wins",
    tag = "Wins",
    security(("bearer_auth" = [])),
    params(WinsParams),
    responses(
        (status = 200, description = "wins 列表", body = WinsResponse),
        (status = 400, description = "请求参数错误", body = crate::api::ApiError),
        (status = 401, description = "未认证", body = crate::api::ApiError),
        (status = 404, description = "项目不存在", body = crate::api::ApiError)
    )
)]
async fn list_wins(
    Extension(trace_id): Extension<TraceId>,
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Query(params): Query<WinsParams>,
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

    let primary_since = Utc::now() - Duration::days(PRIMARY_WINDOW_DAYS);
    let mut since = primary_since;
    let mut wins = match state.store.list_wins(&project.id, since, limit).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "Failed to query wins");
            return error_response_with_fallback(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
                WinsResponse {
                    wins: vec![],
                    total_count: 0,
                },
            );
        }
    };

    if wins.is_empty() {
        since = Utc::now() - Duration::days(FALLBACK_WINDOW_DAYS);
        wins = match state.store.list_wins(&project.id, since, limit).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(error = %e, "Failed to query wins (fallback window)");
                return error_response_with_fallback(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &trace_id,
                    "storage_error",
                    "Database error",
                    WinsResponse {
                        wins: vec![],
                        total_count: 0,
                    },
                );
            }
        };
    }

    let total_count = match state.store.count_wins(&project.id, since).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to count wins, using page length");
            wins.len() as u64
        }
    };

    success_response(
        StatusCode::OK,
        &trace_id,
        WinsResponse {
            wins: wins.into_iter().map(WinResponse::from).collect(),
            total_count,
        },
    )
}

pub fn wins_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(list_wins))
}
