use crate::api::{error_response, load_owned_project, success_response, validate_project_id};
use crate::auth::Claims;
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};
use vishub_common::types::{Scope, SiteScriptStatus};
use vishub_storage::{NewProject, ProjectRow};

/// 项目信息
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    /// 项目唯一标识
    pub id: String,
    /// 站点 URL
    pub site_url: String,
    /// CMS 提供商
    pub cms_provider: Option<String>,
    /// 所属行业
    pub industry: Option<String>,
    /// 公司一句话描述
    pub description: Option<String>,
    /// 差异化卖点
    pub differentiators: Vec<String>,
    /// 竞品名单
    pub competitors: Vec<String>,
    /// autopilot 开关
    pub autopilot_enabled: bool,
    /// autopilot 作用域集合
    pub autopilot_scopes: Vec<Scope>,
    /// 站点脚本接入状态
    pub site_script_status: SiteScriptStatus,
    /// 是否已配置 CMS 凭据
    pub has_cms_credentials: bool,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 更新时间
    pub updated_at: DateTime<Utc>,
}

impl From<ProjectRow> for ProjectResponse {
    fn from(p: ProjectRow) -> Self {
        Self {
            id: p.id,
            site_url: p.site_url,
            cms_provider: p.cms_provider,
            industry: p.industry,
            description: p.description,
            differentiators: p.differentiators,
            competitors: p.competitors,
            autopilot_enabled: p.autopilot_enabled,
            autopilot_scopes: p.autopilot_scopes,
            site_script_status: p.site_script_status,
            has_cms_credentials: p.has_cms_credentials,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// 创建项目请求（onboarding）
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct CreateProjectRequest {
    site_url: String,
    #[serde(default)]
    cms_provider: Option<String>,
    #[serde(default)]
    industry: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    differentiators: Vec<String>,
    #[serde(default)]
    competitors: Vec<String>,
    /// CMS 凭据（加密落盘，响应中不回显）
    #[serde(default)]
    cms_credentials: Option<String>,
}

/// 创建项目（onboarding 入口）。
#[utoipa::path(
    post,
    path = "/v1/projects",
    tag = "Projects",
    security(("bearer_auth" = [])),
    request_body = CreateProjectRequest,
    responses(
        (status = 200, description = "项目已创建", body = ProjectResponse),
        (status = 400, description = "请求参数错误", body = crate::api::ApiError),
        (status = 401, description = "未认证", body = crate::api::ApiError)
    )
)]
async fn create_project(
    Extension(trace_id): Extension<TraceId>,
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<CreateProjectRequest>,
) -> impl IntoResponse {
    if url::Url::parse(&req.site_url).is_err() {
        return error_response(
            StatusCode::BAD_REQUEST,
            &trace_id,
            "validation_error",
            "siteUrl: must be a valid URL",
        );
    }

    let new_project = NewProject {
        user_id: claims.sub.clone(),
        site_url: req.site_url,
        cms_provider: req.cms_provider,
        industry: req.industry,
        description: req.description,
        differentiators: req.differentiators,
        competitors: req.competitors,
        cms_credentials: req.cms_credentials,
    };

    match state.store.insert_project(&new_project).await {
        Ok(project) => {
            tracing::info!(project_id = %project.id, user_id = %claims.sub, "Project created");
            success_response(StatusCode::OK, &trace_id, ProjectResponse::from(project))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create project");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// 当前用户的项目列表。
#[utoipa::path(
    get,
    path = "/v1/projects",
    tag = "Projects",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "项目列表", body = Vec<ProjectResponse>),
        (status = 401, description = "未认证", body = crate::api::ApiError)
    )
)]
async fn list_projects(
    Extension(trace_id): Extension<TraceId>,
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match state.store.list_projects_for_user(&claims.sub).await {
        Ok(projects) => {
            let items: Vec<ProjectResponse> =
                projects.into_iter().map(ProjectResponse::from).collect();
            success_response(StatusCode::OK, &trace_id, items)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to list projects");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// 获取单个项目详情。
#[utoipa::path(
    get,
    path = "/v1/projects/{id}",
    tag = "Projects",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "项目 ID")),
    responses(
        (status = 200, description = "项目详情", body = ProjectResponse),
        (status = 401, description = "未认证", body = crate::api::ApiError),
        (status = 404, description = "项目不存在", body = crate::api::ApiError)
    )
)]
async fn get_project(
    Extension(trace_id): Extension<TraceId>,
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let project_id = match validate_project_id(&trace_id, &id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match load_owned_project(&state, &trace_id, &project_id, &claims.sub).await {
        Ok(project) => {
            success_response(StatusCode::OK, &trace_id, ProjectResponse::from(project))
        }
        Err(resp) => resp,
    }
}

/// 站点脚本状态上报请求
#[derive(Deserialize, ToSchema)]
struct SiteScriptRequest {
    status: SiteScriptStatus,
}

/// 站点接入流程：上报站点脚本状态（missing / connected）。
/// autopilot 的实际执行以 connected 为前提。
#[utoipa::path(
    post,
    path = "/v1/projects/{id}/site-script",
    tag = "Projects",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "项目 ID")),
    request_body = SiteScriptRequest,
    responses(
        (status = 200, description = "状态已更新", body = ProjectResponse),
        (status = 401, description = "未认证", body = crate::api::ApiError),
        (status = 404, description = "项目不存在", body = crate::api::ApiError)
    )
)]
async fn update_site_script(
    Extension(trace_id): Extension<TraceId>,
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SiteScriptRequest>,
) -> impl IntoResponse {
    let project_id = match validate_project_id(&trace_id, &id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let project = match load_owned_project(&state, &trace_id, &project_id, &claims.sub).await {
        Ok(project) => project,
        Err(resp) => return resp,
    };

    match state
        .store
        .set_site_script_status(&project.id, req.status)
        .await
    {
        Ok(Some(updated)) => {
            tracing::info!(
                project_id = %updated.id,
                status = %req.status.as_str(),
                "Site script status updated"
            );
            success_response(StatusCode::OK, &trace_id, ProjectResponse::from(updated))
        }
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "not_found",
            "Project not found",
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to update site script status");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

pub fn project_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_project, list_projects))
        .routes(routes!(get_project))
        .routes(routes!(update_site_script))
}
