use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::Json;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use vishub_common::types::{ChangePasswordRequest, LoginRequest, LoginResponse};
use vishub_storage::auth::{hash_password, verify_password};

use crate::api::{error_response, success_response, ApiError};
use crate::logging::TraceId;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub token_version: i32,
    pub iat: u64,
    pub exp: u64,
}

pub fn create_token(
    secret: &str,
    user_id: &str,
    username: &str,
    token_version: i32,
    expire_secs: u64,
) -> anyhow::Result<String> {
    let now = chrono::Utc::now().timestamp() as u64;
    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        token_version,
        iat: now,
        exp: now + expire_secs,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn validate_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

fn auth_error(code: &str, msg: &str) -> axum::response::Response {
    error_response(StatusCode::UNAUTHORIZED, "", code, msg)
}

/// JWT 鉴权中间件。
/// 校验签名与有效期后，再比对用户当前 token_version，
/// 改密后旧 token 立即失效。
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> axum::response::Response {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let token = match auth_header {
        None => {
            return auth_error("unauthorized", "missing authorization header");
        }
        Some(header) => {
            if let Some(token) = header.strip_prefix("Bearer ") {
                if token.is_empty() {
                    return auth_error("unauthorized", "invalid authorization header");
                }
                token
            } else {
                return auth_error("unauthorized", "invalid authorization header");
            }
        }
    };

    let claims = match validate_token(&state.jwt_secret, token) {
        Ok(claims) => claims,
        Err(e) => {
            if matches!(
                e.kind(),
                jsonwebtoken::errors::ErrorKind::ExpiredSignature
            ) {
                return auth_error("token_expired", "token expired");
            }
            return auth_error("unauthorized", "invalid token");
        }
    };

    // token_version 比对需要一次用户查询
    match state.store.get_user_by_id(&claims.sub).await {
        Ok(Some(user)) if user.token_version == claims.token_version => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Ok(_) => auth_error("unauthorized", "invalid token"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load user for token validation");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "",
                "storage_error",
                "internal error",
            )
        }
    }
}

/// 登录接口
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "登录成功", body = LoginResponse),
        (status = 400, description = "请求参数错误", body = ApiError),
        (status = 401, description = "用户名或密码错误", body = ApiError)
    )
)]
pub async fn login(
    axum::extract::Extension(trace_id): axum::extract::Extension<TraceId>,
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    if req.username.is_empty() || req.password.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            &trace_id,
            "validation_error",
            "username and password are required",
        );
    }

    let user = match state.store.get_user_by_username(&req.username).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return error_response(
                StatusCode::UNAUTHORIZED,
                &trace_id,
                "unauthorized",
                "invalid credentials",
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to query user");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "internal error",
            );
        }
    };

    match verify_password(&req.password, &user.password_hash) {
        Ok(true) => {}
        _ => {
            return error_response(
                StatusCode::UNAUTHORIZED,
                &trace_id,
                "unauthorized",
                "invalid credentials",
            );
        }
    }

    match create_token(
        &state.jwt_secret,
        &user.id,
        &user.username,
        user.token_version,
        state.token_expire_secs,
    ) {
        Ok(token) => success_response(
            StatusCode::OK,
            &trace_id,
            LoginResponse {
                token,
                expires_in: state.token_expire_secs,
            },
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to create token");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "internal_error",
                "internal error",
            )
        }
    }
}

/// 修改密码。成功后旧 token 全部失效，需要重新登录。
#[utoipa::path(
    post,
    path = "/v1/auth/password",
    tag = "Auth",
    security(("bearer_auth" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "密码已更新，请重新登录"),
        (status = 400, description = "请求参数错误", body = ApiError),
        (status = 401, description = "当前密码错误", body = ApiError)
    )
)]
pub async fn change_password(
    axum::extract::Extension(trace_id): axum::extract::Extension<TraceId>,
    axum::extract::Extension(claims): axum::extract::Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<ChangePasswordRequest>,
) -> impl IntoResponse {
    if req.current_password.is_empty() || req.new_password.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            &trace_id,
            "validation_error",
            "current_password and new_password are required",
        );
    }

    let user = match state.store.get_user_by_id(&claims.sub).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return error_response(
                StatusCode::UNAUTHORIZED,
                &trace_id,
                "unauthorized",
                "invalid token",
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to query user");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "internal error",
            );
        }
    };

    match verify_password(&req.current_password, &user.password_hash) {
        Ok(true) => {}
        _ => {
            return error_response(
                StatusCode::UNAUTHORIZED,
                &trace_id,
                "unauthorized",
                "current password is incorrect",
            );
        }
    }

    let new_hash = match hash_password(&req.new_password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!(error = %e, "Failed to hash new password");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "internal_error",
                "internal error",
            );
        }
    };

    match state.store.update_password(&user.id, &new_hash).await {
        Ok(true) => (
            StatusCode::OK,
            Json(crate::api::ApiResponse::<serde_json::Value> {
                err_code: 0,
                err_msg: "password updated, please login again".to_string(),
                trace_id: trace_id.to_string(),
                data: None,
            }),
        )
            .into_response(),
        Ok(false) => error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "not_found",
            "user not found",
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to update password");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "internal error",
            )
        }
    }
}
