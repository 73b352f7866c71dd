use axum::{
    Router,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;

use crate::error::AppError;
use crate::extract::Json;
use crate::state::AppState;

use super::models::{AuthResponse, LoginRequest, RegisterRequest, StatusResponse, UserInfo};

/// 从请求头解析已验签的会话 ID
fn session_id_from_headers(state: &AppState, headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    state.signer.session_id_from_cookie_header(raw)
}

/// 构造带 Set-Cookie 的 JSON 响应
fn json_with_cookie(
    status: StatusCode,
    cookie: &str,
    body: AuthResponse,
) -> Result<Response, AppError> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|e| AppError::Internal(format!("invalid cookie header: {e}")))?;
    let mut res = (status, Json(body)).into_response();
    res.headers_mut().append(header::SET_COOKIE, value);
    Ok(res)
}

#[utoipa::path(
    post,
    path = "/auth/register",
    summary = "注册",
    description = "创建新用户并建立会话。用户名与密码均不能为空；用户名重复时返回 400。",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "注册成功，响应头携带会话 Cookie", body = AuthResponse),
        (status = 400, description = "字段缺失或用户名已存在", body = crate::error::ErrorBody)
    ),
    tag = "Auth"
)]
pub async fn post_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response, AppError> {
    let username = req.username.trim();
    if username.is_empty() || req.password.trim().is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    let password_hash = state.hasher.hash(&req.password)?;
    let user = state.storage.create_user(username, &password_hash).await?;
    let session = state
        .storage
        .create_session(user.id, state.signer.ttl_secs())
        .await?;

    tracing::info!("{username} registered");

    json_with_cookie(
        StatusCode::CREATED,
        &state.signer.build_cookie(&session.id),
        AuthResponse {
            success: true,
            message: "Registration successful".to_string(),
            user: Some(UserInfo {
                username: user.username,
            }),
        },
    )
}

#[utoipa::path(
    post,
    path = "/auth/login",
    summary = "登录",
    description = "校验凭证并建立会话。用户不存在与密码错误统一返回 401，防止用户名枚举。",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "登录成功，响应头携带会话 Cookie", body = AuthResponse),
        (status = 401, description = "凭证无效", body = crate::error::ErrorBody)
    ),
    tag = "Auth"
)]
pub async fn post_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let username = req.username.trim();

    // 未知用户与密码错误走同一条路径，对外不做区分
    let invalid = || AppError::Auth("Invalid credentials".to_string());

    let user = state
        .storage
        .find_user(username)
        .await?
        .ok_or_else(invalid)?;
    if !state.hasher.verify(&req.password, &user.password_hash) {
        tracing::info!("{username} login: wrong password");
        return Err(invalid());
    }

    let session = state
        .storage
        .create_session(user.id, state.signer.ttl_secs())
        .await?;

    tracing::info!("{username} login: new session created");

    json_with_cookie(
        StatusCode::OK,
        &state.signer.build_cookie(&session.id),
        AuthResponse {
            success: true,
            message: "Login successful".to_string(),
            user: Some(UserInfo {
                username: user.username,
            }),
        },
    )
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    summary = "登出",
    description = "销毁当前会话并清除会话 Cookie。无有效会话时返回 401。",
    responses(
        (status = 200, description = "登出成功", body = AuthResponse),
        (status = 401, description = "没有活跃会话", body = crate::error::ErrorBody)
    ),
    tag = "Auth"
)]
pub async fn post_logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let session_id = session_id_from_headers(&state, &headers)
        .ok_or_else(|| AppError::Auth("Not logged in".to_string()))?;

    let deleted = state.storage.delete_session(&session_id, Utc::now()).await?;
    if !deleted {
        // Cookie 验签通过但会话已过期或已登出
        return Err(AppError::Auth("Not logged in".to_string()));
    }

    json_with_cookie(
        StatusCode::OK,
        &state.signer.build_removal_cookie(),
        AuthResponse {
            success: true,
            message: "Logout successful".to_string(),
            user: None,
        },
    )
}

#[utoipa::path(
    get,
    path = "/auth/status",
    summary = "会话状态",
    description = "返回调用方是否持有有效会话；该端点不会失败。",
    responses((status = 200, description = "会话状态", body = StatusResponse)),
    tag = "Auth"
)]
pub async fn get_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StatusResponse>, AppError> {
    let Some(session_id) = session_id_from_headers(&state, &headers) else {
        return Ok(Json(StatusResponse {
            is_authenticated: false,
            user: None,
        }));
    };

    let user = state.storage.session_user(&session_id, Utc::now()).await?;
    Ok(Json(match user {
        Some(user) => StatusResponse {
            is_authenticated: true,
            user: Some(UserInfo {
                username: user.username,
            }),
        },
        None => StatusResponse {
            is_authenticated: false,
            user: None,
        },
    }))
}

pub fn create_auth_router() -> Router<AppState> {
    Router::<AppState>::new()
        .route("/auth/register", post(post_register))
        .route("/auth/login", post(post_login))
        .route("/auth/logout", post(post_logout))
        .route("/auth/status", get(get_status))
}
