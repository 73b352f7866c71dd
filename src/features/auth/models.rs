use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// 用户数据库实体
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: String,
}

/// 会话数据库实体
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: i64,
    pub created_at: String,
    pub expires_at: String,
}

/// 注册请求体。
///
/// 字段缺省时按空字符串处理，由 handler 统一做非空校验，
/// 保证缺失字段与空字段返回同样的 400 响应。
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// 用户名（唯一）
    #[serde(default)]
    #[schema(example = "alice")]
    pub username: String,
    /// 明文密码（仅在请求内存在，存储前即被哈希）
    #[serde(default)]
    #[schema(example = "correct horse battery staple")]
    pub password: String,
}

/// 登录请求体
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    #[schema(example = "alice")]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// 响应中对外暴露的用户信息（不含 id 与哈希）
#[derive(Debug, Serialize, ToSchema)]
pub struct UserInfo {
    #[schema(example = "alice")]
    pub username: String,
}

/// 注册/登录/登出的统一成功响应
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    /// 恒为 true
    #[schema(example = true)]
    pub success: bool,
    /// 人类可读的提示消息
    #[schema(example = "Login successful")]
    pub message: String,
    /// 注册/登录时返回的用户信息
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
}

/// 会话状态响应
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// 调用方是否持有有效会话
    #[schema(example = true)]
    pub is_authenticated: bool,
    /// 持有会话时返回的用户信息
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
}
