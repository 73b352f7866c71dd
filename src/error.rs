use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 应用统一错误类型
#[derive(Error, Debug, utoipa::ToSchema)]
pub enum AppError {
    /// 参数校验错误（缺失或非法输入）
    #[error("{0}")]
    Validation(String),

    /// 认证失败 / 缺少有效会话
    #[error("{0}")]
    Auth(String),

    /// 内部服务器错误（生成或持久化过程中的意外失败）
    #[error("{0}")]
    Internal(String),
}

/// API 错误响应体。
///
/// 所有失败请求统一返回 `{ "success": false, "message": "..." }`，
/// HTTP 状态码与错误类别一一对应，便于前端稳定处理。
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// 恒为 false
    #[schema(example = false)]
    pub success: bool,
    /// 人类可读的错误信息
    #[schema(example = "Text is required")]
    pub message: String,
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            success: false,
            message: self.to_string(),
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("internal error: {}", body.message);
        }

        let mut res = Json(body).into_response();
        *res.status_mut() = status;
        res
    }
}

// =============== Error conversions for common external errors ===============

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(format!("database error: {err}"))
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Internal(format!("image encoding error: {err}"))
    }
}
