use axum::{http::StatusCode, response::Json};
use serde::Serialize;

/// 健康检查响应
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    /// 恒为 true
    #[schema(example = true)]
    pub success: bool,
    /// 人类可读的提示消息
    #[schema(example = "Rust server is running")]
    pub message: String,
    /// 后端实现标识
    #[schema(example = "rust")]
    pub backend: String,
}

#[utoipa::path(
    get,
    path = "/health",
    summary = "健康检查",
    description = "用于探活的健康检查端点，无任何副作用。",
    responses((status = 200, description = "服务健康", body = HealthResponse)),
    tag = "Health"
)]
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            success: true,
            message: "Rust server is running".to_string(),
            backend: "rust".to_string(),
        }),
    )
}
