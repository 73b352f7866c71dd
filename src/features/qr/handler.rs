use axum::{Router, extract::State, routing::post};

use crate::error::AppError;
use crate::extract::Json;
use crate::state::AppState;

use super::models::{GenerateRequest, GenerateResponse, QrData};
use super::service;

#[utoipa::path(
    post,
    path = "/qr/generate",
    summary = "生成二维码",
    description = "将文本编码为纠错级别 H 的二维码，栅格化为 PNG 后以 data URI 返回。\
        该端点为公开端点，不要求登录。返回的 id 仅用于客户端关联，不做持久化。",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "生成成功", body = GenerateResponse),
        (status = 400, description = "文本缺失或参数非法", body = crate::error::ErrorBody),
        (status = 500, description = "编码或渲染失败", body = crate::error::ErrorBody)
    ),
    tag = "QR"
)]
pub async fn post_generate(
    State(_state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let generated = service::generate(&req.text, req.size, &req.color)?;

    tracing::debug!(
        size = req.size,
        color = %req.color,
        text_len = req.text.chars().count(),
        "qr generated"
    );

    Ok(Json(GenerateResponse {
        success: true,
        data: QrData {
            id: generated.id.to_string(),
            image_data: generated.data_uri,
        },
    }))
}

pub fn create_qr_router() -> Router<AppState> {
    Router::<AppState>::new().route("/qr/generate", post(post_generate))
}
