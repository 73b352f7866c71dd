use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 二维码生成请求体
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateRequest {
    /// 要编码的文本（必填，最长 2000 字符）
    #[serde(default)]
    #[schema(example = "https://example.com")]
    pub text: String,
    /// 输出图片边长（像素）
    #[serde(default = "GenerateRequest::default_size")]
    #[schema(example = 300)]
    pub size: u32,
    /// 前景色：CSS 基本颜色名或 #rrggbb
    #[serde(default = "GenerateRequest::default_color")]
    #[schema(example = "black")]
    pub color: String,
}

impl GenerateRequest {
    fn default_size() -> u32 {
        300
    }
    fn default_color() -> String {
        "black".to_string()
    }
}

/// 生成结果数据
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QrData {
    /// 本次生成的关联 ID（随机 UUID，不持久化）
    #[schema(example = "8b8f2f8a-1a2b-4c3d-9e0f-112233445566")]
    pub id: String,
    /// PNG 的 data URI（base64 编码）
    #[schema(example = "data:image/png;base64,iVBORw0KGgo...")]
    pub image_data: String,
}

/// 二维码生成响应
#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateResponse {
    /// 恒为 true
    #[schema(example = true)]
    pub success: bool,
    pub data: QrData,
}
