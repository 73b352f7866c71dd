use std::io::Cursor;

use base64::Engine;
use image::{Luma, Rgba, RgbaImage, imageops, imageops::FilterType};
use qrcode::{EcLevel, QrCode};
use uuid::Uuid;

use crate::error::AppError;

/// 输出尺寸允许范围（像素）
pub const MIN_SIZE: u32 = 16;
pub const MAX_SIZE: u32 = 2000;
/// 输入文本长度上限
pub const MAX_TEXT_LEN: usize = 2000;

/// 每个模块的像素边长（缩放前）
const MODULE_PIXELS: u32 = 10;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// 一次生成的结果：关联 ID + PNG data URI
#[derive(Debug)]
pub struct GeneratedQr {
    pub id: Uuid,
    pub data_uri: String,
}

/// 生成二维码 PNG 并打包为 data URI。
///
/// 纠错级别固定为 H（约 30% 容损），符号版本按载荷自动选取最小值；
/// 模块按固定 10 像素渲染并保留标准 4 模块静区，最后以最近邻缩放到
/// `size × size`。
pub fn generate(text: &str, size: u32, color: &str) -> Result<GeneratedQr, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::Validation("Text is required".to_string()));
    }
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(AppError::Validation(format!(
            "Text cannot exceed {MAX_TEXT_LEN} characters"
        )));
    }
    if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
        return Err(AppError::Validation(format!(
            "Size must be between {MIN_SIZE} and {MAX_SIZE} pixels"
        )));
    }
    // 未指定颜色时回落到黑色，非法颜色才报错
    let color = color.trim();
    let fill = if color.is_empty() {
        Rgba([0, 0, 0, 255])
    } else {
        parse_color(color).ok_or_else(|| {
            AppError::Validation(format!(
                "Invalid color '{color}'. Use a basic color name or #rrggbb"
            ))
        })?
    };

    let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::H)
        .map_err(|e| AppError::Internal(format!("QR encoding failed: {e}")))?;

    // Luma 渲染拿到模块栅格，再套用请求的前景色
    let modules = code
        .render::<Luma<u8>>()
        .module_dimensions(MODULE_PIXELS, MODULE_PIXELS)
        .quiet_zone(true)
        .build();

    let mut img = RgbaImage::new(modules.width(), modules.height());
    for (x, y, p) in modules.enumerate_pixels() {
        img.put_pixel(x, y, if p.0[0] == 0 { fill } else { WHITE });
    }

    let resized = imageops::resize(&img, size, size, FilterType::Nearest);

    let mut png = Vec::new();
    resized.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;

    Ok(GeneratedQr {
        id: Uuid::new_v4(),
        data_uri: format!(
            "data:image/png;base64,{}",
            base64::prelude::BASE64_STANDARD.encode(&png)
        ),
    })
}

/// 解析前景色：CSS 基本颜色名或 `#rgb`/`#rrggbb` 十六进制
pub fn parse_color(value: &str) -> Option<Rgba<u8>> {
    let value = value.trim();
    if let Some(hex_part) = value.strip_prefix('#') {
        return parse_hex_color(hex_part);
    }
    let rgb: [u8; 3] = match value.to_ascii_lowercase().as_str() {
        "black" => [0, 0, 0],
        "white" => [255, 255, 255],
        "red" => [255, 0, 0],
        "green" => [0, 128, 0],
        "lime" => [0, 255, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "cyan" | "aqua" => [0, 255, 255],
        "magenta" | "fuchsia" => [255, 0, 255],
        "gray" | "grey" => [128, 128, 128],
        "silver" => [192, 192, 192],
        "maroon" => [128, 0, 0],
        "olive" => [128, 128, 0],
        "navy" => [0, 0, 128],
        "teal" => [0, 128, 128],
        "purple" => [128, 0, 128],
        "orange" => [255, 165, 0],
        _ => return None,
    };
    Some(Rgba([rgb[0], rgb[1], rgb[2], 255]))
}

fn parse_hex_color(hex_part: &str) -> Option<Rgba<u8>> {
    match hex_part.len() {
        // #rgb 每位翻倍展开
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex_part.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgb[i] = v << 4 | v;
            }
            Some(Rgba([rgb[0], rgb[1], rgb[2], 255]))
        }
        6 => {
            let bytes = hex::decode(hex_part).ok()?;
            Some(Rgba([bytes[0], bytes[1], bytes[2], 255]))
        }
        _ => None,
    }
}
