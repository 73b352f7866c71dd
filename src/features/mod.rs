/// 注册/登录/会话功能
pub mod auth;

/// 二维码生成功能
pub mod qr;

/// 健康检查功能
pub mod health;
