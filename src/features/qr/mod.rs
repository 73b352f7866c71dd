pub mod handler;
pub mod models;
pub mod service;

// 对外导出路由构建函数，便于 main.rs 引用
pub use handler::create_qr_router;
