use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::compression::CompressionLayer;
use tower_http::services::{ServeDir, ServeFile};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use qr_backend::config::AppConfig;
use qr_backend::cors::build_cors_layer;
use qr_backend::features::auth::password::PasswordHasher;
use qr_backend::features::auth::session::CookieSigner;
use qr_backend::features::auth::storage::UserStorage;
use qr_backend::features::{auth, health, qr};
use qr_backend::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        qr_backend::features::health::handler::health_check,
        qr_backend::features::auth::handler::post_register,
        qr_backend::features::auth::handler::post_login,
        qr_backend::features::auth::handler::post_logout,
        qr_backend::features::auth::handler::get_status,
        qr_backend::features::qr::handler::post_generate,
    ),
    components(
        schemas(
            qr_backend::error::AppError,
            qr_backend::error::ErrorBody,
            qr_backend::features::health::handler::HealthResponse,
            qr_backend::features::auth::models::RegisterRequest,
            qr_backend::features::auth::models::LoginRequest,
            qr_backend::features::auth::models::AuthResponse,
            qr_backend::features::auth::models::StatusResponse,
            qr_backend::features::auth::models::UserInfo,
            qr_backend::features::qr::models::GenerateRequest,
            qr_backend::features::qr::models::GenerateResponse,
            qr_backend::features::qr::models::QrData,
        )
    ),
    tags(
        (name = "Auth", description = "Auth APIs"),
        (name = "QR", description = "QR generation APIs"),
        (name = "Health", description = "Health APIs"),
    ),
    info(
        title = "QR Backend API",
        version = "0.1.0",
        description = "QR code generator backend service (Axum)"
    )
)]
pub struct ApiDoc;

/// 等待 Ctrl+C 或 SIGTERM，触发优雅退出
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("监听 Ctrl+C 失败: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!("监听 SIGTERM 失败: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("接收到退出信号，开始优雅关闭HTTP服务器...");
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qr_backend=info,tower_http=info".into()),
        )
        .init();

    // Load config
    if let Err(e) = AppConfig::init_global() {
        tracing::error!("Config init failed: {}", e);
        std::process::exit(1);
    }
    let config = AppConfig::global();

    // 连接用户库并建表（文件不存在时自动创建）
    let storage = match UserStorage::connect_sqlite(
        &config.database.sqlite_path,
        config.database.sqlite_wal,
    )
    .await
    {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("SQLite init failed: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = storage.init_schema().await {
        tracing::error!("Schema init failed: {}", e);
        std::process::exit(1);
    }

    // 启动时清理一次过期会话
    match storage.cleanup_expired_sessions(chrono::Utc::now()).await {
        Ok(0) => {}
        Ok(n) => tracing::info!("已清理 {} 条过期会话", n),
        Err(e) => tracing::warn!("过期会话清理失败：{}（将继续运行）", e),
    }

    // Shared state
    let app_state = AppState {
        storage: Arc::new(storage),
        signer: Arc::new(CookieSigner::new(&config.session)),
        hasher: Arc::new(PasswordHasher::new(config.password.clone())),
    };

    // Routes
    let api_router = Router::<AppState>::new()
        .route("/health", get(health::health_check))
        .merge(auth::create_auth_router())
        .merge(qr::create_qr_router());

    let static_root = config.static_files.root_path();
    let spa_entry = config.static_files.spa_entry_path();
    let mut app = Router::<AppState>::new()
        .nest(&config.api.prefix, api_router)
        // SPA：`/login` 与所有未匹配路径都回退到入口文件
        .route_service("/login", ServeFile::new(spa_entry.clone()))
        .fallback_service(ServeDir::new(&static_root).not_found_service(ServeFile::new(spa_entry)))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    if let Some(cors) = build_cors_layer(&config.cors) {
        app = app.layer(cors);
    }

    // JSON/文本响应启用 gzip/brotli；PNG 以 base64 进 JSON，压缩收益可观
    app = app.layer(CompressionLayer::new());

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Bind address failed {}: {}", addr, e);
            std::process::exit(1);
        });

    tracing::info!("Server: http://{}", addr);
    tracing::info!("Docs: http://{}/docs", addr);
    tracing::info!("Health: http://{}{}/health", addr, config.api.prefix);
    tracing::info!("Auth API: http://{}{}/auth", addr, config.api.prefix);
    tracing::info!("QR API: http://{}{}/qr/generate", addr, config.api.prefix);
    tracing::info!("Static root: {:?}", static_root);

    let graceful = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());
    if let Err(e) = graceful.await {
        tracing::error!("服务器运行错误: {}", e);
        std::process::exit(1);
    }

    tracing::info!("服务器已优雅关闭");
}
