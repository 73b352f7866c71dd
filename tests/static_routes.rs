use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};
use uuid::Uuid;

const INDEX_HTML: &str = "<!doctype html><title>qr</title><div id=\"app\"></div>";
const APP_JS: &str = "console.log('qr');";

/// 在临时目录里铺一份最小前端产物，返回与 main.rs 相同结构的静态路由。
fn make_app() -> (Router, std::path::PathBuf) {
    let root = std::env::temp_dir().join(format!("qr_backend_static_{}", Uuid::new_v4()));
    std::fs::create_dir_all(&root).expect("create static root");
    std::fs::write(root.join("index.html"), INDEX_HTML).expect("write index");
    std::fs::write(root.join("app.js"), APP_JS).expect("write app.js");

    let spa_entry = root.join("index.html");
    let app = Router::new()
        .route_service("/login", ServeFile::new(spa_entry.clone()))
        .fallback_service(ServeDir::new(&root).not_found_service(ServeFile::new(spa_entry)));
    (app, root)
}

async fn get(app: Router, path: &str) -> (StatusCode, String) {
    let resp = app
        .oneshot(
            Request::builder()
                .uri(path)
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("call app");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

#[tokio::test]
async fn serves_real_files_from_static_root() {
    let (app, _root) = make_app();
    let (status, body) = get(app, "/app.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, APP_JS);
}

#[tokio::test]
async fn root_serves_spa_entry() {
    let (app, _root) = make_app();
    let (status, body) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, INDEX_HTML);
}

#[tokio::test]
async fn login_route_serves_spa_entry() {
    let (app, _root) = make_app();
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/login")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("call app");
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .expect("content type")
        .to_str()
        .unwrap();
    assert!(content_type.starts_with("text/html"));
}

#[tokio::test]
async fn unknown_paths_fall_back_to_spa_entry() {
    let (app, _root) = make_app();
    for path in ["/dashboard", "/some/deep/client/route"] {
        let (status, body) = get(app.clone(), path).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, INDEX_HTML);
    }
}
