use axum::{
    Router,
    body::Body,
    http::{Request, header},
    routing::get,
};
use tower::ServiceExt;

use qr_backend::config::CorsConfig;
use qr_backend::cors::build_cors_layer;

fn test_app(cors: &CorsConfig) -> Router {
    let layer = build_cors_layer(cors).expect("cors layer");
    Router::new()
        .route("/", get(|| async { "ok" }))
        .layer(layer)
}

#[tokio::test]
async fn cors_layer_echoes_listed_origin() {
    let cors = CorsConfig {
        enabled: true,
        allowed_origins: vec!["http://localhost:3000".to_string()],
        allow_credentials: false,
        ..CorsConfig::default()
    };

    let req = Request::builder()
        .method("GET")
        .uri("/")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .expect("build request");
    let resp = test_app(&cors).oneshot(req).await.expect("call app");

    let allow_origin = resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .expect("missing allow origin")
        .to_str()
        .expect("invalid allow origin");
    assert_eq!(allow_origin, "http://localhost:3000");
}

#[tokio::test]
async fn cors_layer_sends_credentials_header_for_cookie_auth() {
    let cors = CorsConfig {
        enabled: true,
        allowed_origins: vec!["http://localhost:5173".to_string()],
        allow_credentials: true,
        ..CorsConfig::default()
    };

    let req = Request::builder()
        .method("GET")
        .uri("/")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .expect("build request");
    let resp = test_app(&cors).oneshot(req).await.expect("call app");

    let allow_credentials = resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
        .expect("missing allow credentials")
        .to_str()
        .expect("invalid allow credentials");
    assert_eq!(allow_credentials, "true");
}

#[tokio::test]
async fn cors_preflight_includes_allow_methods() {
    let cors = CorsConfig {
        enabled: true,
        allowed_origins: vec!["http://localhost:3000".to_string()],
        allow_credentials: false,
        ..CorsConfig::default()
    };

    let req = Request::builder()
        .method("OPTIONS")
        .uri("/")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .expect("build request");
    let resp = test_app(&cors).oneshot(req).await.expect("call app");

    let allow_methods = resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .expect("missing allow methods")
        .to_str()
        .expect("invalid allow methods");
    assert!(allow_methods.contains("POST"));
}

#[tokio::test]
async fn cors_layer_ignores_unlisted_origin() {
    let cors = CorsConfig {
        enabled: true,
        allowed_origins: vec!["http://localhost:3000".to_string()],
        allow_credentials: false,
        ..CorsConfig::default()
    };

    let req = Request::builder()
        .method("GET")
        .uri("/")
        .header(header::ORIGIN, "https://evil.example")
        .body(Body::empty())
        .expect("build request");
    let resp = test_app(&cors).oneshot(req).await.expect("call app");

    assert!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}
