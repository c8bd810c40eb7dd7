//! Axum server setup
//!
//! Router with:
//! - CORS from configured origins, credentials allowed
//! - Tracing and request-timeout middleware
//! - Optional static bundle as the fallback for unmatched paths
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::path::Path;
use std::sync::Arc;

use axum::http::{HeaderValue, StatusCode};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::config::Settings;
use crate::service::PostService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
}

impl AppState {
    pub fn new(posts: PostService) -> Self {
        Self { posts }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid CORS origin: '{origin}'")]
    InvalidOrigin { origin: String },
}

/// Build the application router.
///
/// Post routes are nested under `settings.api_prefix`; `/health` stays at the
/// root. When `settings.static_dir` is a directory, unmatched paths are served
/// from it with `index.html` as the client-side routing fallback.
pub fn build_router(state: AppState, settings: &Settings) -> Result<Router, ServerError> {
    let cors = cors_layer(&settings.cors_origins)?;

    let prefix = settings.api_prefix.trim_end_matches('/');
    let api = routes::posts::router();
    let mut router: Router<Arc<AppState>> = Router::new().merge(routes::health::router());
    router = if prefix.is_empty() {
        router.merge(api)
    } else {
        router.nest(prefix, api)
    };

    if let Some(bundle) = static_bundle(&settings.static_dir) {
        tracing::info!(dir = %settings.static_dir.display(), "Serving static bundle");
        router = router.fallback_service(bundle);
    }

    Ok(router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            settings.request_timeout,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state)))
}

/// Bind and serve until a shutdown signal arrives; in-flight requests drain.
pub async fn serve(router: Router, settings: &Settings) -> Result<(), ServerError> {
    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("Server listening on {}", settings.bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Listed origins may send credentials. Wildcard methods and headers are not
/// legal alongside credentials, so both are mirrored from the request; `*`
/// in the origin list mirrors the request origin the same way.
fn cors_layer(origins: &[String]) -> Result<CorsLayer, ServerError> {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS: wildcard origin configured - any origin allowed with credentials");
        AllowOrigin::mirror_request()
    } else {
        let values = origins
            .iter()
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .map_err(|_| ServerError::InvalidOrigin {
                        origin: origin.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(values)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

fn static_bundle(dir: &Path) -> Option<ServeDir<ServeFile>> {
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "No static bundle directory");
        return None;
    }
    Some(ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html"))))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::memory::MemoryPostRepo;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_settings() -> Settings {
        Settings {
            static_dir: "/nonexistent/postboard-static".into(),
            ..Settings::default()
        }
    }

    fn app_with(repo: MemoryPostRepo, settings: &Settings) -> Router {
        let state = AppState::new(PostService::new(Arc::new(repo)));
        build_router(state, settings).unwrap()
    }

    fn app() -> Router {
        app_with(MemoryPostRepo::new(), &test_settings())
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let response = app().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "status": "healthy" }));
    }

    #[tokio::test]
    async fn health_ignores_store_failure() {
        let app = app_with(MemoryPostRepo::failing(), &test_settings());
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn create_then_list() {
        let app = app();

        let response = app
            .clone()
            .oneshot(post_json("/api/v1/posts", r#"{"text": "Hello"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let created = body_json(response).await;
        assert_eq!(created["id"], 1);
        assert_eq!(created["text"], "Hello");
        let created_at = created["created_at"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(created_at).is_ok());

        let response = app.oneshot(get("/api/v1/posts")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([created]));
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let app = app();
        for text in ["first", "second"] {
            let body = json!({ "text": text }).to_string();
            let response = app
                .clone()
                .oneshot(post_json("/api/v1/posts", &body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let posts = body_json(app.oneshot(get("/api/v1/posts")).await.unwrap()).await;
        let texts: Vec<_> = posts
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["text"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(texts, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn empty_text_is_400_with_detail() {
        let response = app()
            .oneshot(post_json("/api/v1/posts", r#"{"text": ""}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "detail": "Text must be between 1 and 255 characters" })
        );
    }

    #[tokio::test]
    async fn whitespace_text_is_400() {
        let response = app()
            .oneshot(post_json("/api/v1/posts", r#"{"text": "   "}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn nul_character_is_400_and_never_stored() {
        let repo = Arc::new(MemoryPostRepo::new());
        let state = AppState::new(PostService::new(repo.clone()));
        let app = build_router(state, &test_settings()).unwrap();

        let response = app
            .oneshot(post_json("/api/v1/posts", r#"{"text": "a\u0000b"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "detail": "Text must not contain NUL characters" })
        );
        assert_eq!(repo.insert_calls(), 0);
    }

    #[tokio::test]
    async fn overlong_text_is_rejected_before_service() {
        let repo = Arc::new(MemoryPostRepo::new());
        let state = AppState::new(PostService::new(repo.clone()));
        let app = build_router(state, &test_settings()).unwrap();

        let body = json!({ "text": "x".repeat(256) }).to_string();
        let response = app
            .oneshot(post_json("/api/v1/posts", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(repo.insert_calls(), 0);
    }

    #[tokio::test]
    async fn malformed_bodies_are_422() {
        for body in [r#"{"text": 42}"#, r#"{}"#, r#"{"text": "#, "[]"] {
            let response = app().oneshot(post_json("/api/v1/posts", body)).await.unwrap();
            assert_eq!(
                response.status(),
                StatusCode::UNPROCESSABLE_ENTITY,
                "body: {}",
                body
            );
            assert!(body_json(response).await["detail"].is_string());
        }
    }

    #[tokio::test]
    async fn store_failure_is_500() {
        let app = app_with(MemoryPostRepo::failing(), &test_settings());

        let response = app.clone().oneshot(get("/api/v1/posts")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "detail": "Internal Server Error" })
        );

        let response = app
            .oneshot(post_json("/api/v1/posts", r#"{"text": "Hello"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn posts_live_under_configured_prefix() {
        let settings = Settings {
            api_prefix: "/v2/".into(),
            ..test_settings()
        };
        let app = app_with(MemoryPostRepo::new(), &settings);

        let response = app.clone().oneshot(get("/v2/posts")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get("/api/v1/posts")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cors_preflight_allows_listed_origin_with_credentials() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/v1/posts")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST");
    }

    #[tokio::test]
    async fn cors_ignores_unlisted_origin() {
        let request = Request::builder()
            .uri("/api/v1/posts")
            .header(header::ORIGIN, "http://evil.example")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[test]
    fn invalid_origin_is_rejected() {
        let settings = Settings {
            cors_origins: vec!["http://ok.example".into(), "bad\norigin".into()],
            ..test_settings()
        };
        let state = AppState::new(PostService::new(Arc::new(MemoryPostRepo::new())));
        let err = build_router(state, &settings).unwrap_err();
        assert!(matches!(err, ServerError::InvalidOrigin { origin } if origin == "bad\norigin"));
    }

    #[tokio::test]
    async fn static_bundle_serves_files_and_index_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>board</html>").unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log('board')").unwrap();

        let settings = Settings {
            static_dir: dir.path().to_path_buf(),
            ..test_settings()
        };
        let app = app_with(MemoryPostRepo::new(), &settings);

        let response = app.clone().oneshot(get("/app.js")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "console.log('board')");

        let response = app.clone().oneshot(get("/boards/latest")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "<html>board</html>");

        let response = app.oneshot(get("/api/v1/posts")).await.unwrap();
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn unmatched_path_is_404_without_bundle() {
        let response = app().oneshot(get("/boards/latest")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn default_settings_bind_port() {
        assert_eq!(Settings::default().bind_addr.port(), 8000);
    }
}
