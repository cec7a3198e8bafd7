//! Router configuration for the HTTP API.

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{delete_file, download_file, get_file, list_files, upload_file, AppState};

/// Create the main API router.
///
/// `max_upload_bytes` of `None` disables the request body limit.
pub fn create_router(app_state: Arc<AppState>, max_upload_bytes: Option<usize>) -> Router {
    let body_limit = match max_upload_bytes {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route("/api/files", get(list_files).post(upload_file))
        .route("/api/files/:id", get(get_file).delete(delete_file))
        .route("/api/files/:id/download", get(download_file))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(body_limit),
        )
        .with_state(app_state)
        .merge(create_health_router())
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::{FileService, FileStorage, InMemoryFileRepository};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_router() -> (TempDir, Router) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path()).unwrap();
        let service = FileService::new(storage, Arc::new(InMemoryFileRepository::new()));
        let state = Arc::new(AppState::new(Arc::new(service), "UTC"));
        (temp_dir, create_router(state, Some(1024)))
    }

    #[tokio::test]
    async fn test_health_check() {
        let (_temp_dir, router) = test_router();

        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn test_list_files_empty() {
        let (_temp_dir, router) = test_router();

        let response = router
            .oneshot(Request::get("/api/files").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["data"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_unknown_file_is_404() {
        let (_temp_dir, router) = test_router();

        let response = router
            .oneshot(Request::get("/api/files/77").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
