use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::{header, HeaderMap, Method},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use daybook_shared::constants::APP_NAME;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::blob_store::BlobStore;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::upload_tokens::UploadTokens;

#[derive(Clone)]
pub struct AppState {
    pub blob_store: Arc<BlobStore>,
    pub upload_tokens: UploadTokens,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    // One byte of headroom so oversize uploads reach the store's own check.
    let body_limit = state.config.max_blob_size.saturating_add(1);

    Router::new()
        .route("/health", get(health_check))
        .route("/storage/upload-url", post(generate_upload_url))
        .route("/storage/upload/:token", post(upload))
        .route("/storage/:id", get(download).delete(remove))
        .route("/storage/:id/url", get(image_url))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadUrlResponse {
    upload_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    storage_id: Uuid,
}

#[derive(Serialize)]
struct ImageUrlResponse {
    url: Option<String>,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: APP_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn generate_upload_url(State(state): State<AppState>) -> Json<UploadUrlResponse> {
    let token = state.upload_tokens.issue().await;
    Json(UploadUrlResponse {
        upload_url: format!("{}/storage/upload/{}", state.config.public_url, token),
    })
}

async fn upload(
    State(state): State<AppState>,
    Path(token): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>, ServerError> {
    if !state.upload_tokens.redeem(&token).await {
        return Err(ServerError::InvalidUploadToken);
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    if !content_type.starts_with("image/") {
        return Err(ServerError::UnsupportedMediaType(content_type));
    }

    let id = state.blob_store.store_blob(&body, &content_type).await?;

    info!(id = %id, size = body.len(), content_type = %content_type, "Image uploaded");
    Ok(Json(UploadResponse { storage_id: id }))
}

async fn download(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let (meta, data) = state.blob_store.get_blob(id).await?;
    Ok(([(header::CONTENT_TYPE, meta.content_type)], data))
}

async fn image_url(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ImageUrlResponse>, ServerError> {
    let url = state
        .blob_store
        .contains(id)
        .await?
        .then(|| format!("{}/storage/{}", state.config.public_url, id));
    Ok(Json(ImageUrlResponse { url }))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServerError> {
    state.blob_store.delete_blob(id).await?;
    info!(id = %id, "Image deleted");
    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;

    async fn test_state() -> (AppState, TempDir) {
        let dir = TempDir::new().unwrap();
        let config = ServerConfig {
            blob_storage_path: dir.path().to_path_buf(),
            public_url: "http://blob.test".into(),
            max_blob_size: 16,
            upload_url_ttl: Duration::from_secs(60),
            ..ServerConfig::default()
        };
        let blob_store = BlobStore::new(config.blob_storage_path.clone(), config.max_blob_size)
            .await
            .unwrap();
        let state = AppState {
            blob_store: Arc::new(blob_store),
            upload_tokens: UploadTokens::new(config.upload_url_ttl),
            config: Arc::new(config),
        };
        (state, dir)
    }

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Vec<u8>, HeaderMap) {
        let response = build_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec(), headers)
    }

    fn json(body: &[u8]) -> Value {
        serde_json::from_slice(body).unwrap()
    }

    async fn upload_path(state: &AppState) -> String {
        let request = Request::post("/storage/upload-url").body(Body::empty()).unwrap();
        let (status, body, _) = send(state, request).await;
        assert_eq!(status, StatusCode::OK);
        let url = json(&body)["uploadUrl"].as_str().unwrap().to_string();
        url.strip_prefix("http://blob.test").unwrap().to_string()
    }

    fn get_request(path: impl AsRef<str>) -> Request<Body> {
        Request::get(path.as_ref()).body(Body::empty()).unwrap()
    }

    fn delete_request(path: impl AsRef<str>) -> Request<Body> {
        Request::delete(path.as_ref()).body(Body::empty()).unwrap()
    }

    fn upload_request(path: &str, content_type: &str, data: &'static [u8]) -> Request<Body> {
        Request::post(path)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(data))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (state, _dir) = test_state().await;
        let (status, body, _) = send(&state, get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["status"], "ok");
        assert_eq!(json(&body)["service"], "Daybook");
    }

    #[tokio::test]
    async fn test_upload_download_delete() {
        let (state, _dir) = test_state().await;
        let path = upload_path(&state).await;

        let request = upload_request(&path, "image/png", b"png-bytes");
        let (status, body, _) = send(&state, request).await;
        assert_eq!(status, StatusCode::OK);
        let id = json(&body)["storageId"].as_str().unwrap().to_string();

        let (status, body, headers) = send(&state, get_request(format!("/storage/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"png-bytes");
        assert_eq!(headers[header::CONTENT_TYPE], "image/png");

        let (status, body, _) = send(&state, get_request(format!("/storage/{id}/url"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["url"], format!("http://blob.test/storage/{id}"));

        let (status, _, _) = send(&state, delete_request(format!("/storage/{id}"))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body, _) = send(&state, get_request(format!("/storage/{id}/url"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["url"], Value::Null);

        let (status, _, _) = send(&state, get_request(format!("/storage/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_token_single_use() {
        let (state, _dir) = test_state().await;
        let path = upload_path(&state).await;

        let (status, _, _) = send(&state, upload_request(&path, "image/png", b"one")).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body, _) = send(&state, upload_request(&path, "image/png", b"two")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(json(&body)["error"].as_str().unwrap().contains("invalid or expired"));

        let forged = upload_request("/storage/upload/forged", "image/png", b"x");
        let (status, _, _) = send(&state, forged).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_upload_rejections() {
        let (state, _dir) = test_state().await;

        let path = upload_path(&state).await;
        let (status, _, _) = send(&state, upload_request(&path, "text/plain", b"hello")).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let path = upload_path(&state).await;
        let (status, _, _) = send(&state, upload_request(&path, "image/png", b"")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let path = upload_path(&state).await;
        let oversize = upload_request(&path, "image/png", b"seventeen bytes!!");
        let (status, _, _) = send(&state, oversize).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

        assert!(state.blob_store.list_blobs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bad_id() {
        let (state, _dir) = test_state().await;
        let (status, _, _) = send(&state, get_request("/storage/not-a-uuid")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let missing = Uuid::new_v4();
        let (status, _, _) = send(&state, delete_request(format!("/storage/{missing}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
