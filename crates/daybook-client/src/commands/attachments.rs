//! Image attachments.
//!
//! Images go to hosted blob storage in two steps: ask the server for a
//! one-time upload URL, then POST the raw bytes to it. The server answers
//! with a storage reference, which is what ends up in
//! `DayRecord::attachments`.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use daybook_shared::constants::MAX_IMAGE_SIZE;

use crate::error::{ClientError, Result};

/// An image picked in the composer, possibly uploaded already.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingImage {
    pub content_type: String,
    pub data: Vec<u8>,
    /// Set once the upload succeeded.
    pub storage_id: Option<String>,
}

impl PendingImage {
    pub fn new(content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            content_type: content_type.into(),
            data,
            storage_id: None,
        }
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// Hosted storage for image payloads.
#[allow(async_fn_in_trait)]
pub trait BlobStorage {
    /// Issue a one-time URL the next upload is sent to.
    async fn generate_upload_url(&self) -> Result<String>;

    /// Upload a payload, returning its storage reference.
    async fn upload(&self, upload_url: &str, content_type: &str, data: Vec<u8>) -> Result<String>;

    /// Resolve a reference to a fetchable URL. `None` if the blob is gone.
    async fn image_url(&self, storage_id: &str) -> Result<Option<String>>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// [`BlobStorage`] backed by `daybook-server`.
#[derive(Debug, Clone)]
pub struct HttpBlobStorage {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadUrlResponse {
    upload_url: String,
}

#[derive(Deserialize)]
struct ImageUrlResponse {
    url: Option<String>,
}

impl HttpBlobStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl BlobStorage for HttpBlobStorage {
    async fn generate_upload_url(&self) -> Result<String> {
        let resp = self
            .client
            .post(format!("{}/storage/upload-url", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        let body: UploadUrlResponse = resp.json().await?;
        Ok(body.upload_url)
    }

    async fn upload(&self, upload_url: &str, content_type: &str, data: Vec<u8>) -> Result<String> {
        let resp = self
            .client
            .post(upload_url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(ClientError::BlobStorage(format!("upload rejected ({status}): {text}")));
        }
        parse_upload_response(&text)
            .ok_or_else(|| ClientError::BlobStorage("upload response carried no storage id".into()))
    }

    async fn image_url(&self, storage_id: &str) -> Result<Option<String>> {
        let resp = self
            .client
            .get(format!("{}/storage/{}/url", self.base_url, storage_id))
            .send()
            .await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: ImageUrlResponse = resp.error_for_status()?.json().await?;
        Ok(body.url)
    }
}

/// Pull the storage reference out of an upload response.
///
/// Accepts a bare JSON string, an object with `storageId` or `id`, or the
/// raw body text.
pub fn parse_upload_response(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let id = match serde_json::from_str::<Value>(text) {
        Ok(Value::String(s)) => s,
        Ok(Value::Object(map)) => map
            .get("storageId")
            .or_else(|| map.get("id"))
            .and_then(Value::as_str)?
            .to_string(),
        _ => text.to_string(),
    };

    let id = id.trim().to_string();
    (!id.is_empty()).then_some(id)
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Upload every image in `images` that has no storage reference yet.
///
/// Non-image payloads are skipped. On success each uploaded item carries
/// its reference, and all references (old and new, in order) are returned.
/// The first failure aborts; items uploaded before it keep their reference
/// so a retry does not send them twice.
pub async fn upload_images<B: BlobStorage>(
    storage: &B,
    images: &mut [PendingImage],
) -> Result<Vec<String>> {
    let mut ids = Vec::with_capacity(images.len());

    for image in images.iter_mut() {
        if !image.is_image() {
            warn!(content_type = %image.content_type, "Skipping non-image attachment");
            continue;
        }
        if let Some(id) = &image.storage_id {
            debug!(id = %id, "Attachment already uploaded");
            ids.push(id.clone());
            continue;
        }
        if image.data.len() > MAX_IMAGE_SIZE {
            return Err(ClientError::ImageTooLarge {
                size: image.data.len(),
                max: MAX_IMAGE_SIZE,
            });
        }

        let url = storage.generate_upload_url().await?;
        let id = storage
            .upload(&url, &image.content_type, image.data.clone())
            .await?;

        info!(id = %id, size = image.data.len(), "Image uploaded");
        image.storage_id = Some(id.clone());
        ids.push(id);
    }

    Ok(ids)
}

/// Resolve each reference to a URL, keeping the input order.
pub async fn image_urls<B: BlobStorage>(
    storage: &B,
    storage_ids: &[String],
) -> Result<Vec<Option<String>>> {
    let mut urls = Vec::with_capacity(storage_ids.len());
    for id in storage_ids {
        urls.push(storage.image_url(id).await?);
    }
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct FakeStorage {
        uploads: Mutex<Vec<(String, usize)>>,
        urls: HashMap<String, String>,
        fail_uploads: bool,
    }

    impl BlobStorage for FakeStorage {
        async fn generate_upload_url(&self) -> Result<String> {
            Ok("http://blob.test/storage/upload/token".into())
        }

        async fn upload(&self, _url: &str, content_type: &str, data: Vec<u8>) -> Result<String> {
            if self.fail_uploads {
                return Err(ClientError::BlobStorage("offline".into()));
            }
            let mut uploads = self.uploads.lock().unwrap();
            uploads.push((content_type.to_string(), data.len()));
            Ok(format!("blob-{}", uploads.len()))
        }

        async fn image_url(&self, storage_id: &str) -> Result<Option<String>> {
            Ok(self.urls.get(storage_id).cloned())
        }
    }

    #[test]
    fn parse_upload_response_shapes() {
        assert_eq!(parse_upload_response("\"kg2abc\""), Some("kg2abc".into()));
        assert_eq!(parse_upload_response(r#"{"storageId":"kg2abc"}"#), Some("kg2abc".into()));
        assert_eq!(parse_upload_response(r#"{"id":"kg2abc"}"#), Some("kg2abc".into()));
        assert_eq!(parse_upload_response(" kg2abc \n"), Some("kg2abc".into()));
        assert_eq!(parse_upload_response(r#"{"other":1}"#), None);
        assert_eq!(parse_upload_response(""), None);
    }

    #[tokio::test]
    async fn uploads_only_new_images() {
        let storage = FakeStorage::default();
        let mut images = vec![
            PendingImage::new("image/png", vec![1, 2, 3]),
            PendingImage::new("text/plain", vec![9]),
            PendingImage {
                storage_id: Some("existing".into()),
                ..PendingImage::new("image/jpeg", vec![4])
            },
            PendingImage::new("image/jpeg", vec![5, 6]),
        ];

        let ids = upload_images(&storage, &mut images).await.unwrap();
        assert_eq!(ids, ["blob-1", "existing", "blob-2"]);
        assert_eq!(images[0].storage_id.as_deref(), Some("blob-1"));
        assert_eq!(images[1].storage_id, None);

        let uploads = storage.uploads.lock().unwrap();
        assert_eq!(*uploads, [("image/png".to_string(), 3), ("image/jpeg".to_string(), 2)]);
    }

    #[tokio::test]
    async fn upload_failure_propagates() {
        let storage = FakeStorage {
            fail_uploads: true,
            ..Default::default()
        };
        let mut images = vec![PendingImage::new("image/png", vec![1])];
        let err = upload_images(&storage, &mut images).await.unwrap_err();
        assert!(matches!(err, ClientError::BlobStorage(_)));
        assert_eq!(images[0].storage_id, None);
    }

    #[tokio::test]
    async fn oversize_image_rejected() {
        let storage = FakeStorage::default();
        let mut images = vec![PendingImage::new("image/png", vec![0; MAX_IMAGE_SIZE + 1])];
        let err = upload_images(&storage, &mut images).await.unwrap_err();
        assert!(matches!(err, ClientError::ImageTooLarge { .. }));
        assert!(storage.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn urls_resolve_in_order() {
        let storage = FakeStorage {
            urls: HashMap::from([("a".to_string(), "http://blob.test/storage/a".to_string())]),
            ..Default::default()
        };
        let urls = image_urls(&storage, &["a".into(), "gone".into()]).await.unwrap();
        assert_eq!(urls, [Some("http://blob.test/storage/a".to_string()), None]);
    }

    #[test]
    fn http_storage_trims_base_url() {
        let storage = HttpBlobStorage::new("http://localhost:8080/");
        assert_eq!(storage.base_url(), "http://localhost:8080");
    }
}
