//! Image blobs on local disk.
//!
//! Each blob is stored as `<id>` next to a `<id>.json` sidecar recording its
//! content type, size and BLAKE3 hash. Ids are server-generated UUIDs, so
//! every path is built from a parsed `Uuid`; the traversal check is a
//! second line.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ServerError;

/// Verify that a resolved path stays within the expected base directory.
fn ensure_within(base: &Path, target: &Path) -> Result<PathBuf, ServerError> {
    let mut resolved = base.to_path_buf();
    for component in target.strip_prefix(base).unwrap_or(target).components() {
        match component {
            Component::Normal(c) => resolved.push(c),
            Component::CurDir => {}
            _ => {
                return Err(ServerError::BadRequest("Path traversal detected".to_string()));
            }
        }
    }
    if resolved == base || !resolved.starts_with(base) {
        return Err(ServerError::BadRequest("Path traversal detected".to_string()));
    }
    Ok(resolved)
}

/// Sidecar metadata stored next to every blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobMeta {
    pub content_type: String,
    pub size: usize,
    /// Hex-encoded BLAKE3 hash of the payload.
    pub blake3: String,
}

#[derive(Debug, Clone)]
pub struct BlobStore {
    base_path: PathBuf,
    max_size: usize,
}

impl BlobStore {
    pub async fn new(base_path: PathBuf, max_size: usize) -> Result<Self, ServerError> {
        fs::create_dir_all(&base_path).await.map_err(|e| {
            ServerError::BlobStorage(format!(
                "Failed to create blob directory '{}': {}",
                base_path.display(),
                e
            ))
        })?;
        let base_path = base_path.canonicalize().map_err(|e| {
            ServerError::BlobStorage(format!("Failed to resolve '{}': {}", base_path.display(), e))
        })?;

        info!(path = %base_path.display(), max_size, "Blob store initialized");

        Ok(Self {
            base_path,
            max_size,
        })
    }

    pub async fn store_blob(&self, data: &[u8], content_type: &str) -> Result<Uuid, ServerError> {
        if data.is_empty() {
            return Err(ServerError::EmptyBlob);
        }
        if data.len() > self.max_size {
            return Err(ServerError::BlobTooLarge {
                size: data.len(),
                max: self.max_size,
            });
        }

        let id = Uuid::new_v4();
        let meta = BlobMeta {
            content_type: content_type.to_string(),
            size: data.len(),
            blake3: blake3::hash(data).to_hex().to_string(),
        };
        let meta_json = serde_json::to_vec(&meta).map_err(|e| {
            ServerError::BlobStorage(format!("Failed to encode metadata for {id}: {e}"))
        })?;

        fs::write(self.blob_path(&id)?, data)
            .await
            .map_err(|e| ServerError::BlobStorage(format!("Failed to write blob {id}: {e}")))?;
        fs::write(self.meta_path(&id)?, meta_json).await.map_err(|e| {
            ServerError::BlobStorage(format!("Failed to write metadata for {id}: {e}"))
        })?;

        debug!(id = %id, size = data.len(), content_type, "Stored blob");
        Ok(id)
    }

    pub async fn contains(&self, id: Uuid) -> Result<bool, ServerError> {
        let path = self.blob_path(&id)?;
        fs::try_exists(&path)
            .await
            .map_err(|e| ServerError::BlobStorage(format!("Failed to stat blob {id}: {e}")))
    }

    pub async fn get_meta(&self, id: Uuid) -> Result<BlobMeta, ServerError> {
        let raw = match fs::read(self.meta_path(&id)?).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ServerError::BlobNotFound(id));
            }
            Err(e) => {
                return Err(ServerError::BlobStorage(format!(
                    "Failed to read metadata for {id}: {e}"
                )));
            }
        };
        serde_json::from_slice(&raw)
            .map_err(|e| ServerError::BlobStorage(format!("Corrupt metadata for {id}: {e}")))
    }

    pub async fn get_blob(&self, id: Uuid) -> Result<(BlobMeta, Vec<u8>), ServerError> {
        let meta = self.get_meta(id).await?;

        let data = match fs::read(self.blob_path(&id)?).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ServerError::BlobNotFound(id));
            }
            Err(e) => {
                return Err(ServerError::BlobStorage(format!("Failed to read blob {id}: {e}")));
            }
        };

        if blake3::hash(&data).to_hex().as_str() != meta.blake3 {
            warn!(id = %id, "Blob hash mismatch");
        }

        debug!(id = %id, size = data.len(), "Retrieved blob");
        Ok((meta, data))
    }

    pub async fn delete_blob(&self, id: Uuid) -> Result<(), ServerError> {
        let path = self.blob_path(&id)?;
        if !self.contains(id).await? {
            return Err(ServerError::BlobNotFound(id));
        }

        fs::remove_file(&path)
            .await
            .map_err(|e| ServerError::BlobStorage(format!("Failed to delete blob {id}: {e}")))?;
        if let Err(e) = fs::remove_file(self.meta_path(&id)?).await {
            warn!(id = %id, error = %e, "Failed to delete blob metadata");
        }

        debug!(id = %id, "Deleted blob");
        Ok(())
    }

    pub async fn list_blobs(&self) -> Result<Vec<Uuid>, ServerError> {
        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&self.base_path)
            .await
            .map_err(|e| ServerError::BlobStorage(format!("Failed to list blobs: {e}")))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ServerError::BlobStorage(format!("Failed to read directory entry: {e}")))?
        {
            if let Some(name) = entry.file_name().to_str() {
                if let Ok(id) = Uuid::parse_str(name) {
                    ids.push(id);
                }
            }
        }

        Ok(ids)
    }

    fn blob_path(&self, id: &Uuid) -> Result<PathBuf, ServerError> {
        ensure_within(&self.base_path, &self.base_path.join(id.to_string()))
    }

    fn meta_path(&self, id: &Uuid) -> Result<PathBuf, ServerError> {
        ensure_within(&self.base_path, &self.base_path.join(format!("{id}.json")))
    }
}
