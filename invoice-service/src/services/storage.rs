use async_trait::async_trait;
use serde::Deserialize;
use service_core::error::AppError;
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

/// Key prefix under which uploaded PDFs are stored.
const KEY_PREFIX: &str = "pdfs";

/// Result of storing a file.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub file_id: String,
    pub file_name: String,
    pub file_url: Option<String>,
}

/// Gateway to the blob store.
///
/// The `file_id` handed out by `store` is a fresh UUID, independent of the
/// provider's own addressing; `fetch` and `delete` resolve it by scanning
/// stored object names for one containing the id as a substring. That scan is
/// O(number of stored objects) and is acceptable only at small scale; a
/// higher-scale deployment would maintain a fileId-to-key index instead.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store `data`, returning the generated `file_id` and, where the
    /// backend exposes one, a public URL.
    async fn store(&self, data: Vec<u8>, original_name: &str) -> Result<StoredFile, AppError>;

    /// Fetch a file's bytes. `None` when no stored object matches.
    async fn fetch(&self, file_id: &str) -> Result<Option<Vec<u8>>, AppError>;

    /// Best-effort delete: logs and returns when the file is already gone.
    async fn delete(&self, file_id: &str) -> Result<(), AppError>;
}

/// Build the storage key for a new upload.
fn object_key(file_id: &str, original_name: &str) -> String {
    format!("{}/{}-{}", KEY_PREFIX, file_id, sanitize_file_name(original_name))
}

/// Restrict stored names to a filesystem- and URL-safe alphabet.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

// ============================================================================
// Local filesystem backend
// ============================================================================

pub struct LocalFileStore {
    base_path: PathBuf,
}

impl LocalFileStore {
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let base_path = base_path.into();
        let prefix_dir = base_path.join(KEY_PREFIX);
        if !prefix_dir.exists() {
            fs::create_dir_all(&prefix_dir).await?;
        }
        Ok(Self { base_path })
    }

    /// Scan the storage directory for the entry whose name contains
    /// `file_id`. Mirrors the blob backend's prefix-list-and-scan lookup.
    async fn find_entry(&self, file_id: &str) -> Result<Option<PathBuf>, AppError> {
        let dir = self.base_path.join(KEY_PREFIX);
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_name().to_string_lossy().contains(file_id) {
                return Ok(Some(entry.path()));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn store(&self, data: Vec<u8>, original_name: &str) -> Result<StoredFile, AppError> {
        let file_id = Uuid::new_v4().to_string();
        let key = object_key(&file_id, original_name);
        let path = self.base_path.join(&key);

        fs::write(&path, data).await?;

        tracing::info!(file_id = %file_id, key = %key, "File stored locally");
        Ok(StoredFile {
            file_id,
            file_name: original_name.to_string(),
            file_url: None,
        })
    }

    async fn fetch(&self, file_id: &str) -> Result<Option<Vec<u8>>, AppError> {
        match self.find_entry(file_id).await? {
            Some(path) => Ok(Some(fs::read(path).await?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, file_id: &str) -> Result<(), AppError> {
        match self.find_entry(file_id).await? {
            Some(path) => {
                fs::remove_file(path).await?;
                tracing::info!(file_id = %file_id, "File deleted");
            }
            None => {
                tracing::warn!(file_id = %file_id, "File not found for deletion");
            }
        }
        Ok(())
    }
}

// ============================================================================
// Blob storage backend (Vercel-Blob-style REST API)
// ============================================================================

pub struct BlobFileStore {
    client: reqwest::Client,
    api_base: String,
    token: String,
}

impl BlobFileStore {
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_base: api_base.into(),
            token: token.into(),
        }
    }

    /// List stored blobs under the PDF prefix and find the one whose
    /// pathname contains `file_id`.
    async fn find_blob(&self, file_id: &str) -> Result<Option<BlobInfo>, AppError> {
        let response = self
            .client
            .get(&self.api_base)
            .query(&[("prefix", format!("{}/", KEY_PREFIX))])
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("Blob list failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::InternalError(anyhow::anyhow!(
                "Blob list failed with status {}",
                response.status()
            )));
        }

        let listing: BlobListResponse = response.json().await.map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Failed to parse blob listing: {}", e))
        })?;

        Ok(listing
            .blobs
            .into_iter()
            .find(|blob| blob.pathname.contains(file_id)))
    }
}

#[async_trait]
impl FileStore for BlobFileStore {
    async fn store(&self, data: Vec<u8>, original_name: &str) -> Result<StoredFile, AppError> {
        let file_id = Uuid::new_v4().to_string();
        let key = object_key(&file_id, original_name);

        let response = self
            .client
            .put(format!("{}/{}", self.api_base, key))
            .bearer_auth(&self.token)
            .header("x-content-type", "application/pdf")
            .body(data)
            .send()
            .await
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("Blob upload failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::InternalError(anyhow::anyhow!(
                "Blob upload failed with status {}",
                response.status()
            )));
        }

        let blob: BlobPutResponse = response.json().await.map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Failed to parse blob upload response: {}", e))
        })?;

        tracing::info!(file_id = %file_id, key = %key, url = %blob.url, "File stored in blob storage");
        Ok(StoredFile {
            file_id,
            file_name: original_name.to_string(),
            file_url: Some(blob.url),
        })
    }

    async fn fetch(&self, file_id: &str) -> Result<Option<Vec<u8>>, AppError> {
        let Some(blob) = self.find_blob(file_id).await? else {
            return Ok(None);
        };

        let response = self.client.get(&blob.url).send().await.map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Blob download failed: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(AppError::InternalError(anyhow::anyhow!(
                "Blob download failed with status {}",
                response.status()
            )));
        }

        let bytes = response.bytes().await.map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Blob download failed: {}", e))
        })?;
        Ok(Some(bytes.to_vec()))
    }

    async fn delete(&self, file_id: &str) -> Result<(), AppError> {
        let Some(blob) = self.find_blob(file_id).await? else {
            tracing::warn!(file_id = %file_id, "File not found for deletion");
            return Ok(());
        };

        let response = self
            .client
            .post(format!("{}/delete", self.api_base))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "urls": [blob.url] }))
            .send()
            .await
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("Blob delete failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::InternalError(anyhow::anyhow!(
                "Blob delete failed with status {}",
                response.status()
            )));
        }

        tracing::info!(file_id = %file_id, "File deleted from blob storage");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct BlobPutResponse {
    url: String,
    #[allow(dead_code)]
    pathname: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BlobListResponse {
    #[serde(default)]
    blobs: Vec<BlobInfo>,
}

#[derive(Debug, Deserialize)]
struct BlobInfo {
    url: String,
    pathname: String,
}
