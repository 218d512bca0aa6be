use crate::services::storage::StoredFile;
use serde::{Deserialize, Serialize};

/// Body of a successful `POST /api/upload` response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_id: String,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

impl From<StoredFile> for UploadResponse {
    fn from(stored: StoredFile) -> Self {
        Self {
            file_id: stored.file_id,
            file_name: stored.file_name,
            file_url: stored.file_url,
        }
    }
}
