use crate::services::providers::ProviderKind;
use serde::Deserialize;
use validator::Validate;

/// Body of `POST /api/extract`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    #[validate(length(min = 1, message = "fileId is required"))]
    pub file_id: String,
    pub model: ProviderKind,
}
