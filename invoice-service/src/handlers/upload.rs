use crate::dtos::{ApiResponse, UploadResponse};
use crate::startup::AppState;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| {
            AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
        })?
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("No file uploaded")))?;

    let original_name = field.file_name().unwrap_or("unnamed.pdf").to_string();
    let content_type = field.content_type().unwrap_or("").to_string();

    if content_type != "application/pdf" {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Only PDF files are accepted"
        )));
    }

    // Whole file in memory; uploads are capped well below anything that
    // would make streaming worthwhile.
    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Failed to read file bytes: {}", e)))?
        .to_vec();

    if data.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!("Uploaded file is empty")));
    }

    let max_bytes = state.config.upload.max_bytes;
    if data.len() > max_bytes {
        return Err(AppError::PayloadTooLarge(anyhow::anyhow!(
            "File exceeds the {} byte upload limit",
            max_bytes
        )));
    }

    let stored = state
        .file_store
        .store(data, &original_name)
        .await
        .map_err(|e| {
            tracing::error!("Failed to store uploaded file {}: {}", original_name, e);
            e
        })?;

    tracing::info!(
        file_id = %stored.file_id,
        file_name = %stored.file_name,
        "File uploaded"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            UploadResponse::from(stored),
            "File uploaded successfully",
        )),
    ))
}
