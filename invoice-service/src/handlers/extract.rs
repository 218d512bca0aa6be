use crate::dtos::{ApiResponse, ExtractRequest, InvoiceResponse};
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use service_core::error::AppError;
use validator::Validate;

/// Run the extraction pipeline for an uploaded file and persist the result.
///
/// Nothing is stored when any stage fails, so a failed request can simply be
/// resubmitted, possibly with the other model.
pub async fn extract_invoice(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let draft = state
        .extraction
        .extract(&request.file_id, request.model)
        .await?;

    // Model output that parses but fails field constraints is an extraction
    // failure, not a client error.
    draft.validate().map_err(|e| {
        let fields = service_core::error::flatten_validation_errors(&e)
            .into_iter()
            .map(|f| f.field)
            .collect::<Vec<_>>()
            .join(", ");
        AppError::ExtractionFailed(format!("Extracted data failed validation: {}", fields))
    })?;

    let invoice = state.repository.create(draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            InvoiceResponse::from(invoice),
            "Invoice extracted successfully",
        )),
    ))
}
