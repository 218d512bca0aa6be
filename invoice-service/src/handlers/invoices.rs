use crate::dtos::{ApiResponse, InvoiceListParams, InvoicePayload, InvoiceResponse, PaginatedInvoices};
use crate::models::InvoiceDraft;
use crate::services::repository::{normalize_limit, normalize_page};
use crate::startup::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

pub async fn list_invoices(
    State(state): State<AppState>,
    Query(params): Query<InvoiceListParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = params.q.unwrap_or_default();
    let page = normalize_page(params.page);
    let limit = normalize_limit(params.limit);

    let result = state.repository.list(query.trim(), page, limit).await?;

    Ok(Json(ApiResponse::ok(PaginatedInvoices::from(result))))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = state
        .repository
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

    Ok(Json(ApiResponse::ok(InvoiceResponse::from(invoice))))
}

/// Create an invoice from a client-supplied payload, bypassing extraction.
/// A missing `fileId` gets a generated one so the uniqueness invariant holds.
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(payload): Json<InvoicePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let file_id = payload
        .file_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let file_name = payload
        .file_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| format!("{}.pdf", file_id));

    let draft = InvoiceDraft {
        file_id,
        file_name,
        file_url: payload.file_url,
        vendor: payload.vendor,
        invoice: payload.invoice,
    };

    let invoice = state.repository.create(draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            InvoiceResponse::from(invoice),
            "Invoice created successfully",
        )),
    ))
}

pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<InvoicePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let invoice = state
        .repository
        .update(&id, &payload.vendor, &payload.invoice)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

    Ok(Json(ApiResponse::ok_with_message(
        InvoiceResponse::from(invoice),
        "Invoice updated successfully",
    )))
}

/// Delete an invoice and, best-effort, its backing file. A file cleanup
/// failure is logged but never fails the request; the record is already gone.
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = state
        .repository
        .delete(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

    if let Err(e) = state.file_store.delete(&invoice.file_id).await {
        tracing::warn!(
            invoice_id = %invoice.id,
            file_id = %invoice.file_id,
            error = %e,
            "Failed to delete backing file"
        );
    }

    Ok(Json(ApiResponse::message_only(
        "Invoice deleted successfully",
    )))
}
