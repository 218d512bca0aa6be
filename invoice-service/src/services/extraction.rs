//! The extraction pipeline: fetch file, extract text, prompt the selected
//! model, parse and validate the response into an invoice draft.

use crate::models::{InvoiceDetails, InvoiceDraft, Vendor};
use crate::services::pdf::{self, PdfTextError};
use crate::services::providers::{ProviderError, ProviderKind, ProviderRegistry};
use crate::services::storage::FileStore;
use serde::Deserialize;
use service_core::error::AppError;
use std::sync::Arc;
use thiserror::Error;

/// Instructional prompt: schema description followed by the invoice text.
const EXTRACTION_PROMPT: &str = r#"You are an AI assistant that extracts structured data from invoice text.
Extract the following information and return it as a JSON object:

{
  "fileId": "string",
  "fileName": "string",
  "vendor": {
    "name": "string",
    "address": "string (optional)",
    "taxId": "string (optional)"
  },
  "invoice": {
    "number": "string",
    "date": "string (YYYY-MM-DD format)",
    "currency": "string (optional)",
    "subtotal": "number (optional)",
    "taxPercent": "number (optional)",
    "total": "number (optional)",
    "poNumber": "string (optional)",
    "poDate": "string (optional, YYYY-MM-DD format)",
    "lineItems": [
      {
        "description": "string",
        "unitPrice": "number",
        "quantity": "number",
        "total": "number"
      }
    ]
  }
}

Extract data from this invoice text and return ONLY the JSON object, no other text:"#;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error(transparent)]
    Pdf(#[from] PdfTextError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Invalid extraction result: {0}")]
    InvalidResult(String),

    #[error("Storage error: {0}")]
    Storage(AppError),
}

/// The extraction path surfaces every failure as a 500 with a message; the
/// caller is expected to resubmit, possibly with the other provider.
impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        AppError::ExtractionFailed(err.to_string())
    }
}

/// The untrusted shape parsed out of a model response. Everything is
/// optional; nothing here reaches persistence without being promoted to an
/// `InvoiceDraft` first.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExtraction {
    #[allow(dead_code)]
    file_id: Option<String>,
    file_name: Option<String>,
    vendor: Option<Vendor>,
    invoice: Option<InvoiceDetails>,
}

pub struct ExtractionService {
    file_store: Arc<dyn FileStore>,
    providers: Arc<ProviderRegistry>,
}

impl ExtractionService {
    pub fn new(file_store: Arc<dyn FileStore>, providers: Arc<ProviderRegistry>) -> Self {
        Self {
            file_store,
            providers,
        }
    }

    /// Run the pipeline for an uploaded file. Strictly sequential, no retry,
    /// nothing persisted here; the draft goes to the repository on success.
    pub async fn extract(
        &self,
        file_id: &str,
        kind: ProviderKind,
    ) -> Result<InvoiceDraft, ExtractionError> {
        let bytes = self
            .file_store
            .fetch(file_id)
            .await
            .map_err(ExtractionError::Storage)?
            .ok_or_else(|| ExtractionError::FileNotFound(file_id.to_string()))?;

        let text = pdf::extract_text(&bytes)?;

        let provider = self.providers.select(kind)?;

        tracing::info!(
            file_id = %file_id,
            provider = provider.name(),
            text_len = text.len(),
            "Running invoice extraction"
        );

        let prompt = build_prompt(&text);
        let response = provider.complete(&prompt).await?;

        let draft = parse_model_response(file_id, &response)?;

        tracing::info!(
            file_id = %file_id,
            vendor = %draft.vendor.name,
            invoice_number = %draft.invoice.number,
            "Extraction complete"
        );

        Ok(draft)
    }
}

fn build_prompt(invoice_text: &str) -> String {
    format!("{}\n\n{}", EXTRACTION_PROMPT, invoice_text)
}

/// Parse a raw model response into a draft.
///
/// Responses are not guaranteed to contain only JSON, so the first `{` to the
/// last `}` is carved out and parsed. The caller-supplied `file_id` always
/// overwrites whatever the model produced.
fn parse_model_response(file_id: &str, response: &str) -> Result<InvoiceDraft, ExtractionError> {
    let json = carve_json_object(response).ok_or_else(|| {
        ExtractionError::MalformedResponse("no JSON object in model response".to_string())
    })?;

    let raw: RawExtraction = serde_json::from_str(json)
        .map_err(|e| ExtractionError::MalformedResponse(e.to_string()))?;

    let vendor = raw
        .vendor
        .ok_or_else(|| ExtractionError::InvalidResult("missing vendor".to_string()))?;
    let invoice = raw
        .invoice
        .ok_or_else(|| ExtractionError::InvalidResult("missing invoice".to_string()))?;

    let file_name = raw
        .file_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| format!("{}.pdf", file_id));

    Ok(InvoiceDraft {
        file_id: file_id.to_string(),
        file_name,
        file_url: None,
        vendor,
        invoice,
    })
}

/// Greedy brace-delimited match: everything from the first `{` to the last
/// `}`. Best-effort, tolerating preamble/postamble text around the JSON.
fn carve_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}
