pub mod extract;
pub mod invoices;
pub mod upload;

pub use extract::ExtractRequest;
pub use invoices::{InvoiceListParams, InvoicePayload, InvoiceResponse, PaginatedInvoices, Pagination};
pub use upload::UploadResponse;

use serde::Serialize;

/// Uniform response envelope: `{success, data?, error?, message?}`.
///
/// Errors never construct this directly; they go through
/// `AppError::into_response`, which emits the same shape with
/// `success: false`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn ok_with_message(data: T, message: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.to_string()),
        }
    }
}

impl ApiResponse<()> {
    pub fn message_only(message: &str) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.to_string()),
        }
    }
}
