use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Vendor embedded in an invoice. No identity of its own.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    #[serde(default)]
    #[validate(length(min = 1, message = "vendor name is required"))]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
}

/// One line of an invoice. Order of appearance is document order.
///
/// `total == unit_price * quantity` is deliberately not enforced; the edit
/// form recomputes it client-side and the backend stores what it is given.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    #[validate(length(min = 1, message = "line item description is required"))]
    pub description: String,
    #[validate(range(min = 0.0, message = "unit price must be non-negative"))]
    pub unit_price: f64,
    #[validate(range(min = 0.0, message = "quantity must be non-negative"))]
    pub quantity: f64,
    #[validate(range(min = 0.0, message = "total must be non-negative"))]
    pub total: f64,
}

/// Invoice-level details embedded in an invoice.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetails {
    #[serde(default)]
    #[validate(length(min = 1, message = "invoice number is required"))]
    pub number: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "invoice date is required"))]
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "subtotal must be non-negative"))]
    pub subtotal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 100.0, message = "tax percent must be between 0 and 100"))]
    pub tax_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "total must be non-negative"))]
    pub total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub po_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub po_date: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub line_items: Vec<LineItem>,
}

/// An invoice payload lacking persisted identity and timestamps. Produced by
/// extraction or assembled from a create request; consumed by persistence.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    pub file_id: String,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[validate(nested)]
    pub vendor: Vendor,
    #[validate(nested)]
    pub invoice: InvoiceDetails,
}

/// Persisted invoice record (collection `invoices`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(rename = "_id")]
    pub id: String,
    pub file_id: String,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    pub vendor: Vendor,
    pub invoice: InvoiceDetails,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Invoice {
    /// Promote a draft to a persisted record, stamping identity and
    /// `createdAt`. Timestamps are RFC 3339 strings so the `createdAt` sort
    /// index orders them chronologically.
    pub fn from_draft(draft: InvoiceDraft) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            file_id: draft.file_id,
            file_name: draft.file_name,
            file_url: draft.file_url,
            vendor: draft.vendor,
            invoice: draft.invoice,
            created_at: Utc::now().to_rfc3339(),
            updated_at: None,
        }
    }
}
