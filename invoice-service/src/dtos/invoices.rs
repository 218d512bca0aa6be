use crate::models::{Invoice, InvoiceDetails, Vendor};
use crate::services::repository::InvoicePage;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /api/invoices` and `PUT /api/invoices/:id`.
///
/// File identity is optional: the upload/extract flow carries its own
/// `fileId`, while a manually created invoice gets a generated one.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[validate(nested)]
    pub vendor: Vendor,
    #[validate(nested)]
    pub invoice: InvoiceDetails,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceListParams {
    pub q: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
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

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: invoice.id,
            file_id: invoice.file_id,
            file_name: invoice.file_name,
            file_url: invoice.file_url,
            vendor: invoice.vendor,
            invoice: invoice.invoice,
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

/// Payload of `GET /api/invoices`, nested under the envelope's `data`:
/// `{success, data: {data: [...], pagination: {...}}}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedInvoices {
    pub data: Vec<InvoiceResponse>,
    pub pagination: Pagination,
}

impl From<InvoicePage> for PaginatedInvoices {
    fn from(page: InvoicePage) -> Self {
        Self {
            data: page.items.into_iter().map(InvoiceResponse::from).collect(),
            pagination: Pagination {
                page: page.page,
                limit: page.limit,
                total: page.total,
                pages: page.pages,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::ApiResponse;

    #[test]
    fn list_response_nests_pagination_inside_data() {
        let page = PaginatedInvoices::from(InvoicePage {
            items: vec![],
            page: 1,
            limit: 10,
            total: 0,
            pages: 0,
        });

        let body = serde_json::to_value(ApiResponse::ok(page)).unwrap();

        assert_eq!(body["success"], true);
        assert!(body["data"]["data"].as_array().is_some());
        assert_eq!(body["data"]["pagination"]["page"], 1);
        assert_eq!(body["data"]["pagination"]["limit"], 10);
        assert!(body.get("pagination").is_none());
    }
}
