use crate::models::{Invoice, InvoiceDetails, InvoiceDraft, Vendor};
use crate::services::database::MongoDb;
use chrono::Utc;
use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use service_core::error::AppError;

pub const DEFAULT_PAGE_LIMIT: u64 = 10;
pub const MAX_PAGE_LIMIT: u64 = 100;

/// One page of a listing.
#[derive(Debug)]
pub struct InvoicePage {
    pub items: Vec<Invoice>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

#[derive(Clone)]
pub struct InvoiceRepository {
    db: MongoDb,
}

impl InvoiceRepository {
    pub fn new(db: MongoDb) -> Self {
        Self { db }
    }

    /// Persist a draft, stamping `createdAt`. A second invoice for the same
    /// `fileId` is rejected by the unique index and surfaces as a conflict,
    /// leaving the store unchanged.
    pub async fn create(&self, draft: InvoiceDraft) -> Result<Invoice, AppError> {
        let invoice = Invoice::from_draft(draft);

        self.db
            .invoices()
            .insert_one(&invoice, None)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    AppError::Conflict(anyhow::anyhow!(
                        "An invoice for fileId {} already exists",
                        invoice.file_id
                    ))
                } else {
                    tracing::error!("Failed to insert invoice {}: {}", invoice.id, e);
                    AppError::from(e)
                }
            })?;

        tracing::info!(
            invoice_id = %invoice.id,
            file_id = %invoice.file_id,
            "Invoice created"
        );

        Ok(invoice)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Invoice>, AppError> {
        let invoice = self
            .db
            .invoices()
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(AppError::from)?;
        Ok(invoice)
    }

    /// List invoices newest-first. `query` is matched case-insensitively as
    /// a substring of `vendor.name` or `invoice.number`; empty matches all.
    pub async fn list(&self, query: &str, page: u64, limit: u64) -> Result<InvoicePage, AppError> {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_LIMIT);
        let skip = (page - 1) * limit;

        let filter = if query.is_empty() {
            doc! {}
        } else {
            let pattern = escape_regex(query);
            doc! {
                "$or": [
                    { "vendor.name": { "$regex": &pattern, "$options": "i" } },
                    { "invoice.number": { "$regex": &pattern, "$options": "i" } },
                ]
            }
        };

        let total = self
            .db
            .invoices()
            .count_documents(filter.clone(), None)
            .await
            .map_err(AppError::from)?;

        let find_options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .skip(skip)
            .limit(limit as i64)
            .build();

        let mut cursor = self
            .db
            .invoices()
            .find(filter, find_options)
            .await
            .map_err(AppError::from)?;

        let mut items = Vec::new();
        while let Some(invoice) = cursor.try_next().await.map_err(AppError::from)? {
            items.push(invoice);
        }

        Ok(InvoicePage {
            items,
            page,
            limit,
            total,
            pages: pages_for(total, limit),
        })
    }

    /// Replace `vendor` and `invoice` wholesale and stamp `updatedAt`.
    /// Returns the post-update document, or `None` when the id is unknown.
    pub async fn update(
        &self,
        id: &str,
        vendor: &Vendor,
        details: &InvoiceDetails,
    ) -> Result<Option<Invoice>, AppError> {
        let vendor_bson = mongodb::bson::to_bson(vendor)
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to encode vendor: {}", e)))?;
        let details_bson = mongodb::bson::to_bson(details).map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Failed to encode invoice details: {}", e))
        })?;

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .db
            .invoices()
            .find_one_and_update(
                doc! { "_id": id },
                doc! { "$set": {
                    "vendor": vendor_bson,
                    "invoice": details_bson,
                    "updatedAt": Utc::now().to_rfc3339(),
                } },
                options,
            )
            .await
            .map_err(AppError::from)?;

        if let Some(ref invoice) = updated {
            tracing::info!(invoice_id = %invoice.id, "Invoice updated");
        }

        Ok(updated)
    }

    /// Remove an invoice, returning the deleted record so callers can clean
    /// up the backing file. `None` when the id is unknown.
    pub async fn delete(&self, id: &str) -> Result<Option<Invoice>, AppError> {
        let deleted = self
            .db
            .invoices()
            .find_one_and_delete(doc! { "_id": id }, None)
            .await
            .map_err(AppError::from)?;

        if let Some(ref invoice) = deleted {
            tracing::info!(invoice_id = %invoice.id, file_id = %invoice.file_id, "Invoice deleted");
        }

        Ok(deleted)
    }
}

/// Normalize a requested page number: positive, defaulting to 1.
pub fn normalize_page(page: Option<u64>) -> u64 {
    page.unwrap_or(1).max(1)
}

/// Normalize a requested page size into 1..=MAX_PAGE_LIMIT, default 10.
pub fn normalize_limit(limit: Option<u64>) -> u64 {
    limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT)
}

fn pages_for(total: u64, limit: u64) -> u64 {
    (total as f64 / limit as f64).ceil() as u64
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        &*err.kind,
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000
    )
}

/// Escape regex metacharacters so a search term is matched literally.
fn escape_regex(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(
            c,
            '.' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '|' | '\\' | '/'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
