pub mod invoice;

pub use invoice::{Invoice, InvoiceDetails, InvoiceDraft, LineItem, Vendor};
