pub mod extract;
pub mod health;
pub mod invoices;
pub mod upload;

pub use extract::extract_invoice;
pub use health::health_check;
pub use invoices::{create_invoice, delete_invoice, get_invoice, list_invoices, update_invoice};
pub use upload::upload_file;
