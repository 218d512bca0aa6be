pub mod database;
pub mod extraction;
pub mod pdf;
pub mod providers;
pub mod repository;
pub mod storage;

pub use database::MongoDb;
pub use extraction::ExtractionService;
pub use repository::InvoiceRepository;
pub use storage::{BlobFileStore, FileStore, LocalFileStore, StoredFile};
