use crate::models::Invoice;
use mongodb::{
    bson::doc, options::IndexOptions, Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for invoice-service");

        let invoices = self.invoices();

        // Unique index on fileId: one invoice per uploaded file
        let file_id_index = IndexModel::builder()
            .keys(doc! { "fileId": 1 })
            .options(
                IndexOptions::builder()
                    .name("file_id_unique".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        invoices.create_index(file_id_index, None).await.map_err(|e| {
            tracing::error!("Failed to create fileId index on invoices collection: {}", e);
            AppError::from(e)
        })?;
        tracing::info!("Created unique index on invoices.fileId");

        // createdAt descending for newest-first listing
        let created_at_index = IndexModel::builder()
            .keys(doc! { "createdAt": -1 })
            .options(
                IndexOptions::builder()
                    .name("created_at_desc".to_string())
                    .build(),
            )
            .build();

        invoices
            .create_index(created_at_index, None)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to create createdAt index on invoices collection: {}",
                    e
                );
                AppError::from(e)
            })?;
        tracing::info!("Created index on invoices.createdAt");

        // Compound index backing the vendor-name / invoice-number search
        let search_index = IndexModel::builder()
            .keys(doc! { "vendor.name": 1, "invoice.number": 1 })
            .options(
                IndexOptions::builder()
                    .name("search_fields".to_string())
                    .build(),
            )
            .build();

        invoices.create_index(search_index, None).await.map_err(|e| {
            tracing::error!("Failed to create search index on invoices collection: {}", e);
            AppError::from(e)
        })?;
        tracing::info!("Created index on invoices.(vendor.name, invoice.number)");

        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    pub fn invoices(&self) -> Collection<Invoice> {
        self.db.collection("invoices")
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }
}
