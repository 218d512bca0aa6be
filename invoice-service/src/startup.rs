use crate::config::{InvoiceConfig, StorageBackend};
use crate::handlers;
use crate::services::providers::ProviderRegistry;
use crate::services::{
    BlobFileStore, ExtractionService, FileStore, InvoiceRepository, LocalFileStore, MongoDb,
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: InvoiceConfig,
    pub db: MongoDb,
    pub repository: InvoiceRepository,
    pub file_store: Arc<dyn FileStore>,
    pub extraction: Arc<ExtractionService>,
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    pub async fn build(config: InvoiceConfig) -> Result<Self, AppError> {
        let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to MongoDB: {}", e);
                e
            })?;
        db.initialize_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            e
        })?;

        let file_store: Arc<dyn FileStore> = match config.storage.backend {
            StorageBackend::Local => Arc::new(
                LocalFileStore::new(&config.storage.local_path)
                    .await
                    .map_err(|e| {
                        tracing::error!(
                            "Failed to initialize local storage at {}: {}",
                            config.storage.local_path,
                            e
                        );
                        e
                    })?,
            ),
            StorageBackend::Blob => {
                let token = config.storage.blob_token.as_ref().ok_or_else(|| {
                    AppError::ConfigError(anyhow::anyhow!(
                        "Blob storage selected but BLOB_READ_WRITE_TOKEN is not set"
                    ))
                })?;
                Arc::new(BlobFileStore::new(&config.storage.blob_api_base, token))
            }
        };

        let providers = Arc::new(ProviderRegistry::from_config(&config.providers));
        let extraction = Arc::new(ExtractionService::new(file_store.clone(), providers));

        let state = AppState {
            config: config.clone(),
            db: db.clone(),
            repository: InvoiceRepository::new(db),
            file_store,
            extraction,
        };

        let api = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/upload", post(handlers::upload_file))
            .route("/extract", post(handlers::extract_invoice))
            .route(
                "/invoices",
                get(handlers::list_invoices).post(handlers::create_invoice),
            )
            .route(
                "/invoices/:id",
                get(handlers::get_invoice)
                    .put(handlers::update_invoice)
                    .delete(handlers::delete_invoice),
            );

        let app = Router::new()
            .nest("/api", api)
            // Leave headroom over the upload cap; the handler enforces the
            // exact limit with a 413.
            .layer(DefaultBodyLimit::max(config.upload.max_bytes + 64 * 1024))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn db(&self) -> &MongoDb {
        &self.state.db
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
