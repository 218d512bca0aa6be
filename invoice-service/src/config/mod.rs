use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Default upload cap: 25MB.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub storage: StorageConfig,
    pub providers: ProviderConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub local_path: String,
    pub blob_token: Option<String>,
    pub blob_api_base: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
    Blob,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub groq_api_key: Option<String>,
    pub groq_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub max_bytes: usize,
}

impl InvoiceConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;
        let is_prod = core_config::is_prod();

        let config = InvoiceConfig {
            common: common_config,
            mongodb: MongoConfig {
                uri: core_config::get_env("MONGODB_URI", None, is_prod)?,
                database: core_config::get_env("MONGODB_DATABASE", Some("invoice_db"), is_prod)?,
            },
            storage: StorageConfig {
                backend: core_config::get_env("STORAGE_BACKEND", Some("local"), is_prod)?
                    .parse()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
                local_path: core_config::get_env("STORAGE_LOCAL_PATH", Some("storage"), is_prod)?,
                blob_token: env::var("BLOB_READ_WRITE_TOKEN").ok(),
                blob_api_base: core_config::get_env(
                    "BLOB_API_BASE",
                    Some("https://blob.vercel-storage.com"),
                    is_prod,
                )?,
            },
            providers: ProviderConfig {
                gemini_api_key: env::var("GEMINI_API_KEY").ok(),
                gemini_model: core_config::get_env("GEMINI_MODEL", Some("gemini-pro"), is_prod)?,
                groq_api_key: env::var("GROQ_API_KEY").ok(),
                groq_model: core_config::get_env(
                    "GROQ_MODEL",
                    Some("llama-3.1-8b-instant"),
                    is_prod,
                )?,
            },
            upload: UploadConfig {
                max_bytes: core_config::get_env(
                    "MAX_UPLOAD_BYTES",
                    Some(&DEFAULT_MAX_UPLOAD_BYTES.to_string()),
                    is_prod,
                )?
                .parse()
                .map_err(|e| {
                    AppError::ConfigError(anyhow::anyhow!("Invalid MAX_UPLOAD_BYTES: {}", e))
                })?,
            },
        };

        // A blob backend without a token used to degrade to a placeholder URL
        // that never persisted anything. Refuse to start instead.
        if config.storage.backend == StorageBackend::Blob && config.storage.blob_token.is_none() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "STORAGE_BACKEND=blob requires BLOB_READ_WRITE_TOKEN to be set"
            )));
        }

        Ok(config)
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(StorageBackend::Local),
            "blob" => Ok(StorageBackend::Blob),
            _ => Err(format!("Invalid storage backend: {}", s)),
        }
    }
}
