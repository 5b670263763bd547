use object_store::memory::InMemory;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tracing::info;

use crate::{
    adapters::outbound::storage::{
        CosIamAdapter, CosSettings, ObjectStoreAdapter, S3Config, create_s3_store,
    },
    config::{Configuration, Credentials},
    domain::errors::StorageError,
    ports::storage::VideoStore,
};

/// Process-wide readiness flag
///
/// Starts false and flips to true once the listener is bound. It never goes
/// back to false.
#[derive(Debug, Default)]
pub struct Readiness(AtomicBool);

impl Readiness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_ready(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Storage backend selection
#[derive(Debug, Clone)]
pub enum StorageBackend {
    InMemory,
    Configured(Configuration),
}

/// Application builder for dependency injection
pub struct AppBuilder {
    backend: StorageBackend,
}

impl AppBuilder {
    /// Create a new application builder backed by memory
    pub fn new() -> Self {
        Self {
            backend: StorageBackend::InMemory,
        }
    }

    /// Use the backend described by a resolved configuration
    pub fn with_config(mut self, config: Configuration) -> Self {
        self.backend = StorageBackend::Configured(config);
        self
    }

    /// Configure storage backend
    pub fn with_storage_backend(mut self, backend: StorageBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Build the storage adapter the HTTP surface talks to
    pub async fn build(self) -> Result<Arc<dyn VideoStore>, AppError> {
        match self.backend {
            StorageBackend::InMemory => {
                info!("Using in-memory storage backend");
                Ok(Arc::new(ObjectStoreAdapter::new(Arc::new(InMemory::new()))))
            }
            StorageBackend::Configured(config) => Self::create_storage_adapter(config),
        }
    }

    fn create_storage_adapter(config: Configuration) -> Result<Arc<dyn VideoStore>, AppError> {
        info!(
            bucket = %config.bucket,
            endpoint = %config.endpoint,
            mode = config.credentials.mode(),
            "Configuring storage backend"
        );

        match config.credentials {
            Credentials::Hmac {
                region,
                access_key_id,
                secret_access_key,
            } => {
                let store = create_s3_store(&S3Config {
                    bucket: config.bucket,
                    region,
                    endpoint: config.endpoint,
                    access_key: access_key_id,
                    secret_key: secret_access_key,
                })
                .map_err(AppError::StorageInit)?;
                Ok(Arc::new(ObjectStoreAdapter::new(store)))
            }
            Credentials::Iam {
                api_key,
                service_instance_id,
            } => {
                let settings = CosSettings::builder()
                    .endpoint(config.endpoint)
                    .bucket(config.bucket)
                    .api_key(api_key)
                    .service_instance_id(service_instance_id)
                    .token_url(config.iam_token_url)
                    .build();
                let adapter = CosIamAdapter::new(settings).map_err(AppError::StorageInit)?;
                Ok(Arc::new(adapter))
            }
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Storage initialization error: {0}")]
    StorageInit(#[source] StorageError),
}

/// Create an in-memory application for testing and development
pub async fn create_in_memory_app() -> Result<Arc<dyn VideoStore>, AppError> {
    AppBuilder::new()
        .with_storage_backend(StorageBackend::InMemory)
        .build()
        .await
}

/// Create the application from a resolved configuration
pub async fn create_app(config: Configuration) -> Result<Arc<dyn VideoStore>, AppError> {
    AppBuilder::new().with_config(config).build().await
}
