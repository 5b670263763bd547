pub mod adapters;
pub mod app;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;

// Re-export key types for convenience

// Domain types - value objects, models and errors
pub use domain::{
    DomainValidationError, ObjectKey, StorageError, StorageResult, StoredVideo, VideoUpload,
};

// Port types - interfaces for external systems
pub use ports::{ByteStream, VideoStore};

// Configuration
pub use config::{ConfigError, Configuration, Credentials, LogTags};

// Application factory
pub use app::{
    AppBuilder, AppError, Readiness, StorageBackend, create_app, create_in_memory_app,
};

// Adapter types - infrastructure implementations
pub use adapters::outbound::storage::{CosIamAdapter, CosSettings, ObjectStoreAdapter};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        AppBuilder, Configuration, ObjectKey, ObjectStoreAdapter, Readiness, VideoStore,
        adapters::inbound::http::router::{AppState, create_router},
        create_app, create_in_memory_app,
    };
}
