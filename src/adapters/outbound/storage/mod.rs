// Storage implementations
pub mod object_store_adapter;

// Provider-specific wiring
pub mod cos;
pub mod s3;

// Re-export key types
pub use cos::{CosIamAdapter, CosSettings};
pub use object_store_adapter::ObjectStoreAdapter;
pub use s3::{S3Config, create_s3_store};

/// Endpoints may be configured as bare host names; those default to HTTPS
pub fn normalize_endpoint(endpoint: &str) -> String {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("https://{}", endpoint)
    }
}
