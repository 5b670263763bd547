//! HMAC-authenticated S3 backend built on the object_store crate

use object_store::{ObjectStore as ObjectStoreBackend, aws::AmazonS3Builder};
use std::sync::Arc;

use super::normalize_endpoint;
use crate::domain::errors::{StorageError, StorageResult};

/// Configuration for the HMAC storage backend
#[derive(Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
}

impl std::fmt::Debug for S3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Config")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .finish_non_exhaustive()
    }
}

/// Create an S3 store from configuration
pub fn create_s3_store(config: &S3Config) -> StorageResult<Arc<dyn ObjectStoreBackend>> {
    let endpoint = normalize_endpoint(&config.endpoint);

    let store = AmazonS3Builder::new()
        .with_bucket_name(&config.bucket)
        .with_region(&config.region)
        .with_endpoint(&endpoint)
        .with_allow_http(endpoint.starts_with("http://"))
        .with_virtual_hosted_style_request(false)
        .with_access_key_id(&config.access_key)
        .with_secret_access_key(&config.secret_key)
        .build()
        .map_err(|e| StorageError::backend_with_source("Failed to build S3 store", e))?;

    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint: &str) -> S3Config {
        S3Config {
            bucket: "videos".to_string(),
            region: "us-south".to_string(),
            endpoint: endpoint.to_string(),
            access_key: "AKIDEXAMPLE".to_string(),
            secret_key: "secret".to_string(),
        }
    }

    #[test]
    fn test_builds_for_bare_and_http_endpoints() {
        assert!(create_s3_store(&config("s3.us-south.example.com")).is_ok());
        assert!(create_s3_store(&config("http://localhost:9000")).is_ok());
    }

    #[test]
    fn test_debug_hides_secret() {
        assert!(!format!("{:?}", config("localhost")).contains("secret\""));
    }
}
