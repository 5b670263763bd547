use async_trait::async_trait;
use bon::Builder;
use bytes::Bytes;
use futures::{SinkExt, StreamExt, TryStreamExt, channel::mpsc};
use reqwest::{
    Client, Response, StatusCode, Url,
    header::{CONTENT_LENGTH, CONTENT_TYPE},
};
use tracing::debug;

use super::{error_document::ErrorDocument, token::IamTokenProvider};
use crate::{
    adapters::outbound::storage::normalize_endpoint,
    domain::{
        errors::{StorageError, StorageResult},
        models::{StoredVideo, VideoUpload},
        value_objects::ObjectKey,
    },
    ports::storage::{ByteStream, VideoStore},
};

const SERVICE_INSTANCE_HEADER: &str = "ibm-service-instance-id";

/// Chunks buffered between the inbound body and the outbound request
const UPLOAD_CHANNEL_CAPACITY: usize = 8;

/// Settings for the IAM-authenticated object storage backend
#[derive(Builder, Clone)]
pub struct CosSettings {
    #[builder(into)]
    pub endpoint: String,
    #[builder(into)]
    pub bucket: String,
    #[builder(into)]
    pub api_key: String,
    #[builder(into)]
    pub service_instance_id: String,
    #[builder(into)]
    pub token_url: String,
}

impl std::fmt::Debug for CosSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CosSettings")
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("service_instance_id", &self.service_instance_id)
            .field("token_url", &self.token_url)
            .finish_non_exhaustive()
    }
}

/// Object storage client authenticating with IAM bearer tokens
///
/// Speaks the S3 REST object API directly: `GET`/`PUT {endpoint}/{bucket}/{key}`.
pub struct CosIamAdapter {
    client: Client,
    endpoint: Url,
    bucket: String,
    service_instance_id: String,
    tokens: IamTokenProvider,
}

impl CosIamAdapter {
    pub fn new(settings: CosSettings) -> StorageResult<Self> {
        let endpoint = Url::parse(&normalize_endpoint(&settings.endpoint)).map_err(|e| {
            StorageError::backend_with_source(
                format!("Invalid storage endpoint: {}", settings.endpoint),
                e,
            )
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(StorageError::backend(format!(
                "Invalid storage endpoint: {}",
                settings.endpoint
            )));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| StorageError::backend_with_source("Failed to build HTTP client", e))?;

        Ok(Self {
            tokens: IamTokenProvider::new(client.clone(), settings.token_url, settings.api_key),
            client,
            endpoint,
            bucket: settings.bucket,
            service_instance_id: settings.service_instance_id,
        })
    }

    /// `{endpoint}/{bucket}/{key}` with each key segment percent-encoded
    fn object_url(&self, key: &ObjectKey) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(&self.bucket)
                .extend(key.as_str().split('/'));
        }
        url
    }

    async fn error_from_response(
        key: &ObjectKey,
        operation: &str,
        response: Response,
    ) -> StorageError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let document = ErrorDocument::parse(&body);

        if status == StatusCode::NOT_FOUND && document.is_no_such_key() {
            return StorageError::ObjectNotFound { key: key.clone() };
        }

        StorageError::backend(format!(
            "Failed to {} {}: {} {} {}",
            operation,
            key,
            status,
            document.code,
            document.message.unwrap_or_default()
        ))
    }
}

#[async_trait]
impl VideoStore for CosIamAdapter {
    async fn fetch(&self, key: &ObjectKey) -> StorageResult<StoredVideo> {
        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .get(self.object_url(key))
            .bearer_auth(token)
            .header(SERVICE_INSTANCE_HEADER, &self.service_instance_id)
            .send()
            .await
            .map_err(|e| StorageError::backend_with_source(format!("Failed to get {}", key), e))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(key, "get", response).await);
        }

        let headers = response.headers();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let content_length = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        debug!(key = %key, ?content_length, "Opened object for streaming");

        Ok(StoredVideo {
            key: key.clone(),
            content_type,
            content_length,
            body: response.bytes_stream().map_err(std::io::Error::other).boxed(),
        })
    }

    async fn store(&self, upload: VideoUpload, body: ByteStream) -> StorageResult<()> {
        let token = self.tokens.access_token().await?;

        let mut request = self
            .client
            .put(self.object_url(&upload.key))
            .bearer_auth(token)
            .header(SERVICE_INSTANCE_HEADER, &self.service_instance_id);
        if let Some(content_type) = &upload.content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }
        if let Some(content_length) = upload.content_length {
            request = request.header(CONTENT_LENGTH, content_length);
        }

        // reqwest wants a Sync body stream, so chunks are relayed through a
        // bounded channel that is driven alongside the request
        let (mut tx, rx) = mpsc::channel::<std::io::Result<Bytes>>(UPLOAD_CHANNEL_CAPACITY);
        let relay = async move {
            let mut body = body;
            while let Some(chunk) = body.next().await {
                match chunk {
                    Ok(bytes) => {
                        // The receiver is gone once the request has finished or failed
                        if tx.send(Ok(bytes)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        let _ = tx
                            .send(Err(std::io::Error::new(e.kind(), "request body stream failed")))
                            .await;
                        return Err(StorageError::Body(e));
                    }
                }
            }
            Ok(())
        };
        let send = request.body(reqwest::Body::wrap_stream(rx)).send();

        let (relayed, response) = tokio::join!(relay, send);
        relayed?;
        let response = response.map_err(|e| {
            StorageError::backend_with_source(format!("Failed to put {}", upload.key), e)
        })?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(&upload.key, "put", response).await);
        }

        debug!(key = %upload.key, "Stored object");
        Ok(())
    }
}
