use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use object_store::{
    Attribute, Attributes, ObjectStore as ApacheObjectStore, PutMultipartOptions, WriteMultipart,
    path::Path as ObjectPath,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::{StoredVideo, VideoUpload},
        value_objects::ObjectKey,
    },
    ports::storage::{ByteStream, VideoStore},
};

/// Upper bound on parts being uploaded concurrently for one video
const MAX_INFLIGHT_PARTS: usize = 4;

/// Adapter that implements our VideoStore trait using Apache object_store
pub struct ObjectStoreAdapter {
    inner: Arc<dyn ApacheObjectStore>,
}

impl ObjectStoreAdapter {
    pub fn new(store: Arc<dyn ApacheObjectStore>) -> Self {
        Self { inner: store }
    }

    fn to_object_path(key: &ObjectKey) -> ObjectPath {
        ObjectPath::from(key.as_str())
    }

    /// Drain `body` into `writer`, returning the number of bytes written
    async fn write_body(
        key: &ObjectKey,
        writer: &mut WriteMultipart,
        mut body: ByteStream,
    ) -> StorageResult<u64> {
        let mut received = 0u64;
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(StorageError::Body)?;
            writer
                .wait_for_capacity(MAX_INFLIGHT_PARTS)
                .await
                .map_err(|e| convert_error(key, e))?;
            received += chunk.len() as u64;
            writer.put(chunk);
        }
        Ok(received)
    }
}

/// Map object_store errors, keeping "no such key" apart from everything else
fn convert_error(key: &ObjectKey, err: object_store::Error) -> StorageError {
    match err {
        object_store::Error::NotFound { .. } => StorageError::ObjectNotFound { key: key.clone() },
        other => StorageError::backend_with_source(
            format!("Object store operation failed for {}", key),
            other,
        ),
    }
}

#[async_trait]
impl VideoStore for ObjectStoreAdapter {
    async fn fetch(&self, key: &ObjectKey) -> StorageResult<StoredVideo> {
        let path = Self::to_object_path(key);

        let result = self
            .inner
            .get(&path)
            .await
            .map_err(|e| convert_error(key, e))?;

        let content_type = result.attributes.get(&Attribute::ContentType).map(|value| {
            let value: &str = value.as_ref();
            value.to_string()
        });
        let content_length = result.meta.size;

        debug!(key = %key, content_length, "Opened object for streaming");

        let body = result.into_stream().map_err(std::io::Error::other).boxed();

        Ok(StoredVideo {
            key: key.clone(),
            content_type,
            content_length: Some(content_length),
            body,
        })
    }

    async fn store(&self, upload: VideoUpload, body: ByteStream) -> StorageResult<()> {
        let path = Self::to_object_path(&upload.key);

        let mut attributes = Attributes::new();
        if let Some(content_type) = &upload.content_type {
            attributes.insert(Attribute::ContentType, content_type.clone().into());
        }
        let opts = PutMultipartOptions {
            attributes,
            ..Default::default()
        };

        let multipart = self
            .inner
            .put_multipart_opts(&path, opts)
            .await
            .map_err(|e| convert_error(&upload.key, e))?;
        let mut writer = WriteMultipart::new(multipart);

        let outcome = match Self::write_body(&upload.key, &mut writer, body).await {
            Ok(received) => match upload.content_length {
                Some(declared) if declared != received => Err(StorageError::BodyLengthMismatch {
                    key: upload.key.clone(),
                    declared,
                    received,
                }),
                _ => Ok(received),
            },
            Err(e) => Err(e),
        };

        match outcome {
            Ok(received) => {
                writer
                    .finish()
                    .await
                    .map_err(|e| convert_error(&upload.key, e))?;
                debug!(key = %upload.key, received, "Stored object");
                Ok(())
            }
            Err(e) => {
                if let Err(abort_err) = writer.abort().await {
                    warn!(
                        key = %upload.key,
                        error = %abort_err,
                        "Failed to abort multipart upload"
                    );
                }
                Err(e)
            }
        }
    }
}
