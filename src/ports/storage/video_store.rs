use crate::domain::{
    errors::StorageResult,
    models::{ByteStream, StoredVideo, VideoUpload},
    value_objects::ObjectKey,
};
use async_trait::async_trait;

/// Port for the bucket holding the videos
/// This abstracts the actual storage backend (HMAC S3, IAM-token COS, memory)
#[async_trait]
pub trait VideoStore: Send + Sync + 'static {
    /// Open the object under `key` for streaming.
    ///
    /// Returns [`StorageError::ObjectNotFound`](crate::domain::StorageError::ObjectNotFound)
    /// only when the backend reports that the key does not exist.
    async fn fetch(&self, key: &ObjectKey) -> StorageResult<StoredVideo>;

    /// Write `body` under `upload.key`, forwarding chunks as they arrive.
    async fn store(&self, upload: VideoUpload, body: ByteStream) -> StorageResult<()>;
}
