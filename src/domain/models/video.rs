use bytes::Bytes;
use futures::stream::BoxStream;
use std::fmt;

use crate::domain::value_objects::ObjectKey;

/// A body flowing through the proxy chunk by chunk
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// A video fetched from storage, with its body still in flight
pub struct StoredVideo {
    pub key: ObjectKey,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub body: ByteStream,
}

impl fmt::Debug for StoredVideo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredVideo")
            .field("key", &self.key)
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Metadata describing an inbound upload; the body travels separately
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoUpload {
    pub key: ObjectKey,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
}
