mod video_store;

pub use crate::domain::models::ByteStream;
pub use video_store::VideoStore;
