pub mod storage;

pub use storage::{ByteStream, VideoStore};
