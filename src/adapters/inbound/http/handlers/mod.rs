pub mod health_handlers;
pub mod video_handlers;

pub use health_handlers::*;
pub use video_handlers::*;
