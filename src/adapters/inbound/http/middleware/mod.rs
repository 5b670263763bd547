pub mod correlation;
pub mod panic;

pub use correlation::{CORRELATION_ID_HEADER, CorrelationId, correlation_span};
pub use panic::handle_panic;
