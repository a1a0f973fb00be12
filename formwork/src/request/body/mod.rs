//! The buffered request body the binding pipelines consume.
pub use buffered_body::BufferedBody;

mod buffered_body;
