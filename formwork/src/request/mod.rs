//! The slice of an incoming HTTP request the binding pipelines consume.
pub use request_head::RequestHead;

pub mod body;
mod request_head;
