//! Application use cases

pub mod pipeline;
pub mod upload_client;

pub use pipeline::{Pipeline, PipelineOutput};
pub use upload_client::UploadClient;
