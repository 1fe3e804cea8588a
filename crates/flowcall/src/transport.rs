use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;

use crate::errors::TransportError;
use crate::models::request::WorkflowRequest;

pub mod http;

#[cfg(test)]
pub mod mock;

pub use http::{HttpTransport, HttpTransportConfig};

/// Raw text chunks of a streamed call, in arrival order
pub type ChunkStream = BoxStream<'static, Result<String, TransportError>>;

/// Invokes a named remote procedure with a workflow request
#[async_trait]
pub trait Transport: Send + Sync {
    /// One-shot call returning the decoded response payload
    async fn call(
        &self,
        procedure: &str,
        request: &WorkflowRequest<'_>,
    ) -> Result<Value, TransportError>;

    /// Streaming call. Chunks are produced only as the returned stream is polled.
    async fn call_stream(
        &self,
        procedure: &str,
        request: &WorkflowRequest<'_>,
    ) -> Result<ChunkStream, TransportError>;
}
