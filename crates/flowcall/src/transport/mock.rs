use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{ChunkStream, Transport};
use crate::errors::TransportError;
use crate::models::request::WorkflowRequest;

/// A transport that serves canned responses and records what it was asked to send
#[derive(Default)]
pub struct MockTransport {
    response: Mutex<Option<Result<Value, TransportError>>>,
    chunks: Mutex<Vec<Result<String, TransportError>>>,
    requests: Mutex<Vec<(String, Value)>>,
    pulled: Arc<AtomicUsize>,
}

impl MockTransport {
    pub fn with_response(response: Value) -> Self {
        Self {
            response: Mutex::new(Some(Ok(response))),
            ..Default::default()
        }
    }

    pub fn with_error(error: TransportError) -> Self {
        Self {
            response: Mutex::new(Some(Err(error))),
            ..Default::default()
        }
    }

    pub fn with_chunks(chunks: Vec<Result<String, TransportError>>) -> Self {
        Self {
            chunks: Mutex::new(chunks),
            ..Default::default()
        }
    }

    /// Procedure names and serialized requests, in call order
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }

    /// How many chunks the consumer has pulled from the streamed response
    pub fn pulled_chunks(&self) -> usize {
        self.pulled.load(Ordering::SeqCst)
    }

    fn record(&self, procedure: &str, request: &WorkflowRequest<'_>) {
        let value = serde_json::to_value(request).unwrap();
        self.requests
            .lock()
            .unwrap()
            .push((procedure.to_string(), value));
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(
        &self,
        procedure: &str,
        request: &WorkflowRequest<'_>,
    ) -> Result<Value, TransportError> {
        self.record(procedure, request);
        self.response
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(TransportError::InvalidResponse("no response".to_string())))
    }

    async fn call_stream(
        &self,
        procedure: &str,
        request: &WorkflowRequest<'_>,
    ) -> Result<ChunkStream, TransportError> {
        self.record(procedure, request);
        let chunks = std::mem::take(&mut *self.chunks.lock().unwrap());
        let pulled = self.pulled.clone();
        Ok(Box::pin(async_stream::stream! {
            for chunk in chunks {
                pulled.fetch_add(1, Ordering::SeqCst);
                yield chunk;
            }
        }))
    }
}
