use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};
use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use serde_json::{json, Value};
use std::time::Duration;

use super::{ChunkStream, Transport};
use crate::errors::TransportError;
use crate::models::request::WorkflowRequest;

pub const DEFAULT_TIMEOUT_MS: u64 = 300_000;

#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    pub host: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl HttpTransportConfig {
    pub fn new<S: Into<String>>(host: S) -> Self {
        Self {
            host: host.into(),
            api_key: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

/// Calls workflow procedures exposed as HTTP callable functions.
///
/// Requests are posted to `{host}/{procedure}` as `{"data": <request>}`. Responses arrive as
/// `{"result": <payload>}` or `{"error": {"status", "message"}}`.
pub struct HttpTransport {
    client: Client,
    config: HttpTransportConfig,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    fn url(&self, procedure: &str) -> String {
        format!("{}/{}", self.config.host.trim_end_matches('/'), procedure)
    }

    async fn post(
        &self,
        procedure: &str,
        request: &WorkflowRequest<'_>,
        accept: &str,
    ) -> Result<Response, TransportError> {
        let mut builder = self
            .client
            .post(self.url(procedure))
            .header(ACCEPT, accept)
            .json(&json!({ "data": request }));
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => format!("<failed to read error body: {}>", err),
        };
        Err(error_from_body(status.as_u16(), body))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(
        &self,
        procedure: &str,
        request: &WorkflowRequest<'_>,
    ) -> Result<Value, TransportError> {
        let response = self.post(procedure, request, "application/json").await?;
        let body: Value = response.json().await?;
        unwrap_result(body)
    }

    async fn call_stream(
        &self,
        procedure: &str,
        request: &WorkflowRequest<'_>,
    ) -> Result<ChunkStream, TransportError> {
        let response = self.post(procedure, request, "text/event-stream").await?;
        Ok(Box::pin(decode_text_chunks(response.bytes_stream())))
    }
}

fn remote_error(body: &Value) -> Option<TransportError> {
    let error = body.get("error")?;
    let status = error
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("UNKNOWN")
        .to_string();
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("Unknown error")
        .to_string();
    Some(TransportError::Remote { status, message })
}

fn error_from_body(status: u16, body: String) -> TransportError {
    serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|value| remote_error(&value))
        .unwrap_or(TransportError::Status { status, body })
}

/// Take the payload out of a callable response envelope
fn unwrap_result(mut body: Value) -> Result<Value, TransportError> {
    if let Some(err) = remote_error(&body) {
        return Err(err);
    }
    match body.get_mut("result") {
        Some(result) => Ok(result.take()),
        None => Ok(body),
    }
}

fn decode_text_chunks<S, B>(
    bytes: S,
) -> impl Stream<Item = Result<String, TransportError>> + Send + 'static
where
    S: Stream<Item = reqwest::Result<B>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    async_stream::stream! {
        let mut bytes = Box::pin(bytes);
        let mut decoder = Utf8Decoder::default();
        while let Some(chunk) = bytes.next().await {
            match chunk.map_err(TransportError::from).and_then(|c| decoder.push(c.as_ref())) {
                Ok(text) if text.is_empty() => {}
                Ok(text) => yield Ok(text),
                Err(err) => {
                    yield Err(err);
                    return;
                }
            }
        }
        if let Err(err) = decoder.finish() {
            yield Err(err);
        }
    }
}

/// Holds back the bytes of a character split across network chunks
#[derive(Debug, Default)]
struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    fn push(&mut self, bytes: &[u8]) -> Result<String, TransportError> {
        self.pending.extend_from_slice(bytes);
        let valid = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => {
                return Err(TransportError::InvalidResponse(format!(
                    "stream is not valid UTF-8: {}",
                    e
                )))
            }
        };

        let rest = self.pending.split_off(valid);
        let text = std::mem::replace(&mut self.pending, rest);
        String::from_utf8(text).map_err(|e| TransportError::InvalidResponse(e.to_string()))
    }

    fn finish(&mut self) -> Result<(), TransportError> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(TransportError::InvalidResponse(
                "stream ended inside a UTF-8 character".to_string(),
            ))
        }
    }
}
