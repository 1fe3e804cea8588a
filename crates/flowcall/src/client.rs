use serde_json::Value;
use tracing::debug;

use crate::assembler::assemble_request;
use crate::config::{Settings, WorkflowSettings, RUN_PROCEDURE, STREAM_PROCEDURE};
use crate::encoding::FileSource;
use crate::errors::{TransportError, WorkflowResult};
use crate::models::message::ConversationMessage;
use crate::models::response::WorkflowResponse;
use crate::stream::{extract_final, FragmentStream, FramingMode};
use crate::transport::{HttpTransport, Transport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub run_procedure: String,
    pub stream_procedure: String,
    pub framing: FramingMode,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            run_procedure: RUN_PROCEDURE.to_string(),
            stream_procedure: STREAM_PROCEDURE.to_string(),
            framing: FramingMode::default(),
        }
    }
}

impl From<WorkflowSettings> for ClientOptions {
    fn from(settings: WorkflowSettings) -> Self {
        Self {
            run_procedure: settings.run_procedure,
            stream_procedure: settings.stream_procedure,
            framing: settings.framing,
        }
    }
}

/// Runs remote workflows either to completion or as a stream of text fragments
pub struct WorkflowClient<T: Transport> {
    transport: T,
    options: ClientOptions,
}

impl WorkflowClient<HttpTransport> {
    /// Build an HTTP backed client from loaded settings
    pub fn from_settings(settings: Settings) -> WorkflowResult<Self> {
        let transport = HttpTransport::new(settings.endpoint.transport_config())?;
        Ok(Self::with_options(transport, settings.workflow.into()))
    }
}

impl<T: Transport> WorkflowClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_options(transport, ClientOptions::default())
    }

    pub fn with_options(transport: T, options: ClientOptions) -> Self {
        Self { transport, options }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Run a workflow to completion and return its final text.
    ///
    /// Nothing is sent if any file fails to encode.
    pub async fn generate_content<F: FileSource>(
        &self,
        workflow_id: &str,
        messages: &[ConversationMessage],
        files: &[F],
    ) -> WorkflowResult<String> {
        let request = assemble_request(workflow_id, messages, files).await?;
        debug!(
            workflow_id,
            messages = messages.len(),
            files = request.files.len(),
            "Running workflow"
        );

        let value = self
            .transport
            .call(&self.options.run_procedure, &request)
            .await?;
        let response = parse_response(value)?;
        Ok(extract_final(&response)?.to_string())
    }

    /// Run a workflow and stream the text fragments it produces.
    ///
    /// The request is sent before this returns. Fragments are then pulled from the transport
    /// only as the returned stream is polled.
    pub async fn stream_content<F: FileSource>(
        &self,
        workflow_id: &str,
        messages: &[ConversationMessage],
        files: &[F],
    ) -> WorkflowResult<FragmentStream> {
        let request = assemble_request(workflow_id, messages, files).await?;
        debug!(
            workflow_id,
            messages = messages.len(),
            files = request.files.len(),
            framing = ?self.options.framing,
            "Streaming workflow"
        );

        let chunks = self
            .transport
            .call_stream(&self.options.stream_procedure, &request)
            .await?;
        Ok(FragmentStream::new(chunks, self.options.framing))
    }
}

fn parse_response(value: Value) -> Result<WorkflowResponse, TransportError> {
    serde_json::from_value(value)
        .map_err(|e| TransportError::InvalidResponse(format!("unexpected response shape: {}", e)))
}
