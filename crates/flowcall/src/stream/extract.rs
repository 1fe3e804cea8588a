use crate::errors::ProtocolViolation;
use crate::models::response::{StreamChunk, WorkflowResponse};

/// Text fragment carried by the first choice of a streamed event
pub fn extract_delta(chunk: &StreamChunk) -> Result<&str, ProtocolViolation> {
    chunk
        .choices
        .first()
        .map(|choice| choice.delta.content.as_str())
        .ok_or(ProtocolViolation::EmptyChoices)
}

/// Complete text of the first choice of a one-shot response
pub fn extract_final(response: &WorkflowResponse) -> Result<&str, ProtocolViolation> {
    response
        .choices
        .first()
        .map(|choice| choice.message.content.as_str())
        .ok_or(ProtocolViolation::EmptyChoices)
}
