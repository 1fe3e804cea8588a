use serde::Serialize;

use super::file::EncodedFile;
use super::message::ConversationMessage;

/// Payload of a single workflow invocation.
///
/// The conversation history is borrowed from the caller as-is; only the encoded files are owned.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRequest<'a> {
    pub workflow_id: &'a str,
    pub messages: &'a [ConversationMessage],
    pub files: Vec<EncodedFile>,
}
