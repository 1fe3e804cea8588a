use tracing::debug;

use crate::encoding::{encode_file, AttachedFile, FileSource};
use crate::errors::WorkflowResult;
use crate::models::file::EncodedFile;
use crate::models::message::ConversationMessage;
use crate::models::request::WorkflowRequest;

/// Pass where a call takes no attachments
pub const NO_FILES: &[AttachedFile] = &[];

/// Build the request for one workflow call.
///
/// Files are encoded one after another in input order. The first file that cannot be
/// encoded fails the whole assembly, so a request never carries a partial file list.
pub async fn assemble_request<'a, F: FileSource>(
    workflow_id: &'a str,
    messages: &'a [ConversationMessage],
    files: &[F],
) -> WorkflowResult<WorkflowRequest<'a>> {
    let mut encoded = Vec::with_capacity(files.len());
    for file in files {
        let content = encode_file(file).await?;
        debug!(
            name = file.name(),
            media_type = file.media_type(),
            encoded_len = content.len(),
            "Encoded file for workflow request"
        );
        encoded.push(EncodedFile::new(file.name(), file.media_type(), content));
    }

    Ok(WorkflowRequest {
        workflow_id,
        messages,
        files: encoded,
    })
}
