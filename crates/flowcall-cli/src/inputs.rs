use anyhow::{bail, Context, Result};
use flowcall::encoding::{AttachedFile, DEFAULT_MEDIA_TYPE};
use flowcall::models::message::ConversationMessage;
use std::path::Path;

use crate::WorkflowArgs;

/// Everything needed for one workflow call, gathered from the command line
#[derive(Debug)]
pub struct WorkflowInput {
    pub workflow_id: String,
    pub messages: Vec<ConversationMessage>,
    pub files: Vec<AttachedFile>,
}

impl WorkflowInput {
    pub fn from_args(args: &WorkflowArgs) -> Result<Self> {
        let messages = load_messages(args.history.as_deref(), &args.prompts)?;
        let files = args.files.iter().map(|arg| parse_file_arg(arg)).collect();

        Ok(Self {
            workflow_id: args.workflow.clone(),
            messages,
            files,
        })
    }
}

pub fn load_messages(
    history: Option<&Path>,
    prompts: &[String],
) -> Result<Vec<ConversationMessage>> {
    let mut messages: Vec<ConversationMessage> = match history {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read history file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Invalid history file {}", path.display()))?
        }
        None => Vec::new(),
    };
    messages.extend(prompts.iter().map(ConversationMessage::user));

    if messages.is_empty() {
        bail!("No conversation given: pass --prompt and/or --history");
    }
    Ok(messages)
}

/// `PATH` or `PATH=MEDIA_TYPE`
pub fn parse_file_arg(arg: &str) -> AttachedFile {
    match arg.rsplit_once('=') {
        Some((path, media_type)) if !path.is_empty() && media_type.contains('/') => {
            AttachedFile::from_path(path, media_type)
        }
        _ => AttachedFile::from_path(arg, DEFAULT_MEDIA_TYPE),
    }
}
