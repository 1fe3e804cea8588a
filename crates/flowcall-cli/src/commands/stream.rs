use anyhow::{Context, Result};
use console::style;
use flowcall::client::WorkflowClient;
use flowcall::transport::Transport;
use futures::StreamExt;
use std::io::Write;

use crate::inputs::WorkflowInput;

pub async fn execute<T: Transport>(
    client: &WorkflowClient<T>,
    input: &WorkflowInput,
) -> Result<()> {
    let mut fragments = client
        .stream_content(&input.workflow_id, &input.messages, &input.files)
        .await?;

    let mut stdout = std::io::stdout();
    while let Some(fragment) = fragments.next().await {
        let fragment = fragment.context("Workflow stream ended with an error")?;
        write!(stdout, "{}", fragment)?;
        stdout.flush()?;
    }
    writeln!(stdout)?;

    let dropped = fragments.dropped_frames();
    if dropped > 0 {
        eprintln!(
            "{}",
            style(format!("{} malformed frame(s) skipped", dropped)).dim()
        );
    }
    Ok(())
}
