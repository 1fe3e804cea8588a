use anyhow::Result;
use cliclack::spinner;
use flowcall::client::WorkflowClient;
use flowcall::transport::Transport;

use crate::inputs::WorkflowInput;

pub async fn execute<T: Transport>(
    client: &WorkflowClient<T>,
    input: &WorkflowInput,
) -> Result<()> {
    let spin = spinner();
    spin.start("running workflow");

    match client
        .generate_content(&input.workflow_id, &input.messages, &input.files)
        .await
    {
        Ok(text) => {
            spin.stop("");
            println!("{}", text);
            Ok(())
        }
        Err(err) => {
            spin.error(format!("workflow failed: {}", err));
            Err(err.into())
        }
    }
}
