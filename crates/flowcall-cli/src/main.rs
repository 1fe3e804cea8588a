use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use flowcall::client::WorkflowClient;
use flowcall::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod inputs;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct WorkflowArgs {
    /// ID of the workflow to run
    #[arg(short, long)]
    workflow: String,

    /// JSON file with the conversation so far, e.g. [{"role": "user", "content": "Hi"}]
    #[arg(long)]
    history: Option<PathBuf>,

    /// User message appended after the history (repeatable)
    #[arg(short, long = "prompt")]
    prompts: Vec<String>,

    /// File to attach as PATH or PATH=MEDIA_TYPE (repeatable)
    #[arg(short, long = "file")]
    files: Vec<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a workflow and print its final answer
    Generate {
        #[command(flatten)]
        args: WorkflowArgs,
    },

    /// Run a workflow and print its answer as it streams in
    Stream {
        #[command(flatten)]
        args: WorkflowArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout is reserved for workflow output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = Settings::new().context("Failed to load settings")?;
    tracing::debug!(host = %settings.endpoint.host, "Loaded settings");
    let client = WorkflowClient::from_settings(settings)?;

    match cli.command {
        Command::Generate { args } => {
            let input = inputs::WorkflowInput::from_args(&args)?;
            commands::generate::execute(&client, &input).await
        }
        Command::Stream { args } => {
            let input = inputs::WorkflowInput::from_args(&args)?;
            commands::stream::execute(&client, &input).await
        }
    }
}
