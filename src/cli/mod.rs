//! CLI definitions for the `goose-stream` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// goose chat stream client
#[derive(Parser, Debug)]
#[command(name = "goose-stream", version, about = "Talk to a local goose backend over its data-stream protocol")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a prompt to the backend and stream the reply
    Chat(ChatArgs),
    /// Decode a recorded stream offline
    Parse(ParseArgs),
}

/// Arguments for the `chat` subcommand.
#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// Prompt to send
    pub prompt: String,

    /// Backend host (overrides GOOSE_CHAT_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Backend port (overrides GOOSE_SERVER__PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print every decoded part as a JSON line instead of plain text
    #[arg(long)]
    pub raw: bool,
}

/// Arguments for the `parse` subcommand.
#[derive(Parser, Debug)]
pub struct ParseArgs {
    /// File holding the raw stream; reads stdin when omitted
    pub file: Option<PathBuf>,
}
