//! goose-stream CLI binary entry point.

use std::io::{self, BufRead, Write};

use clap::Parser;
use futures::StreamExt;
use goose_stream::cli::{ChatArgs, Cli, Commands, ParseArgs};
use goose_stream::config::ChatEnvironment;
use goose_stream::error::ChatError;
use goose_stream::handler::StreamHandler;
use goose_stream::protocol::{StreamParser, StreamPart, Usage};
use goose_stream::transport::ChatClient;
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Chat(args) => handle_chat(args).await,
        Commands::Parse(args) => handle_parse(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Writes text to stdout as it arrives; everything else goes to stderr.
struct TerminalHandler;

impl StreamHandler for TerminalHandler {
    fn on_text(&mut self, text: &str) {
        let mut out = io::stdout().lock();
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }

    fn on_data(&mut self, data: &[Value]) {
        eprintln!("[data] {}", Value::Array(data.to_vec()));
    }

    fn on_error(&mut self, error: &str) {
        eprintln!("\n[error] {error}");
    }

    fn on_message_annotation(&mut self, annotation: &Map<String, Value>) {
        tracing::info!(annotation = %serde_json::Value::Object(annotation.clone()), "message annotation");
    }

    fn on_finish(&mut self, finish_reason: &str, usage: &Usage) {
        println!();
        eprintln!("[finish] {finish_reason} {usage:?}");
    }
}

async fn handle_chat(args: ChatArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut env = match &args.config {
        Some(path) if !path.exists() => {
            return Err(format!("config file not found: {}", path.display()).into());
        }
        Some(path) => ChatEnvironment::load_from(Some(path.as_path()))?,
        None => ChatEnvironment::load()?,
    };
    if let Some(host) = args.host {
        env.host = host;
    }
    if let Some(port) = args.port {
        env.port = Some(port);
    }

    let client = ChatClient::from_environment(&env)?;

    if args.raw {
        let mut parts = client.stream_parts(&args.prompt).await?;
        while let Some(part) = parts.next().await {
            println!("{}", serde_json::to_string(&part?)?);
        }
        return Ok(());
    }

    let response = client.stream_message(&args.prompt, &mut TerminalHandler).await?;
    match response.error {
        Some(error) => Err(ChatError::Stream(error).into()),
        None => Ok(()),
    }
}

fn handle_parse(args: ParseArgs) -> Result<(), Box<dyn std::error::Error>> {
    let reader: Box<dyn BufRead> = match args.file {
        Some(path) => Box::new(io::BufReader::new(std::fs::File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };

    let mut parser = StreamParser::new();
    let mut out = io::stdout().lock();
    for line in reader.lines() {
        let line = line?;
        if let Some(part) = parser.parse_line(&line) {
            writeln!(out, "{}", serde_json::to_string(&part)?)?;
            if matches!(part, StreamPart::FinishMessage { .. }) {
                parser.reset();
            }
        }
    }
    Ok(())
}
