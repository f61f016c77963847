//! Command-line interface definition and dispatch for nami.
//!
//! Uses [`clap`] for argument parsing with derive macros. The binary is a
//! replay/debug harness around the library: it feeds a captured assistant
//! transcript through the parser chunk by chunk and renders the evolving
//! block sequence, which is also the quickest way to see how a given
//! custom-tool set changes a parse.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use futures::StreamExt;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;
use crate::output::{BlockRenderer, JsonRenderer, StdoutRenderer};
use crate::parser::AssistantMessageParser;
use crate::stream::drive_stream;

/// Top-level CLI structure for nami.
#[derive(Parser)]
#[command(
    name = "nami",
    about = "A streaming assistant-message parser for terminal AI coding agents"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for the nami CLI.
///
/// The `///` doc comments on variants double as `--help` text rendered by clap.
#[derive(Subcommand)]
pub enum Commands {
    /// Replay a captured assistant transcript through the parser
    Replay {
        /// Transcript file to replay (stdin when omitted)
        file: Option<PathBuf>,
        /// Chunk size in bytes (split at UTF-8 boundaries)
        #[arg(short, long)]
        chunk_size: Option<usize>,
        /// Delay between chunks in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Additional custom tool tag to recognize (repeatable)
        #[arg(long = "custom-tool", value_name = "NAME")]
        custom_tools: Vec<String>,
        /// Emit the final block sequence as JSON instead of rendering
        #[arg(long)]
        json: bool,
    },
    /// List every registered tool tag and its parameter schema
    Tools {
        /// Additional custom tool tag to include (repeatable)
        #[arg(long = "custom-tool", value_name = "NAME")]
        custom_tools: Vec<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Subcommands for the `config` command.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective merged config
    Show,
}

/// Parses command-line arguments.
pub fn parse() -> Cli {
    Cli::parse()
}

/// Dispatches the chosen subcommand.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Replay {
            file,
            chunk_size,
            delay_ms,
            custom_tools,
            json,
        } => replay(file, chunk_size, delay_ms, custom_tools, json).await,
        Commands::Tools { custom_tools } => list_tools(custom_tools),
        Commands::Config {
            action: ConfigAction::Show,
        } => show_config(),
    }
}

/// Runs `nami replay`.
async fn replay(
    file: Option<PathBuf>,
    chunk_size: Option<usize>,
    delay_ms: Option<u64>,
    custom_tools: Vec<String>,
    json: bool,
) -> Result<()> {
    let config = Config::load()?;
    let transcript = read_transcript(file.as_deref())?;

    let chunk_size = chunk_size
        .or(config.replay.chunk_size)
        .unwrap_or(crate::constants::DEFAULT_CHUNK_SIZE)
        .max(1);
    let delay_ms = delay_ms
        .or(config.replay.delay_ms)
        .unwrap_or(crate::constants::DEFAULT_REPLAY_DELAY_MS);

    let mut parser = AssistantMessageParser::new(config.registry(&custom_tools));
    let mut renderer: Box<dyn BlockRenderer> = if json {
        Box::new(JsonRenderer)
    } else {
        Box::new(StdoutRenderer::new())
    };

    let chunks = futures::stream::iter(chunk_text(&transcript, chunk_size)).then(move |chunk| {
        async move {
            if delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            chunk
        }
    });
    let chunks = Box::pin(chunks);

    drive_stream(chunks, &mut parser, |blocks| renderer.render_update(blocks)).await;
    renderer.render_done(parser.blocks());
    Ok(())
}

/// Runs `nami tools`.
fn list_tools(custom_tools: Vec<String>) -> Result<()> {
    let config = Config::load()?;
    let registry = config.registry(&custom_tools);

    for schema in registry.schemas() {
        let origin = if schema.custom { "custom" } else { "builtin" };
        println!("{} {}", schema.name.cyan().bold(), format!("({origin})").dimmed());
        if schema.params.is_empty() {
            println!("  {}", "raw body".dimmed());
            continue;
        }
        for param in &schema.params {
            if schema.is_raw_param(param) {
                println!("  {param} {}", "(raw)".dimmed());
            } else {
                println!("  {param}");
            }
        }
    }
    Ok(())
}

/// Runs `nami config show`.
fn show_config() -> Result<()> {
    let config = Config::load()?;
    let rendered = toml::to_string(&config).context("Failed to render config as TOML")?;
    print!("{rendered}");
    Ok(())
}

/// Reads the transcript from a file, or stdin when no file was given.
fn read_transcript(file: Option<&std::path::Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read transcript from {:?}", path)),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read transcript from stdin")?;
            Ok(input)
        }
    }
}

/// Splits `text` into chunks of at least `size` bytes, at char boundaries.
fn chunk_text(text: &str, size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        current.push(c);
        if current.len() >= size {
            chunks.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
