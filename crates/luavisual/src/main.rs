//! luavisual command-line interface.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use luavisual::{Config, Graph, graph_to_text, text_to_graph, validate_syntax};
use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Convert FiveM Lua scripts to node graphs and back
#[derive(Parser, Debug)]
#[command(name = "luavisual")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Config file (defaults to .luavisual/config.toml in the working directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a script to graph JSON
    ToGraph {
        /// Script to read, `-` for stdin
        input: PathBuf,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Generate a script from graph JSON
    ToText {
        /// Graph document (`{header?, nodes, edges}`), `-` for stdin
        input: PathBuf,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Header file, overriding the document's header
        #[arg(long)]
        header: Option<PathBuf>,
    },
    /// Convert a script to a graph and back
    Roundtrip {
        /// Script to read, `-` for stdin
        input: PathBuf,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check a script for syntax errors and unbalanced blocks
    Check {
        /// Script to read, `-` for stdin
        input: PathBuf,
    },
}

/// Graph document accepted by `to-text`. The `to-graph` output is one.
#[derive(Debug, Deserialize)]
struct GraphDocument {
    #[serde(default)]
    header: String,
    #[serde(flatten)]
    graph: Graph,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::ToGraph {
            input,
            output,
            compact,
        } => {
            let source = read_input(&input)?;
            let result = text_to_graph(&source, &config);
            let json = if compact {
                serde_json::to_string(&result)?
            } else {
                serde_json::to_string_pretty(&result)?
            };
            write_output(output.as_deref(), &json)?;
            if let Some(error) = &result.error {
                eprintln!("error: {error}");
                return Ok(ExitCode::FAILURE);
            }
        }

        Command::ToText {
            input,
            output,
            header,
        } => {
            let json = read_input(&input)?;
            let document: GraphDocument = serde_json::from_str(&json)
                .with_context(|| format!("invalid graph document {}", input.display()))?;
            let header = match header {
                Some(path) => read_input(&path)?,
                None => document.header,
            };
            let text = graph_to_text(&document.graph, &header, &config);
            write_output(output.as_deref(), &text)?;
        }

        Command::Roundtrip { input, output } => {
            let source = read_input(&input)?;
            let result = text_to_graph(&source, &config);
            if let Some(error) = result.error {
                anyhow::bail!("{}: {error}", input.display());
            }
            let text = graph_to_text(&result.graph(), &result.header, &config);
            write_output(output.as_deref(), &text)?;
        }

        Command::Check { input } => {
            let source = read_input(&input)?;
            let report = validate_syntax(&source);
            if report.valid {
                println!("{}: ok", input.display());
            } else {
                for error in &report.errors {
                    println!("{}: {error}", input.display());
                }
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None => {
            let dir = std::env::current_dir().context("failed to get working directory")?;
            Ok(Config::discover(&dir)?)
        }
    }
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_output(path: Option<&Path>, text: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => std::fs::write(path, format!("{text}\n"))
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{text}").context("failed to write stdout")
        }
    }
}
