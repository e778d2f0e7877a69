//! `harness` CLI: generate and judge polyglot test harnesses from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Build a program from a request (stdin → stdout)
//! cat request.json | harness generate
//!
//! # Structured mode with expected values baked into the source
//! harness generate -i request.json -o program.json --mode structured --embed-expected
//!
//! # Inspect how a call expression parses
//! harness parse-call 'add(1, [2, 3])'
//!
//! # Render a JSON value as a Java literal
//! harness render --language java '[1, 2.5]'
//!
//! # Judge a captured run
//! harness judge -i request.json --stdout run.txt
//! harness judge -i request.json --stdout run.txt --language brainfck
//!
//! # List backends and their aliases
//! harness languages
//! ```
//!
//! Logging goes to stderr; set `HARNESS_LOG` (e.g. `HARNESS_LOG=debug`) to
//! change the level.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use harness_core::{Backend, CallMode, ExpectedDelivery, GenerateRequest, ProgramMode};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "harness",
    version,
    about = "Polyglot test-harness generator"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    PassThrough,
    Structured,
}

impl From<ModeArg> for CallMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::PassThrough => CallMode::PassThrough,
            ModeArg::Structured => CallMode::Structured,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Turn a request JSON into a runnable program JSON
    Generate {
        /// Request file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Override the request's call mode
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        /// Embed expected values in the generated source instead of stdin
        #[arg(long)]
        embed_expected: bool,
    },
    /// Parse a call expression and print it as JSON
    ParseCall {
        /// Call text, e.g. `add(1, 2)`
        call: String,
    },
    /// Render a JSON value as a source literal
    Render {
        /// Target language identifier
        #[arg(short, long)]
        language: String,
        /// JSON value (markers allowed)
        value: String,
    },
    /// Judge a program's captured stdout against a request
    Judge {
        /// Request file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// File holding the program's stdout
        #[arg(long)]
        stdout: String,
        /// Language the program was generated for (defaults to the request's)
        #[arg(short, long)]
        language: Option<String>,
        /// Treat the run as a fallback program even for a native language
        #[arg(long)]
        fallback: bool,
    },
    /// List native backends and their aliases
    Languages,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("HARNESS_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate {
            input,
            output,
            mode,
            embed_expected,
        } => {
            let mut request = read_request(input.as_deref())?;
            if let Some(mode) = mode {
                request.options.call_mode = mode.into();
            }
            if embed_expected {
                request.options.expected_delivery = ExpectedDelivery::Embedded;
            }
            let program = harness_core::generate(&request).context("Failed to generate program")?;
            let json = serde_json::to_string_pretty(&program)?;
            write_output(output.as_deref(), &json)?;
        }
        Commands::ParseCall { call } => {
            let invocation = harness_core::parse(&call)
                .with_context(|| format!("Failed to parse call: {}", call))?;
            println!("{}", serde_json::to_string(&invocation)?);
        }
        Commands::Render { language, value } => {
            let value = harness_core::parse_json_preserving_floats(&value)
                .context("Value is not valid JSON")?;
            let literal = harness_core::render(&value, &language)
                .with_context(|| format!("Failed to render value for '{}'", language))?;
            println!("{}", literal);
        }
        Commands::Judge {
            input,
            stdout,
            language,
            fallback,
        } => {
            let request = read_request(input.as_deref())?;
            let captured = std::fs::read_to_string(&stdout)
                .with_context(|| format!("Failed to read file: {}", stdout))?;
            let language = language.unwrap_or_else(|| request.language.clone());
            let mode = if fallback || harness_core::resolve(&language).name() == "generic" {
                ProgramMode::Fallback
            } else {
                ProgramMode::Native
            };
            let outcomes = harness_core::collect_outcomes(
                mode,
                &language,
                &captured,
                &request.test_cases,
            );
            println!("{}", serde_json::to_string(&outcomes)?);
        }
        Commands::Languages => {
            for (name, aliases) in harness_core::registry::language_aliases() {
                println!("{}: {}", name, aliases.join(", "));
            }
        }
    }

    Ok(())
}

fn read_request(path: Option<&str>) -> Result<GenerateRequest> {
    let text = read_input(path)?;
    serde_json::from_str(&text).context("Failed to parse request JSON")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
