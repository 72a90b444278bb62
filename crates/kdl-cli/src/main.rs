//! `kdl-cat`: build a KDL document from a JSON event stream and write it back
//! out as canonical KDL text, the diagnostic form, or canonical events.
//!
//! ## Usage
//!
//! ```sh
//! # Events on stdin, KDL text on stdout
//! kdl-cat cat < hosts.events.json
//!
//! # From file to file
//! kdl-cat cat -i hosts.events.json -o hosts.kdl
//!
//! # KDL v1 syntax
//! kdl-cat cat --v1 -i hosts.events.json
//!
//! # Parenthesized diagnostic form
//! kdl-cat print -i hosts.events.json
//!
//! # Canonical event stream (properties sorted)
//! kdl-cat events -i hosts.events.json
//!
//! # Trace the builder and emitter on stderr
//! kdl-cat -d cat -i hosts.events.json
//! ```
//!
//! The input is a JSON array of events:
//! `[{"kind": "start_node", "name": "host"}, {"kind": "argument", "value":
//! {"type": "string", "value": "example1"}}, {"kind": "end_node"}, {"kind": "eof"}]`.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kdl_tree::event::{read_json_events, write_json_events};
use kdl_tree::{emit_document, print_document, Document, KdlVersion, TextSink};
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "kdl-cat",
    version,
    about = "Build KDL documents from event streams and re-emit them",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Trace builder and emitter activity to stderr
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the document as canonical KDL text
    Cat {
        /// Input event stream (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Write KDL v1 syntax instead of v2
        #[arg(long)]
        v1: bool,
    },
    /// Write the parenthesized diagnostic form
    Print {
        /// Input event stream (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Rebuild the document and write its canonical event stream
    Events {
        /// Input event stream (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match cli.command {
        Commands::Cat { input, output, v1 } => {
            let doc = read_document(input.as_deref())?;
            let out = open_output(output.as_deref())?;
            let version = if v1 { KdlVersion::V1 } else { KdlVersion::V2 };
            emit_document(TextSink::with_version(out, version), &doc)
                .context("Failed to write KDL text")?;
        }
        Commands::Print { input } => {
            let doc = read_document(input.as_deref())?;
            println!("{}", print_document(&doc));
        }
        Commands::Events { input, output } => {
            let doc = read_document(input.as_deref())?;
            let events = doc.to_events().context("Failed to flatten document")?;
            let mut out = open_output(output.as_deref())?;
            write_json_events(&mut out, &events).context("Failed to write event stream")?;
            out.flush().context("Failed to write event stream")?;
        }
    }

    Ok(())
}

/// `-d` turns on everything; otherwise `RUST_LOG` decides.
fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(LevelFilter::TRACE.into())
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_document(path: Option<&str>) -> Result<Document> {
    let events = match path {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("Failed to read file: {}", path))?;
            read_json_events(BufReader::new(file))
                .with_context(|| format!("Failed to parse event stream: {}", path))?
        }
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read from stdin")?;
            read_json_events(buf.as_slice()).context("Failed to parse event stream from stdin")?
        }
    };
    debug!(events = events.len(), "read event stream");
    Document::from_events(events).context("Failed to build document")
}

fn open_output(path: Option<&str>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("Failed to write file: {}", path))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}
