//! `dagb`: command-line host for the DAG builder engines.
//!
//! Provides three subcommands for working with graph documents:
//!
//! - **`validate`**: check a graph against a structural property.
//! - **`layout`**: compute automatic positions and print the updated document.
//! - **`render`**: print a human-readable summary of a graph.
//!
//! All subcommands read a `{ "nodes": [...], "edges": [...] }` JSON document
//! from a file path or from stdin (`-`). Set `DAGB_LOG=dagbuilder=debug` (or
//! `RUST_LOG`) to see engine logging on stderr.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use dagbuilder::{
    apply_positions, layout_with_config, render, validate, Direction, Graph, GraphDocument,
    LayoutConfig, LayoutMode, ValidationMode,
};

/// dagb: DAG builder CLI
///
/// Validate, lay out and inspect node/edge graph documents.
#[derive(Parser)]
#[command(name = "dagb", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a graph against a structural property.
    ///
    /// Prints the reason and any offending edge ids. Exits 0 if the graph is
    /// valid, 1 if it is not, 2 on a read or parse error.
    ///
    /// Pass `-` as FILE to read from stdin.
    Validate {
        /// Path to a JSON document, or `-` for stdin.
        file: PathBuf,

        /// Property to check: dag | tree | bipartite
        #[arg(short, long, default_value = "dag", env = "DAGB_MODE")]
        mode: ValidationMode,

        /// Print the result as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Compute node positions and print the document with them applied.
    ///
    /// Examples:
    ///   dagb layout graph.json --mode tree
    ///   dagb layout graph.json --direction LR --config layout.json
    Layout {
        /// Path to a JSON document, or `-` for stdin.
        file: PathBuf,

        /// Algorithm: layered | tree
        #[arg(short, long, default_value = "layered")]
        mode: LayoutMode,

        /// Rank direction for the layered layout: TB | BT | LR | RL.
        /// Overrides the config file.
        #[arg(short, long)]
        direction: Option<Direction>,

        /// JSON file with layout settings; omitted fields keep their defaults.
        #[arg(short, long, value_name = "FILE", env = "DAGB_LAYOUT_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Render a graph as human-readable text, followed by its validation result.
    ///
    /// Pass `-` as FILE to read from stdin.
    Render {
        /// Path to a JSON document, or `-` for stdin.
        file: PathBuf,

        /// Property to report under the summary: dag | tree | bipartite
        #[arg(short, long, default_value = "dag")]
        mode: ValidationMode,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("DAGB_LOG")
                .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| "dagb=warn,dagbuilder=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Validate { file, mode, json } => {
            let doc = read_document(&file);
            let result = validate(&doc.nodes, &doc.edges, mode);
            if json {
                let out = serde_json::to_string_pretty(&result)
                    .unwrap_or_else(|e| fatal(&format!("failed to encode result: {}", e)));
                println!("{}", out);
            } else {
                print!("{}", render::render_validation(mode, &result));
            }
            if !result.valid {
                process::exit(1);
            }
        }

        Command::Layout {
            file,
            mode,
            direction,
            config,
        } => {
            let mut doc = read_document(&file);
            let mut settings = match &config {
                Some(path) => read_config(path),
                None => LayoutConfig::default(),
            };
            if let Some(d) = direction {
                settings.direction = d;
            }
            tracing::debug!(%mode, direction = %settings.direction, "laying out");

            let positions = layout_with_config(&doc.nodes, &doc.edges, mode, &settings);
            apply_positions(&mut doc.nodes, &positions);
            let out = doc
                .to_json_pretty()
                .unwrap_or_else(|e| fatal(&e.to_string()));
            println!("{}", out);
        }

        Command::Render { file, mode } => {
            let doc = read_document(&file);
            let graph = Graph::new(&doc.nodes, &doc.edges);
            print!("{}", render::render_graph(&graph));
            println!();
            let result = validate(&doc.nodes, &doc.edges, mode);
            print!("{}", render::render_validation(mode, &result));
        }
    }
}

/// Read the full contents of a file, or stdin when the path is `"-"`.
fn read_input(path: &Path) -> String {
    if path.to_str() == Some("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .unwrap_or_else(|e| fatal(&format!("failed to read stdin: {}", e)));
        buf
    } else {
        fs::read_to_string(path).unwrap_or_else(|e| {
            fatal(&format!("failed to read {}: {}", path.display(), e))
        })
    }
}

fn read_document(path: &Path) -> GraphDocument {
    let json = read_input(path);
    GraphDocument::from_json(&json).unwrap_or_else(|e| fatal(&e.to_string()))
}

fn read_config(path: &Path) -> LayoutConfig {
    let json = read_input(path);
    serde_json::from_str(&json).unwrap_or_else(|e| {
        fatal(&format!("invalid layout config {}: {}", path.display(), e))
    })
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("dagb: {}", msg);
    process::exit(2);
}
