//! wbs-tree - Show the phrase tree of a WBS file
//!
//! Builds the phrase tree and prints the binary-tree debug view the editor
//! shows in its popup: the heap-indexed token vector, one row per depth.
//!
//! # Usage
//!
//! ```bash
//! # Row-per-depth debug view
//! wbs-tree page.wbs
//!
//! # The raw heap vector as JSON
//! wbs-tree --format json page.wbs
//! ```

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use wbs::treeview;

/// Show the phrase tree of a WBS file
#[derive(Parser, Debug)]
#[command(name = "wbs-tree")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File to build
    file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    format: OutputFormat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Pretty,
    Json,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let source = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let (tree, errors) = wbs::parse_and_build(&source);
    let vector = tree.to_vector();

    match args.format {
        OutputFormat::Pretty => {
            let mut row = 0;
            let mut line = Vec::new();
            for (index, entry) in vector.iter().enumerate() {
                let depth = treeview::depth(index);
                if depth != row {
                    println!("{}", line.join("  "));
                    line.clear();
                    row = depth;
                }
                line.push(if entry.is_empty() { "." } else { entry.as_str() });
            }
            if !line.is_empty() {
                println!("{}", line.join("  "));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&vector)?);
        }
    }

    for error in &errors {
        eprintln!("{error}");
    }

    Ok(())
}
