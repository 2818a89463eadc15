//! wbs-lex - Dump the lexeme stream of a WBS file
//!
//! Shows exactly what the lexer hands to the tree builder, one positioned
//! lexeme per line. This is the same stream the editor's debug view
//! renders.
//!
//! # Usage
//!
//! ```bash
//! # One lexeme per line with positions
//! wbs-lex page.wbs
//!
//! # Machine-readable output
//! wbs-lex --format json page.wbs
//! ```

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Dump the lexeme stream of a WBS file
#[derive(Parser, Debug)]
#[command(name = "wbs-lex")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File to lex
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
    let lexemes = wbs::parse(&source);

    match args.format {
        OutputFormat::Pretty => {
            for lexeme in &lexemes {
                println!("{}:{}\t{}", lexeme.line, lexeme.column, lexeme.value);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&lexemes)?);
        }
    }

    Ok(())
}
