//! wbs-check - Check WBS files for syntax errors
//!
//! A CI-friendly checker: lexes and builds every given file and reports the
//! diagnostics the tree builder collected, with an exit code suitable for
//! pipelines.
//!
//! # Usage
//!
//! ```bash
//! # Check files and directories
//! wbs-check site/ extras/banner.wbs
//!
//! # Machine-readable output
//! wbs-check --format json site/
//!
//! # Quiet mode: exit code only
//! wbs-check --quiet site/
//! ```

use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

use wbs::SyntaxError;

/// Check WBS files for syntax errors
#[derive(Parser, Debug)]
#[command(name = "wbs-check")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directories or files to check
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    format: OutputFormat,

    /// Quiet mode: no output, exit code only
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Pretty,
    Json,
    Compact,
}

#[derive(Debug, Default)]
struct CheckResults {
    files_checked: usize,
    files_passed: usize,
    failures: Vec<FileFailure>,
}

#[derive(Debug)]
struct FileFailure {
    path: PathBuf,
    errors: Vec<SyntaxError>,
    io_error: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let results = run_checks(&args);

    if !args.quiet {
        match args.format {
            OutputFormat::Pretty => output_pretty(&results),
            OutputFormat::Json => output_json(&results),
            OutputFormat::Compact => output_compact(&results),
        }
    }

    if results.failures.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_checks(args: &Args) -> CheckResults {
    let mut results = CheckResults::default();

    for path in collect_wbs_files(&args.paths) {
        results.files_checked += 1;

        let source = match std::fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) => {
                results.failures.push(FileFailure {
                    path,
                    errors: Vec::new(),
                    io_error: Some(e.to_string()),
                });
                continue;
            }
        };

        let (_, errors) = wbs::parse_and_build(&source);
        if errors.is_empty() {
            results.files_passed += 1;
        } else {
            results.failures.push(FileFailure {
                path,
                errors,
                io_error: None,
            });
        }
    }

    results
}

fn collect_wbs_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            collect_wbs_files_recursive(path, &mut files);
        } else if path.is_file() {
            files.push(path.clone());
        }
    }

    files.sort();
    files
}

fn collect_wbs_files_recursive(dir: &PathBuf, files: &mut Vec<PathBuf>) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                collect_wbs_files_recursive(&path, files);
            } else if path.extension().is_some_and(|ext| ext == "wbs") {
                files.push(path);
            }
        }
    }
}

fn output_pretty(results: &CheckResults) {
    for failure in &results.failures {
        println!("{} {}", "✗".red(), failure.path.display());
        if let Some(io_error) = &failure.io_error {
            println!("  {}", io_error.red());
        }
        for error in &failure.errors {
            println!("  {}", error.to_string().red());
        }
    }

    println!();
    println!("{}", "Summary".bold());
    println!("  Files:  {}", results.files_checked);
    println!("  Passed: {}", results.files_passed.to_string().green());
    if !results.failures.is_empty() {
        println!("  Failed: {}", results.failures.len().to_string().red());
    }
}

fn output_json(results: &CheckResults) {
    #[derive(serde::Serialize)]
    struct JsonOutput {
        files_checked: usize,
        files_passed: usize,
        failures: Vec<JsonFailure>,
    }

    #[derive(serde::Serialize)]
    struct JsonFailure {
        path: String,
        errors: Vec<JsonError>,
        io_error: Option<String>,
    }

    #[derive(serde::Serialize)]
    struct JsonError {
        message: String,
        line: u32,
        column: u32,
    }

    let output = JsonOutput {
        files_checked: results.files_checked,
        files_passed: results.files_passed,
        failures: results
            .failures
            .iter()
            .map(|f| JsonFailure {
                path: f.path.display().to_string(),
                errors: f
                    .errors
                    .iter()
                    .map(|e| JsonError {
                        message: e.to_string(),
                        line: e.line(),
                        column: e.column(),
                    })
                    .collect(),
                io_error: f.io_error.clone(),
            })
            .collect(),
    };

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize results: {e}"),
    }
}

fn output_compact(results: &CheckResults) {
    println!(
        "CHECKED:{} PASSED:{} FAILED:{}",
        results.files_checked,
        results.files_passed,
        results.failures.len()
    );
}
