//! Item Database CLI
//!
//! Command-line front end for the loader core:
//! - `idb check` — load one file and report what was found
//! - `idb merge` — follow imports and write the merged flat list
//! - `idb encoding` — report the detected encoding of a file

use clap::{Args, Parser, Subcommand, ValueEnum};
use idb_core::{DatasetLoader, LoadStatus, LoaderConfig};
use idb_encoding::TextEncoding;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Item database loader and editor core
#[derive(Parser)]
#[command(name = "idb")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Base directory for import resolution (defaults to the root
    /// file's directory)
    #[arg(long, global = true, env = "IDB_BASE_DIR")]
    base_dir: Option<PathBuf>,

    /// Force an encoding instead of detecting it (utf-8, utf-16le,
    /// gb18030, gbk, big5, ...)
    #[arg(long, global = true, value_parser = parse_encoding)]
    encoding: Option<TextEncoding>,

    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a single file (imports are reported, not followed)
    Check {
        /// Database file to load
        file: PathBuf,
    },

    /// Follow imports from a root file and write the merged flat list
    Merge {
        /// Root database file
        root: PathBuf,

        /// Output file for the merged records
        #[arg(short, long)]
        output: PathBuf,

        /// Encoding to save with (defaults to the root's encoding)
        #[arg(long = "to", value_parser = parse_encoding)]
        to: Option<TextEncoding>,
    },

    /// Report the detected encoding of a file
    Encoding {
        /// File to inspect
        file: PathBuf,
    },
}

fn parse_encoding(label: &str) -> Result<TextEncoding, String> {
    TextEncoding::from_label(label).ok_or_else(|| format!("unknown encoding label `{label}`"))
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout is reserved for command payloads; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose, cli.global.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> idb_common::Result<()> {
    let loader = DatasetLoader::new(LoaderConfig {
        base_dir: cli.global.base_dir.clone(),
        encoding: cli.global.encoding,
    });

    match &cli.command {
        Commands::Check { file } => {
            let outcome = loader.load_file(file)?;
            match cli.global.format {
                OutputFormat::Json => {
                    let payload = json!({
                        "file": file,
                        "records": outcome.records.len(),
                        "imports": outcome.imports,
                        "encoding": outcome.encoding.name(),
                        "codepage": outcome.encoding.codepage(),
                        "strategy": outcome.strategy.map(|s| s.to_string()),
                        "diagnostics": outcome.diagnostics,
                    });
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                }
                OutputFormat::Text => {
                    println!(
                        "{}: {} records ({}, cp{})",
                        file.display(),
                        outcome.records.len(),
                        outcome.encoding.name(),
                        outcome.encoding.codepage()
                    );
                    if let Some(strategy) = outcome.strategy {
                        println!("strategy: {strategy}");
                    }
                    for import in &outcome.imports {
                        println!("import: {import}");
                    }
                    for diag in &outcome.diagnostics {
                        println!("{diag}");
                    }
                }
            }
        }

        Commands::Merge { root, output, to } => {
            let outcome = loader.load_dataset(root)?;
            let encoding = to.unwrap_or(outcome.encoding);
            idb_core::save(output, &outcome.records, encoding)?;

            match cli.global.format {
                OutputFormat::Json => {
                    let payload = json!({
                        "root": root,
                        "output": output,
                        "records": outcome.records.len(),
                        "files": outcome.visited,
                        "encoding": encoding.name(),
                        "cancelled": outcome.status == LoadStatus::Cancelled,
                        "diagnostics": outcome.diagnostics,
                    });
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                }
                OutputFormat::Text => {
                    println!(
                        "merged {} records from {} files into {}",
                        outcome.records.len(),
                        outcome.visited.len(),
                        output.display()
                    );
                    for diag in &outcome.diagnostics {
                        println!("{diag}");
                    }
                }
            }
        }

        Commands::Encoding { file } => {
            let bytes = std::fs::read(file)?;
            let encoding = idb_encoding::detect(&bytes);
            match cli.global.format {
                OutputFormat::Json => {
                    let payload = json!({
                        "file": file,
                        "encoding": encoding.name(),
                        "codepage": encoding.codepage(),
                    });
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                }
                OutputFormat::Text => {
                    println!("{} (cp{})", encoding.name(), encoding.codepage());
                }
            }
        }
    }

    Ok(())
}
