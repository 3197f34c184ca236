//! bionic-epub - EPUB bionic-reading converter

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bionic_epub::{Config, Converter, output_file_name};

#[derive(Parser)]
#[command(name = "bionic-epub")]
#[command(version, about = "Emphasize word beginnings in EPUB books", long_about = None)]
#[command(after_help = "EXAMPLES:
    bionic-epub book.epub                    Write book.bionic.epub
    bionic-epub book.epub out.epub           Write out.epub
    bionic-epub book.epub -c settings.json   Use custom exclusions")]
struct Cli {
    /// Input EPUB file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output EPUB file (default: INPUT with a .bionic.epub suffix)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// JSON settings file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Suppress output messages
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log every rewritten document
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.quiet {
        "warn"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    let converter = Converter::new(config).map_err(|e| e.to_string())?;

    let output = cli.output.clone().unwrap_or_else(|| default_output(&cli.input));
    let report = converter
        .convert_file(&cli.input, &output)
        .map_err(|e| e.to_string())?;

    if !cli.quiet {
        println!(
            "{} -> {} ({} documents, {} words)",
            cli.input.display(),
            output.display(),
            report.documents,
            report.stats.words
        );
    }
    Ok(())
}

fn load_config(path: &Path) -> Result<Config, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid config {}: {e}", path.display()))
}

fn default_output(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    input.with_file_name(output_file_name(&name))
}
