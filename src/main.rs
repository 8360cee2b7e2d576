//! speedread - speed-reading emphasis for EPUB books

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use speedread::segment::DEFAULT_CAPACITY;
use speedread::{Mode, RewriteOptions, RewriteReport, Rewriter, output_file_name};

#[derive(Parser)]
#[command(name = "speedread")]
#[command(version, about = "Speed-reading emphasis for EPUB books", long_about = None)]
#[command(after_help = "EXAMPLES:
    speedread book.epub                  Write book-speedread.epub next to the input
    speedread -m bionic book.epub out.epub
    speedread --json book.epub           Print a JSON report on stdout")]
struct Cli {
    /// Input EPUB file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (default: INPUT with a -speedread suffix)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Emphasis mode: syllable or bionic
    #[arg(short, long, env = "SPEEDREAD_MODE", default_value = "syllable")]
    mode: Mode,

    /// Words remembered per mode by the segmentation cache
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    cache_capacity: usize,

    /// Deflate level for rewritten documents (0-9)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=9))]
    compression_level: Option<u32>,

    /// Print the rewrite report as JSON
    #[arg(long)]
    json: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,

    /// Log filter, e.g. "debug" or "speedread=trace" (overrides RUST_LOG)
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
}

#[derive(Serialize)]
struct Summary<'a> {
    input: &'a Path,
    output: &'a Path,
    mode: Mode,
    #[serde(flatten)]
    report: RewriteReport,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_level.as_deref(), cli.quiet) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout stays clean for `--json`.
fn init_logging(log_level: Option<&str>, quiet: bool) -> Result<(), String> {
    let default = if quiet { "error" } else { "warn" };
    let filter = match log_level {
        Some(level) => EnvFilter::try_new(level).map_err(|e| format!("invalid log filter: {e}"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| format!("failed to initialize logging: {e}"))
}

fn run(cli: &Cli) -> Result<(), String> {
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output(&cli.input));

    let mut options = RewriteOptions::new()
        .with_mode(cli.mode)
        .with_cache_capacity(cli.cache_capacity);
    if let Some(level) = cli.compression_level {
        options = options.with_compression_level(level);
    }

    let report = Rewriter::with_options(options)
        .rewrite_file(&cli.input, &output)
        .map_err(|e| format!("{}: {e}", cli.input.display()))?;

    if cli.json {
        let summary = Summary {
            input: &cli.input,
            output: &output,
            mode: cli.mode,
            report,
        };
        let json = serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?;
        println!("{json}");
    } else if !cli.quiet {
        println!(
            "{}: {} of {} entries rewritten ({} skipped)",
            output.display(),
            report.rewritten,
            report.entries,
            report.skipped
        );
    }
    Ok(())
}

fn default_output(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(output_file_name(&name))
}
