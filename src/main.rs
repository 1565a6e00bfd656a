// feedsniff - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and validation
// 3. Logging initialisation (debug mode support)
// 4. Path expansion (files as given, directories via discovery)
// 5. Batch classification / parsing and report output
//
// Exit status: 0 success, 1 an input could not be read or parsed (or the
// report could not be written), 2 invalid usage or configuration.

use clap::{Parser, ValueEnum};
use feedsniff::app::batch::{self, BatchConfig};
use feedsniff::core::discovery::{self, DiscoveryConfig};
use feedsniff::core::export;
use feedsniff::core::model::{DiscoveredFile, FileReport};
use feedsniff::platform::config::{self, AppConfig};
use feedsniff::util::error::{ExportError, FeedSniffError};
use feedsniff::util::{constants, logging};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// feedsniff - identify feed formats from their first bytes.
///
/// Classifies files as RSS, Atom, JSON Feed, RSS-in-JSON or not-a-feed,
/// and optionally parses them to summarise their contents.
#[derive(Parser, Debug)]
#[command(name = "feedsniff", version, about)]
struct Cli {
    /// Files or directories to examine. Directories are searched for
    /// candidate feed files.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Also parse each feed and summarise it.
    #[arg(long)]
    parse: bool,

    /// Report format (default from config, else text).
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Write the report to FILE instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Classify each file as a simulated stream and report how many bytes
    /// were needed to decide. Chunks are [stream] chunk_size_bytes long.
    #[arg(long)]
    stream: bool,

    /// Stream in chunks of N bytes (implies --stream).
    #[arg(long, value_name = "N")]
    chunk_size: Option<usize>,

    /// Path to config.toml (default: platform config directory).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Worker threads (0 = one per CPU core).
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    /// Map a validated `[output] format` value.
    fn from_config(value: &str) -> Self {
        match value {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            _ => OutputFormat::Text,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (app_config, config_warnings) = match load_app_config(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            logging::init(cli.debug, None);
            return fail(&e);
        }
    };

    logging::init(cli.debug, app_config.log_level.as_deref());
    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "feedsniff starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    match run(&cli, &app_config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => fail(&e),
    }
}

fn load_app_config(cli: &Cli) -> Result<(AppConfig, Vec<String>), FeedSniffError> {
    let loaded = match &cli.config {
        Some(path) => config::load_config(path, true)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, false)?,
            None => (AppConfig::default(), Vec::new()),
        },
    };
    Ok(loaded)
}

/// Returns `Ok(false)` when at least one input failed.
fn run(cli: &Cli, app_config: &AppConfig) -> Result<bool, FeedSniffError> {
    let batch_config = BatchConfig {
        worker_threads: match cli.jobs {
            Some(jobs) => config::validate_worker_threads(jobs)?,
            None => app_config.worker_threads,
        },
        parse: cli.parse,
        chunk_size: match (cli.chunk_size, cli.stream) {
            (Some(n), _) => Some(config::validate_chunk_size(n)?),
            (None, true) => Some(app_config.chunk_size),
            (None, false) => None,
        },
        max_file_size: app_config.max_file_size,
    };

    let (files, mut reports) = expand_paths(&cli.paths, app_config);
    reports.extend(batch::run_batch(&files, &batch_config));

    let format = cli
        .format
        .unwrap_or_else(|| OutputFormat::from_config(&app_config.output_format));
    write_report(&reports, format, cli.output.as_deref())?;

    Ok(reports.iter().all(|r| r.error.is_none()))
}

/// Turn command-line paths into the list of files to examine. Directories
/// are searched with discovery; a directory that cannot be searched becomes
/// a failed report.
fn expand_paths(
    paths: &[PathBuf],
    app_config: &AppConfig,
) -> (Vec<DiscoveredFile>, Vec<FileReport>) {
    let discovery_config = DiscoveryConfig {
        max_depth: app_config.max_depth,
        max_files: app_config.max_files,
        include_patterns: app_config.include_patterns.clone(),
        exclude_patterns: app_config.exclude_patterns.clone(),
        large_file_threshold: app_config.large_file_threshold,
    };

    let mut files = Vec::new();
    let mut failed = Vec::new();

    for path in paths {
        if !path.is_dir() {
            files.push(discovery::describe_file(path, app_config.large_file_threshold));
            continue;
        }
        match discovery::discover_files(path, &discovery_config, |file, count| {
            tracing::trace!(file = %file.path.display(), count, "Candidate found");
        }) {
            Ok((found, warnings)) => {
                for warning in &warnings {
                    tracing::warn!(warning = %warning, "Discovery warning");
                }
                files.extend(found);
            }
            Err(e) => {
                tracing::warn!(root = %path.display(), error = %e, "Discovery failed");
                failed.push(FileReport::failed(path.clone(), e.to_string()));
            }
        }
    }

    (files, failed)
}

fn write_report(
    reports: &[FileReport],
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), FeedSniffError> {
    let label = output.unwrap_or_else(|| Path::new("<stdout>"));
    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = std::fs::File::create(path).map_err(|source| ExportError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Box::new(std::io::BufWriter::new(file))
        }
        None => Box::new(std::io::stdout().lock()),
    };

    let written = match format {
        OutputFormat::Text => export::export_text(reports, writer, label)?,
        OutputFormat::Json => export::export_json(reports, writer, label)?,
        OutputFormat::Csv => export::export_csv(reports, writer, label)?,
    };
    tracing::debug!(reports = written, ?format, "Report written");
    Ok(())
}

fn fail(e: &FeedSniffError) -> ExitCode {
    tracing::error!(error = %e, "feedsniff failed");
    eprintln!("Error: {e}");
    match e {
        FeedSniffError::Config(_) => ExitCode::from(2),
        _ => ExitCode::from(1),
    }
}
