// feedsniff - app/batch.rs
//
// Classify (and optionally parse) many feed files concurrently.
//
// Work is spread over a dedicated rayon pool sized from config. Each file
// is independent: a file that cannot be read produces a failed report and
// the batch carries on. Reports come back in input order regardless of
// which worker finished first.

use crate::app::stream;
use crate::core::dispatch;
use crate::core::model::{DiscoveredFile, FeedFormat, FeedSummary, FileReport, ParserData};
use crate::core::sniffer;
use crate::platform::fs;
use crate::util::constants;
use rayon::prelude::*;
use std::path::Path;

/// Per-run options for a batch.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Worker threads (0 = one per CPU core).
    pub worker_threads: usize,

    /// Dispatch each feed to its parser and summarise the result.
    pub parse: bool,

    /// When set, classify by feeding the file through `StreamSniffer` in
    /// chunks of this many bytes and record how many bytes were needed.
    pub chunk_size: Option<usize>,

    /// Files larger than this are refused when parsing.
    pub max_file_size: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            worker_threads: constants::DEFAULT_WORKER_THREADS,
            parse: false,
            chunk_size: None,
            max_file_size: constants::DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// Examine every file in `files` and return one report per file, in order.
pub fn run_batch(files: &[DiscoveredFile], config: &BatchConfig) -> Vec<FileReport> {
    let threads = config.worker_threads.min(constants::MAX_WORKER_THREADS);

    tracing::info!(
        files = files.len(),
        threads,
        parse = config.parse,
        chunk_size = ?config.chunk_size,
        "Batch starting"
    );

    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("feedsniff-worker-{i}"))
        .build()
    {
        Ok(pool) => pool,
        Err(e) => {
            // Fall back to the global pool rather than failing the batch.
            tracing::warn!(error = %e, "Could not build worker pool; using global pool");
            return files.par_iter().map(|f| examine_file(f, config)).collect();
        }
    };

    let reports: Vec<FileReport> =
        pool.install(|| files.par_iter().map(|f| examine_file(f, config)).collect());

    let failed = reports.iter().filter(|r| r.error.is_some()).count();
    let feeds = reports.iter().filter(|r| r.format.is_feed()).count();
    tracing::info!(files = reports.len(), feeds, failed, "Batch complete");

    reports
}

/// Classify one file, then parse it if requested. The size recorded at
/// discovery goes into the report, and the large-file flag decides whether
/// the file is memory-mapped for parsing.
pub fn examine_file(file: &DiscoveredFile, config: &BatchConfig) -> FileReport {
    let path = file.path.as_path();

    let mut report = match config.chunk_size {
        Some(chunk_size) => classify_streaming(path, file.size, chunk_size),
        None => classify_prefix(path, file.size),
    };
    if report.error.is_some() || !config.parse || !report.format.is_feed() {
        return report;
    }

    let bytes = match fs::read_feed_bytes(path, config.max_file_size, file.is_large) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "File read failed");
            report.error = Some(e.to_string());
            return report;
        }
    };

    let url = path.to_str();
    match dispatch::parse_feed(&ParserData::new(url, &bytes)) {
        Ok(Some(feed)) => report.summary = Some(FeedSummary::from_feed(&feed)),
        Ok(None) => {
            tracing::debug!(file = %path.display(), format = %report.format, "Parser found nothing");
        }
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "Feed parse failed");
            report.error = Some(e.to_string());
        }
    }
    report
}

fn classify_prefix(path: &Path, size: u64) -> FileReport {
    match fs::read_prefix(path, constants::SNIFF_WINDOW_BYTES) {
        Ok(prefix) => {
            let format = sniffer::classify(&prefix);
            tracing::debug!(file = %path.display(), %format, "Classified");
            FileReport::new(path.to_path_buf(), size, format)
        }
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "File read failed");
            FileReport::failed(path.to_path_buf(), e.to_string())
        }
    }
}

fn classify_streaming(path: &Path, size: u64, chunk_size: usize) -> FileReport {
    let result = std::fs::File::open(path).and_then(|file| stream::sniff_reader(file, chunk_size));
    match result {
        Ok(sniffer) => {
            let format: FeedFormat = sniffer.format();
            tracing::debug!(
                file = %path.display(),
                %format,
                decided_at = ?sniffer.decided_at(),
                "Classified from stream"
            );
            let mut report = FileReport::new(path.to_path_buf(), size, format);
            report.bytes_to_decide = sniffer.decided_at();
            report
        }
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "File read failed");
            FileReport::failed(
                path.to_path_buf(),
                format!("'{}': I/O error: {e}", path.display()),
            )
        }
    }
}
