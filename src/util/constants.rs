// feedsniff - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.
// Every bound used by the sniffer, the app layer, and config validation
// lives here so limits are auditable in one place.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "feedsniff";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "feedsniff";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Sniffing
// =============================================================================

/// Buffers shorter than this are classified as `Unknown`. Distinguishing
/// markers (an `<rss` tag, a JSON Feed `version` key) may not have arrived
/// yet on a streaming connection; callers ask again with more bytes.
pub const MIN_BYTES_REQUIRED: usize = 128;

/// Only this many leading bytes are examined for JSON keys and markup
/// markers. Keeps classification cost independent of total buffer size.
pub const SNIFF_WINDOW_BYTES: usize = 8 * 1024; // 8 KB

/// URI fragment identifying a JSON Feed `version` value
/// (`https://jsonfeed.org/version/1`, `.../1.1`).
pub const JSON_FEED_VERSION_MARKER: &str = "jsonfeed.org/version";

/// Atom 1.0 namespace URI.
pub const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";

// =============================================================================
// Input limits
// =============================================================================

/// Files larger than this are refused rather than read into memory.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 64 * 1024 * 1024; // 64 MB

/// Hard upper bound on the configurable maximum file size.
pub const ABSOLUTE_MAX_FILE_SIZE: u64 = 1024 * 1024 * 1024; // 1 GB

/// File size in bytes above which files are memory-mapped instead of read.
pub const DEFAULT_LARGE_FILE_THRESHOLD: u64 = 4 * 1024 * 1024; // 4 MB

/// Retry limits for transient I/O errors when reading small files.
pub const MAX_READ_RETRIES: u32 = 3;

/// Backoff delays between read retries (ms).
pub const READ_RETRY_DELAYS_MS: [u64; 3] = [50, 100, 200];

// =============================================================================
// Discovery limits
// =============================================================================

/// Maximum directory recursion depth during discovery.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Hard upper bound on max depth (prevents runaway traversal).
pub const ABSOLUTE_MAX_DEPTH: usize = 50;

/// Minimum sensible value for the max-files limit.
pub const MIN_MAX_FILES: usize = 1;

/// Maximum number of files to discover in a single walk.
pub const DEFAULT_MAX_FILES: usize = 1_000;

/// Hard upper bound on max files.
pub const ABSOLUTE_MAX_FILES: usize = 50_000;

/// Default include glob patterns for feed file discovery.
pub const DEFAULT_INCLUDE_PATTERNS: &[&str] = &[
    "*.xml", "*.rss", "*.rdf", "*.atom", "*.json", "*.feed", "*.html", "*.htm",
];

/// Default exclude glob patterns for feed file discovery.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    "*.gz",
    "*.zip",
    "*.tmp",
    "node_modules",
    ".git",
    "target",
];

// =============================================================================
// Batch processing
// =============================================================================

/// Default number of worker threads for batch classification.
/// 0 means auto-detect (use available CPU cores).
pub const DEFAULT_WORKER_THREADS: usize = 0;

/// Hard upper bound on configurable worker threads.
pub const MAX_WORKER_THREADS: usize = 256;

// =============================================================================
// Streaming
// =============================================================================

/// Default chunk size used when simulating a streaming download.
pub const DEFAULT_STREAM_CHUNK_SIZE: usize = 64;

/// Minimum configurable stream chunk size.
pub const MIN_STREAM_CHUNK_SIZE: usize = 1;

/// Maximum configurable stream chunk size.
pub const MAX_STREAM_CHUNK_SIZE: usize = 1024 * 1024; // 1 MB

/// Bytes a `StreamSniffer` keeps buffered. Nothing past the sniff window
/// can change a classification, so the buffer never grows beyond it.
pub const STREAM_BUFFER_LIMIT: usize = SNIFF_WINDOW_BYTES;

// =============================================================================
// Output
// =============================================================================

/// Default report format.
pub const DEFAULT_OUTPUT_FORMAT: &str = "text";

/// Report formats accepted in config.toml and on the command line.
pub const VALID_OUTPUT_FORMATS: &[&str] = &["text", "json", "csv"];

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log levels accepted in config.toml.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Maximum size of config.toml in bytes.
pub const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024; // 64 KB
