// feedsniff - platform/config.rs
//
// Configuration directory resolution and config.toml loading with
// validation against the named limits in util::constants.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.
//
// A config file that cannot be read or parsed is an error (the CLI exits
// with status 2). A parseable file with out-of-range values is not: each
// bad value produces a warning and falls back to its default.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Default location of config.toml for this platform, if one can be
/// determined (e.g. ~/.config/feedsniff/config.toml).
pub fn default_config_path() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", constants::APP_ID)?;
    let path = dirs.config_dir().join(constants::CONFIG_FILE_NAME);
    tracing::debug!(path = %path.display(), "Default config path resolved");
    Some(path)
}

// =============================================================================
// Raw config.toml shape
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub input: InputSection,
    pub discovery: DiscoverySection,
    pub batch: BatchSection,
    pub stream: StreamSection,
    pub output: OutputSection,
    pub logging: LoggingSection,
}

/// `[input]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct InputSection {
    /// Files larger than this are refused.
    pub max_file_size_bytes: Option<u64>,
    /// Files at or above this size are memory-mapped.
    pub large_file_threshold_bytes: Option<u64>,
}

/// `[discovery]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DiscoverySection {
    pub max_depth: Option<usize>,
    pub max_files: Option<usize>,
    pub include_patterns: Option<Vec<String>>,
    pub exclude_patterns: Option<Vec<String>>,
}

/// `[batch]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct BatchSection {
    /// Number of worker threads (0 = one per CPU core).
    pub worker_threads: Option<usize>,
}

/// `[stream]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct StreamSection {
    /// Chunk size used by `--chunk-size` when given without a value.
    pub chunk_size_bytes: Option<usize>,
}

/// `[output]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// "text", "json" or "csv".
    pub format: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// "error", "warn", "info", "debug" or "trace".
    pub level: Option<String>,
}

// =============================================================================
// Validated config
// =============================================================================

/// Validated application configuration derived from `config.toml`.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // -- Input --
    pub max_file_size: u64,
    pub large_file_threshold: u64,

    // -- Discovery --
    pub max_depth: usize,
    pub max_files: usize,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,

    // -- Batch / stream --
    pub worker_threads: usize,
    pub chunk_size: usize,

    // -- Output --
    /// One of `VALID_OUTPUT_FORMATS`.
    pub output_format: String,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let owned = |patterns: &[&str]| -> Vec<String> {
            patterns.iter().map(|s| (*s).to_string()).collect()
        };
        Self {
            max_file_size: constants::DEFAULT_MAX_FILE_SIZE,
            large_file_threshold: constants::DEFAULT_LARGE_FILE_THRESHOLD,
            max_depth: constants::DEFAULT_MAX_DEPTH,
            max_files: constants::DEFAULT_MAX_FILES,
            include_patterns: owned(constants::DEFAULT_INCLUDE_PATTERNS),
            exclude_patterns: owned(constants::DEFAULT_EXCLUDE_PATTERNS),
            worker_threads: constants::DEFAULT_WORKER_THREADS,
            chunk_size: constants::DEFAULT_STREAM_CHUNK_SIZE,
            output_format: constants::DEFAULT_OUTPUT_FORMAT.to_string(),
            log_level: None,
        }
    }
}

/// Load and validate a config file.
///
/// `explicit` is true when the path came from `--config`: a missing file is
/// then an error. A missing default config is normal (first run) and yields
/// defaults. Returns the config plus non-fatal validation warnings.
pub fn load_config(path: &Path, explicit: bool) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    let meta = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !explicit => {
            tracing::debug!(path = %path.display(), "No config.toml found; using defaults");
            return Ok((AppConfig::default(), Vec::new()));
        }
        Err(e) => return Err(io_err(e)),
    };
    if meta.len() > constants::MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::FileTooLarge {
            path: path.to_path_buf(),
            size: meta.len(),
            max: constants::MAX_CONFIG_FILE_SIZE,
        });
    }

    let content = std::fs::read_to_string(path).map_err(io_err)?;
    let (config, warnings) = parse_config(&content).map_err(|source| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), "Loaded config.toml");
    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }
    Ok((config, warnings))
}

/// Parse config.toml text and validate each field against named constants,
/// accumulating a warning for every value that is rejected.
pub fn parse_config(content: &str) -> Result<(AppConfig, Vec<String>), toml::de::Error> {
    let raw: RawConfig = toml::from_str(content)?;
    let mut config = AppConfig::default();
    let mut warnings: Vec<String> = Vec::new();

    // -- Input --
    if let Some(max) = raw.input.max_file_size_bytes {
        if (1..=constants::ABSOLUTE_MAX_FILE_SIZE).contains(&max) {
            config.max_file_size = max;
        } else {
            warnings.push(format!(
                "[input] max_file_size_bytes = {max} is out of range (1-{}). Using default ({}).",
                constants::ABSOLUTE_MAX_FILE_SIZE,
                constants::DEFAULT_MAX_FILE_SIZE,
            ));
        }
    }
    if let Some(threshold) = raw.input.large_file_threshold_bytes {
        config.large_file_threshold = threshold;
    }

    // -- Discovery --
    if let Some(depth) = raw.discovery.max_depth {
        if (1..=constants::ABSOLUTE_MAX_DEPTH).contains(&depth) {
            config.max_depth = depth;
        } else {
            warnings.push(format!(
                "[discovery] max_depth = {depth} is out of range (1-{}). Using default ({}).",
                constants::ABSOLUTE_MAX_DEPTH,
                constants::DEFAULT_MAX_DEPTH,
            ));
        }
    }
    if let Some(files) = raw.discovery.max_files {
        if (constants::MIN_MAX_FILES..=constants::ABSOLUTE_MAX_FILES).contains(&files) {
            config.max_files = files;
        } else {
            warnings.push(format!(
                "[discovery] max_files = {files} is out of range ({}-{}). Using default ({}).",
                constants::MIN_MAX_FILES,
                constants::ABSOLUTE_MAX_FILES,
                constants::DEFAULT_MAX_FILES,
            ));
        }
    }
    if let Some(patterns) = raw.discovery.include_patterns {
        config.include_patterns = patterns;
    }
    if let Some(patterns) = raw.discovery.exclude_patterns {
        config.exclude_patterns = patterns;
    }

    // -- Batch --
    if let Some(threads) = raw.batch.worker_threads {
        match validate_worker_threads(threads) {
            Ok(n) => config.worker_threads = n,
            Err(e) => warnings.push(format!("[batch] {e}. Using default (auto).")),
        }
    }

    // -- Stream --
    if let Some(size) = raw.stream.chunk_size_bytes {
        match validate_chunk_size(size) {
            Ok(n) => config.chunk_size = n,
            Err(e) => warnings.push(format!(
                "[stream] {e}. Using default ({}).",
                constants::DEFAULT_STREAM_CHUNK_SIZE
            )),
        }
    }

    // -- Output --
    if let Some(format) = raw.output.format {
        let lower = format.to_lowercase();
        if constants::VALID_OUTPUT_FORMATS.contains(&lower.as_str()) {
            config.output_format = lower;
        } else {
            warnings.push(format!(
                "[output] format = \"{format}\" is not recognised. \
                 Valid values: {}. Using default ({}).",
                constants::VALID_OUTPUT_FORMATS.join(", "),
                constants::DEFAULT_OUTPUT_FORMAT,
            ));
        }
    }

    // -- Logging --
    if let Some(level) = raw.logging.level {
        if constants::VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: {}. Using default ({}).",
                constants::VALID_LOG_LEVELS.join(", "),
                constants::DEFAULT_LOG_LEVEL,
            ));
        }
    }

    Ok((config, warnings))
}

/// Check a worker thread count (0 = auto) against `MAX_WORKER_THREADS`.
pub fn validate_worker_threads(threads: usize) -> Result<usize, ConfigError> {
    if threads <= constants::MAX_WORKER_THREADS {
        Ok(threads)
    } else {
        Err(ConfigError::ValueOutOfRange {
            field: "worker_threads".to_string(),
            value: threads.to_string(),
            expected: format!("0-{} (0 = auto)", constants::MAX_WORKER_THREADS),
        })
    }
}

/// Check a stream chunk size against the configured bounds.
pub fn validate_chunk_size(size: usize) -> Result<usize, ConfigError> {
    if (constants::MIN_STREAM_CHUNK_SIZE..=constants::MAX_STREAM_CHUNK_SIZE).contains(&size) {
        Ok(size)
    } else {
        Err(ConfigError::ValueOutOfRange {
            field: "chunk_size_bytes".to_string(),
            value: size.to_string(),
            expected: format!(
                "{}-{}",
                constants::MIN_STREAM_CHUNK_SIZE,
                constants::MAX_STREAM_CHUNK_SIZE
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_empty_config_is_default() {
        let (config, warnings) = parse_config("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_valid_values_applied() {
        let toml = r#"
            [input]
            max_file_size_bytes = 1048576
            [discovery]
            max_depth = 3
            include_patterns = ["*.xml"]
            [batch]
            worker_threads = 4
            [stream]
            chunk_size_bytes = 512
            [output]
            format = "JSON"
            [logging]
            level = "debug"
            [future_section]
            anything = true
        "#;
        let (config, warnings) = parse_config(toml).unwrap();
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert_eq!(config.max_file_size, 1_048_576);
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.include_patterns, vec!["*.xml"]);
        assert_eq!(config.worker_threads, 4);
        assert_eq!(config.chunk_size, 512);
        assert_eq!(config.output_format, "json");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_out_of_range_values_warn_and_fall_back() {
        let toml = r#"
            [discovery]
            max_depth = 0
            max_files = 999999999
            [batch]
            worker_threads = 100000
            [stream]
            chunk_size_bytes = 0
            [output]
            format = "xml"
            [logging]
            level = "loud"
        "#;
        let (config, warnings) = parse_config(toml).unwrap();
        assert_eq!(warnings.len(), 6, "one warning per bad value: {warnings:?}");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        assert!(parse_config("[discovery]\nmax_depth = \"deep\"").is_err());
    }

    #[test]
    fn test_load_missing_default_vs_explicit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let (config, warnings) = load_config(&path, false).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());

        assert!(matches!(
            load_config(&path, true),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_load_unparseable_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[discovery\nmax_depth = 3").unwrap();
        assert!(matches!(
            load_config(&path, false),
            Err(ConfigError::TomlParse { .. })
        ));
    }

    #[test]
    fn test_load_oversized_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let padding = "#".repeat(constants::MAX_CONFIG_FILE_SIZE as usize + 1);
        fs::write(&path, padding).unwrap();
        assert!(matches!(
            load_config(&path, false),
            Err(ConfigError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_cli_range_checks() {
        assert_eq!(validate_chunk_size(1).unwrap(), 1);
        assert!(matches!(
            validate_chunk_size(0),
            Err(ConfigError::ValueOutOfRange { .. })
        ));
        assert_eq!(validate_worker_threads(0).unwrap(), 0);
        assert!(validate_worker_threads(constants::MAX_WORKER_THREADS + 1).is_err());
    }
}
