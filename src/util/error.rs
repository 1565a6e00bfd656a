// feedsniff - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation: every variant carries structured
// fields, and `source()` exposes the underlying cause for diagnostic logging.
//
// Note that "not enough data yet" and "not a feed" are NOT errors; they are
// ordinary `FeedFormat` values. Only a delegated parser that recognises its
// format but cannot read it produces a `FeedParseError`.

use crate::core::model::FeedFormat;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all feedsniff operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum FeedSniffError {
    /// A delegated format parser rejected the content.
    Parse(FeedParseError),

    /// Reading an input file failed.
    Input(InputError),

    /// File discovery failed.
    Discovery(DiscoveryError),

    /// Writing a report failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),
}

impl fmt::Display for FeedSniffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "Parse error: {e}"),
            Self::Input(e) => write!(f, "Input error: {e}"),
            Self::Discovery(e) => write!(f, "Discovery error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for FeedSniffError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Input(e) => Some(e),
            Self::Discovery(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Feed parse errors
// ---------------------------------------------------------------------------

/// Failures raised by the JSON-based format parsers after the sniffer has
/// already recognised the buffer. The dispatcher forwards these unchanged.
#[derive(Debug)]
pub enum FeedParseError {
    /// The buffer looked like JSON of the given format but did not decode.
    InvalidJson {
        format: FeedFormat,
        source: serde_json::Error,
    },

    /// JSON Feed document has no `version` string.
    VersionNotFound,

    /// JSON Feed document has no `title` string.
    TitleNotFound,

    /// JSON Feed document has no `items` array.
    ItemsMissing,

    /// RSS-in-JSON document has no `rss.channel` object.
    ChannelNotFound,
}

impl fmt::Display for FeedParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJson { format, source } => {
                write!(f, "invalid JSON in {format} document: {source}")
            }
            Self::VersionNotFound => write!(f, "JSON Feed is missing its 'version' string"),
            Self::TitleNotFound => write!(f, "JSON Feed is missing its 'title' string"),
            Self::ItemsMissing => write!(f, "JSON Feed is missing its 'items' array"),
            Self::ChannelNotFound => write!(f, "RSS-in-JSON document has no 'rss.channel' object"),
        }
    }
}

impl std::error::Error for FeedParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidJson { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<FeedParseError> for FeedSniffError {
    fn from(e: FeedParseError) -> Self {
        Self::Parse(e)
    }
}

// ---------------------------------------------------------------------------
// Input errors
// ---------------------------------------------------------------------------

/// Errors reading feed bytes from disk.
#[derive(Debug)]
pub enum InputError {
    /// I/O error opening or reading the file.
    Io { path: PathBuf, source: io::Error },

    /// File exceeds the configured maximum size.
    TooLarge { path: PathBuf, size: u64, max: u64 },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "'{}': I/O error: {source}", path.display())
            }
            Self::TooLarge { path, size, max } => write!(
                f,
                "'{}' is {size} bytes, exceeds maximum of {max} bytes. \
                 Raise [input] max_file_size_bytes in config if this is expected.",
                path.display()
            ),
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::TooLarge { .. } => None,
        }
    }
}

impl From<InputError> for FeedSniffError {
    fn from(e: InputError) -> Self {
        Self::Input(e)
    }
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

/// Errors related to feed file discovery.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The root path does not exist or is not accessible.
    RootNotFound { path: PathBuf },

    /// The root path is not a directory.
    NotADirectory { path: PathBuf },

    /// Permission denied accessing the root path.
    PermissionDenied { path: PathBuf, source: io::Error },

    /// Walkdir traversal error.
    Traversal {
        path: PathBuf,
        source: walkdir::Error,
    },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "Path '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Path '{}' is not a directory", path.display())
            }
            Self::PermissionDenied { path, source } => {
                write!(
                    f,
                    "Permission denied accessing '{}': {source}",
                    path.display()
                )
            }
            Self::Traversal { path, source } => {
                write!(f, "Error traversing '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PermissionDenied { source, .. } => Some(source),
            Self::Traversal { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DiscoveryError> for FeedSniffError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to writing reports.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the report.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Report I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV report error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON report error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for FeedSniffError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// Config file exceeds the maximum allowed size.
    FileTooLarge { path: PathBuf, size: u64, max: u64 },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::FileTooLarge { path, size, max } => write!(
                f,
                "Config '{}' is {size} bytes, exceeds maximum of {max} bytes",
                path.display()
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for FeedSniffError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for feedsniff results.
pub type Result<T> = std::result::Result<T, FeedSniffError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_parse_error_chain_preserved() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: FeedSniffError = FeedParseError::InvalidJson {
            format: FeedFormat::JsonFeed,
            source: json_err,
        }
        .into();

        assert!(err.to_string().starts_with("Parse error: invalid JSON in JSON Feed"));
        let parse = err.source().expect("top-level error exposes its cause");
        assert!(parse.source().is_some(), "serde_json error must stay in the chain");
    }

    #[test]
    fn test_input_too_large_message_is_actionable() {
        let err = InputError::TooLarge {
            path: PathBuf::from("big.xml"),
            size: 10,
            max: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("big.xml"));
        assert!(msg.contains("max_file_size_bytes"));
        assert!(err.source().is_none());
    }
}
