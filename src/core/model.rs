// feedsniff - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary across all layers: the sniffer's
// classification, the borrowed input view, the normalised feed produced by
// the parser collaborators, and the per-file records used by the app layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// =============================================================================
// Feed format (classification)
// =============================================================================

/// The sniffer's answer for a byte buffer. Exactly one value per call.
///
/// `Unknown` means "not enough bytes yet, ask again"; `NotAFeed` is a
/// definitive rejection. Every other variant routes to exactly one parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedFormat {
    Unknown,
    NotAFeed,
    Rss,
    Atom,
    JsonFeed,
    RssInJson,
}

impl FeedFormat {
    /// Returns all variants in display order.
    pub fn all() -> &'static [FeedFormat] {
        &[
            FeedFormat::Unknown,
            FeedFormat::NotAFeed,
            FeedFormat::Rss,
            FeedFormat::Atom,
            FeedFormat::JsonFeed,
            FeedFormat::RssInJson,
        ]
    }

    /// True for the four formats that have a parser.
    pub fn is_feed(&self) -> bool {
        matches!(
            self,
            FeedFormat::Rss | FeedFormat::Atom | FeedFormat::JsonFeed | FeedFormat::RssInJson
        )
    }

    /// True once the sniffer has made up its mind (anything but `Unknown`).
    pub fn is_definitive(&self) -> bool {
        *self != FeedFormat::Unknown
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            FeedFormat::Unknown => "Unknown",
            FeedFormat::NotAFeed => "Not a feed",
            FeedFormat::Rss => "RSS",
            FeedFormat::Atom => "Atom",
            FeedFormat::JsonFeed => "JSON Feed",
            FeedFormat::RssInJson => "RSS-in-JSON",
        }
    }

    /// Stable machine identifier (matches the serde representation).
    pub fn id(&self) -> &'static str {
        match self {
            FeedFormat::Unknown => "unknown",
            FeedFormat::NotAFeed => "not-a-feed",
            FeedFormat::Rss => "rss",
            FeedFormat::Atom => "atom",
            FeedFormat::JsonFeed => "json-feed",
            FeedFormat::RssInJson => "rss-in-json",
        }
    }
}

impl std::fmt::Display for FeedFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Parser input
// =============================================================================

/// A read-only view of feed bytes plus where they came from.
///
/// `url` is provenance only. The sniffer and dispatcher never look at it;
/// parsers may copy it into `ParsedFeed::feed_url` when the document does
/// not name itself.
#[derive(Debug, Clone, Copy)]
pub struct ParserData<'a> {
    pub url: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> ParserData<'a> {
    pub fn new(url: Option<&'a str>, data: &'a [u8]) -> Self {
        Self { url, data }
    }

    /// Bytes with no known origin (e.g. a clipboard paste).
    pub fn from_bytes(data: &'a [u8]) -> Self {
        Self { url: None, data }
    }
}

// =============================================================================
// Normalised feed (parser output)
// =============================================================================

/// A feed normalised across all four source formats.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ParsedFeed {
    /// Format the feed was parsed from. `None` only for hand-built values.
    pub format: Option<FeedFormat>,
    pub title: Option<String>,
    pub home_page_url: Option<String>,
    pub feed_url: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub icon_url: Option<String>,
    pub favicon_url: Option<String>,
    pub authors: Vec<ParsedAuthor>,
    pub hubs: Vec<ParsedHub>,
    pub items: Vec<ParsedItem>,
}

/// One entry/item of a feed.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ParsedItem {
    /// Stable identifier (guid, Atom id, JSON Feed id, or a fallback).
    pub unique_id: String,
    pub url: Option<String>,
    pub external_url: Option<String>,
    pub title: Option<String>,
    pub content_html: Option<String>,
    pub content_text: Option<String>,
    pub summary: Option<String>,
    pub image_url: Option<String>,
    pub date_published: Option<DateTime<Utc>>,
    pub date_modified: Option<DateTime<Utc>>,
    pub authors: Vec<ParsedAuthor>,
    pub tags: Vec<String>,
    pub attachments: Vec<ParsedAttachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct ParsedAuthor {
    pub name: Option<String>,
    pub url: Option<String>,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
}

impl ParsedAuthor {
    /// True when no field is set; such authors are dropped by the parsers.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.url.is_none() && self.avatar_url.is_none() && self.email.is_none()
    }
}

/// An enclosure / attachment (podcast audio, images, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ParsedAttachment {
    pub url: String,
    pub mime_type: Option<String>,
    pub title: Option<String>,
    pub size_in_bytes: Option<u64>,
    pub duration_in_seconds: Option<f64>,
}

/// A WebSub hub advertised by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedHub {
    pub hub_type: String,
    pub url: String,
}

// =============================================================================
// Files (app layer records)
// =============================================================================

/// A candidate feed file found during discovery.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file.
    pub path: PathBuf,

    /// File size in bytes.
    pub size: u64,

    /// Whether this file exceeds the large file threshold (read via mmap).
    pub is_large: bool,
}

impl DiscoveredFile {
    pub fn new(path: PathBuf, size: u64, large_file_threshold: u64) -> Self {
        Self {
            path,
            size,
            is_large: size >= large_file_threshold,
        }
    }
}

/// Short description of a parsed feed, suitable for reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedSummary {
    pub title: Option<String>,
    pub home_page_url: Option<String>,
    pub item_count: usize,
    pub newest_item: Option<DateTime<Utc>>,
}

impl FeedSummary {
    pub fn from_feed(feed: &ParsedFeed) -> Self {
        Self {
            title: feed.title.clone(),
            home_page_url: feed.home_page_url.clone(),
            item_count: feed.items.len(),
            newest_item: feed
                .items
                .iter()
                .filter_map(|i| i.date_published.or(i.date_modified))
                .max(),
        }
    }
}

/// Per-file result of a batch run: what the file is and, optionally,
/// what parsing it produced.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub size: u64,
    pub format: FeedFormat,

    /// Bytes a streaming reader needed before the classification became
    /// definitive. Only set in streaming mode.
    pub bytes_to_decide: Option<usize>,

    /// Set when parsing was requested and produced a feed.
    pub summary: Option<FeedSummary>,

    /// Read or parse failure, rendered for display.
    pub error: Option<String>,
}

impl FileReport {
    pub fn new(path: PathBuf, size: u64, format: FeedFormat) -> Self {
        Self {
            path,
            size,
            format,
            bytes_to_decide: None,
            summary: None,
            error: None,
        }
    }

    /// A file that could not be read at all.
    pub fn failed(path: PathBuf, error: String) -> Self {
        Self {
            path,
            size: 0,
            format: FeedFormat::Unknown,
            bytes_to_decide: None,
            summary: None,
            error: Some(error),
        }
    }
}
