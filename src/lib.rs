// feedsniff - lib.rs
//
// Library entry point. The `feedsniff` binary (main.rs) is a thin CLI over
// these modules; everything is also usable programmatically.
//
//   util      constants, error types, logging setup
//   core      sniffer, dispatcher, format parsers, discovery, export
//   platform  file reading, config.toml
//   app       batch and streaming orchestration

pub mod app;
pub mod core;
pub mod platform;
pub mod util;

pub use crate::core::dispatch::{parse_feed, parse_feed_with, FeedParseOutcome};
pub use crate::core::model::{FeedFormat, ParsedFeed, ParserData};
pub use crate::core::parsers::{BuiltinParsers, FeedParsers};
pub use crate::core::sniffer::{classify, feed_type};
pub use crate::util::error::FeedParseError;
