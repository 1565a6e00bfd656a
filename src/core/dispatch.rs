// feedsniff - core/dispatch.rs
//
// Route a buffer to the parser for its format.
//
// Classification is delegated to the sniffer; the result is matched
// exhaustively, so adding a `FeedFormat` variant forces a decision here.
// `Unknown` and `NotAFeed` short-circuit to `Ok(None)` without touching a
// parser. Parser results, including failures, pass through unchanged.

use crate::core::model::{FeedFormat, ParsedFeed, ParserData};
use crate::core::parsers::{BuiltinParsers, FeedParsers};
use crate::core::sniffer;
use crate::util::error::FeedParseError;

/// `Ok(Some)` parsed, `Ok(None)` nothing to parse (yet), `Err` the parser
/// recognised the format but could not read it.
pub type FeedParseOutcome = Result<Option<ParsedFeed>, FeedParseError>;

/// Classify `data` and parse it with the built-in parsers.
pub fn parse_feed(data: &ParserData<'_>) -> FeedParseOutcome {
    parse_feed_with(data, &BuiltinParsers)
}

/// Classify `data` and parse it with `parsers`.
pub fn parse_feed_with<P>(data: &ParserData<'_>, parsers: &P) -> FeedParseOutcome
where
    P: FeedParsers + ?Sized,
{
    match sniffer::feed_type(data) {
        FeedFormat::JsonFeed => parsers.parse_json_feed(data),
        FeedFormat::RssInJson => parsers.parse_rss_in_json(data),
        FeedFormat::Rss => Ok(parsers.parse_rss(data)),
        FeedFormat::Atom => Ok(parsers.parse_atom(data)),
        FeedFormat::Unknown | FeedFormat::NotAFeed => Ok(None),
    }
}
