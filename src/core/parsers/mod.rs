// feedsniff - core/parsers/mod.rs
//
// Format parser collaborators.
//
// The dispatcher only knows the `FeedParsers` trait. `BuiltinParsers` is
// the stock implementation; callers with their own parsers (or tests that
// need to observe dispatch) supply a different implementor.
//
// The two JSON formats may fail with a `FeedParseError`. RSS and Atom are
// best effort: they return whatever they could extract, or `None`.

pub mod atom;
pub mod dates;
pub mod json_feed;
pub mod markup;
pub mod rss;
pub mod rss_in_json;

use crate::core::model::{ParsedFeed, ParserData};
use crate::util::error::FeedParseError;

/// One parser per feed format.
pub trait FeedParsers {
    fn parse_json_feed(&self, data: &ParserData<'_>)
        -> Result<Option<ParsedFeed>, FeedParseError>;

    fn parse_rss_in_json(
        &self,
        data: &ParserData<'_>,
    ) -> Result<Option<ParsedFeed>, FeedParseError>;

    fn parse_rss(&self, data: &ParserData<'_>) -> Option<ParsedFeed>;

    fn parse_atom(&self, data: &ParserData<'_>) -> Option<ParsedFeed>;
}

/// The parsers shipped with feedsniff. Stateless.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinParsers;

impl FeedParsers for BuiltinParsers {
    fn parse_json_feed(
        &self,
        data: &ParserData<'_>,
    ) -> Result<Option<ParsedFeed>, FeedParseError> {
        json_feed::parse(data)
    }

    fn parse_rss_in_json(
        &self,
        data: &ParserData<'_>,
    ) -> Result<Option<ParsedFeed>, FeedParseError> {
        rss_in_json::parse(data)
    }

    fn parse_rss(&self, data: &ParserData<'_>) -> Option<ParsedFeed> {
        rss::parse(data)
    }

    fn parse_atom(&self, data: &ParserData<'_>) -> Option<ParsedFeed> {
        atom::parse(data)
    }
}
