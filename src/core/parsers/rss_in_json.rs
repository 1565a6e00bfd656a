// feedsniff - core/parsers/rss_in_json.rs
//
// RSS-in-JSON: an RSS 2.0 document transliterated into JSON,
// `{"rss": {"version": "2.0", "channel": {..., "item": [...]}}}`.
//
// Element names map to object keys, repeated elements to arrays, and a
// single element may appear as a bare object instead of a one-item array.
// Scalar values sometimes arrive as numbers, so strings are read leniently.

use crate::core::model::{
    FeedFormat, ParsedAttachment, ParsedAuthor, ParsedFeed, ParsedItem, ParserData,
};
use crate::core::parsers::dates::parse_date;
use crate::util::error::FeedParseError;
use serde_json::{Map, Value};

pub fn parse(data: &ParserData<'_>) -> Result<Option<ParsedFeed>, FeedParseError> {
    let root: Value =
        serde_json::from_slice(data.data).map_err(|source| FeedParseError::InvalidJson {
            format: FeedFormat::RssInJson,
            source,
        })?;

    let channel = root
        .get("rss")
        .and_then(|rss| rss.get("channel"))
        .and_then(Value::as_object)
        .ok_or(FeedParseError::ChannelNotFound)?;

    let mut feed = ParsedFeed {
        format: Some(FeedFormat::RssInJson),
        title: scalar(channel, "title"),
        home_page_url: scalar(channel, "link"),
        feed_url: data.url.map(str::to_string),
        description: scalar(channel, "description"),
        language: scalar(channel, "language"),
        icon_url: channel
            .get("image")
            .and_then(Value::as_object)
            .and_then(|image| scalar(image, "url")),
        ..Default::default()
    };

    feed.items = one_or_many(channel.get("item"))
        .filter_map(Value::as_object)
        .enumerate()
        .map(|(index, item)| parse_item(item, index))
        .collect();

    tracing::trace!(items = feed.items.len(), "RSS-in-JSON document extracted");

    Ok(Some(feed))
}

fn parse_item(item: &Map<String, Value>, index: usize) -> ParsedItem {
    let title = scalar(item, "title");
    let url = scalar(item, "link");

    // guid is either a bare string or {"isPermaLink": "false", "#value": "..."}.
    let guid = match item.get("guid") {
        Some(Value::Object(g)) => scalar(g, "#value").or_else(|| scalar(g, "value")),
        _ => scalar(item, "guid"),
    };

    let attachments = one_or_many(item.get("enclosure"))
        .filter_map(Value::as_object)
        .filter_map(|enc| {
            Some(ParsedAttachment {
                url: scalar(enc, "url")?,
                mime_type: scalar(enc, "type"),
                size_in_bytes: scalar(enc, "length").and_then(|l| l.parse().ok()),
                ..Default::default()
            })
        })
        .collect();

    let tags = one_or_many(item.get("category"))
        .filter_map(|c| match c {
            Value::Object(o) => scalar(o, "#value"),
            other => as_text(other),
        })
        .collect();

    ParsedItem {
        unique_id: guid
            .or_else(|| url.clone())
            .or_else(|| title.clone())
            .unwrap_or_else(|| format!("item-{index}")),
        url,
        title,
        summary: scalar(item, "description"),
        date_published: scalar(item, "pubDate").as_deref().and_then(parse_date),
        authors: scalar(item, "author")
            .map(|name| {
                vec![ParsedAuthor {
                    name: Some(name),
                    ..Default::default()
                }]
            })
            .unwrap_or_default(),
        tags,
        attachments,
        ..Default::default()
    }
}

/// Iterate a value that may be absent, a single element or an array.
fn one_or_many(value: Option<&Value>) -> impl Iterator<Item = &Value> {
    let slice: &[Value] = match value {
        Some(Value::Array(list)) => list,
        Some(single) => std::slice::from_ref(single),
        None => &[],
    };
    slice.iter()
}

fn scalar(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(as_text)
}

fn as_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(s: &str) -> Result<Option<ParsedFeed>, FeedParseError> {
        parse(&ParserData::from_bytes(s.as_bytes()))
    }

    #[test]
    fn test_channel_and_items() {
        let json = r##"{"rss": {"version": "2.0", "channel": {
            "title": "Scripting News", "link": "http://scripting.com/",
            "description": "It's even worse than it appears.",
            "item": [
                {"title": "One", "link": "http://scripting.com/1", "pubDate": "Mon, 15 Jan 2024 14:30:22 GMT",
                 "guid": {"isPermaLink": "false", "#value": "g-1"},
                 "enclosure": {"url": "http://scripting.com/1.mp3", "type": "audio/mpeg", "length": 321},
                 "category": ["x", {"domain": "d", "#value": "y"}]},
                {"description": "no title or link"}
            ]}}}"##;
        let feed = parse_str(json).unwrap().unwrap();
        assert_eq!(feed.format, Some(FeedFormat::RssInJson));
        assert_eq!(feed.title.as_deref(), Some("Scripting News"));
        assert_eq!(feed.items.len(), 2);

        let one = &feed.items[0];
        assert_eq!(one.unique_id, "g-1");
        assert_eq!(one.attachments[0].size_in_bytes, Some(321));
        assert_eq!(one.tags, vec!["x", "y"]);
        assert!(one.date_published.is_some());

        assert_eq!(feed.items[1].unique_id, "item-1");
    }

    #[test]
    fn test_single_item_object() {
        let json = r#"{"rss": {"channel": {"title": "T", "item": {"title": "Only", "guid": "abc"}}}}"#;
        let feed = parse_str(json).unwrap().unwrap();
        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].unique_id, "abc");
    }

    #[test]
    fn test_missing_channel() {
        assert!(matches!(
            parse_str(r#"{"rss": {"version": "2.0"}}"#),
            Err(FeedParseError::ChannelNotFound)
        ));
        assert!(matches!(
            parse_str(r#"{"rss": {"channel": []}}"#),
            Err(FeedParseError::ChannelNotFound)
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            parse_str(r#"{"rss": {"channel": "#),
            Err(FeedParseError::InvalidJson { format: FeedFormat::RssInJson, .. })
        ));
    }
}
