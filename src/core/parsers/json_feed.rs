// feedsniff - core/parsers/json_feed.rs
//
// JSON Feed 1.0 / 1.1 (https://jsonfeed.org/version/1.1).
//
// The document must decode as JSON and carry a `version` string, a `title`
// string and an `items` array; anything else is a `FeedParseError`. Inside
// that envelope the parser is lenient: a field of the wrong type is
// treated as absent, and items without an `id` are skipped.

use crate::core::model::{
    FeedFormat, ParsedAttachment, ParsedAuthor, ParsedFeed, ParsedHub, ParsedItem, ParserData,
};
use crate::core::parsers::dates::parse_date;
use crate::util::error::FeedParseError;
use serde::Deserialize;
use serde_json::{Map, Value};

pub fn parse(data: &ParserData<'_>) -> Result<Option<ParsedFeed>, FeedParseError> {
    let root: Value =
        serde_json::from_slice(data.data).map_err(|source| FeedParseError::InvalidJson {
            format: FeedFormat::JsonFeed,
            source,
        })?;
    let Some(obj) = root.as_object() else {
        return Err(FeedParseError::VersionNotFound);
    };

    let version = string(obj, "version").ok_or(FeedParseError::VersionNotFound)?;
    let title = string(obj, "title").ok_or(FeedParseError::TitleNotFound)?;
    let items = obj
        .get("items")
        .and_then(Value::as_array)
        .ok_or(FeedParseError::ItemsMissing)?;

    let mut feed = ParsedFeed {
        format: Some(FeedFormat::JsonFeed),
        title: Some(title),
        home_page_url: string(obj, "home_page_url"),
        feed_url: string(obj, "feed_url").or_else(|| data.url.map(str::to_string)),
        description: string(obj, "description"),
        language: string(obj, "language"),
        icon_url: string(obj, "icon"),
        favicon_url: string(obj, "favicon"),
        authors: authors(obj),
        ..Default::default()
    };

    if let Some(hubs) = obj.get("hubs").and_then(Value::as_array) {
        feed.hubs = hubs
            .iter()
            .filter_map(|h| serde_json::from_value::<RawHub>(h.clone()).ok())
            .map(|h| ParsedHub {
                hub_type: h.hub_type,
                url: h.url,
            })
            .collect();
    }

    let total = items.len();
    feed.items = items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(parse_item)
        .collect();

    if feed.items.len() < total {
        tracing::debug!(
            version = %version,
            skipped = total - feed.items.len(),
            "JSON Feed items without an id skipped"
        );
    }

    Ok(Some(feed))
}

fn parse_item(obj: &Map<String, Value>) -> Option<ParsedItem> {
    // `id` is required; some publishers emit it as a number.
    let unique_id = match obj.get("id")? {
        Value::String(s) if !s.trim().is_empty() => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    let tags = obj
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let attachments = obj
        .get("attachments")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|a| serde_json::from_value::<RawAttachment>(a.clone()).ok())
                .map(ParsedAttachment::from)
                .collect()
        })
        .unwrap_or_default();

    Some(ParsedItem {
        unique_id,
        url: string(obj, "url"),
        external_url: string(obj, "external_url"),
        title: string(obj, "title"),
        content_html: string(obj, "content_html"),
        content_text: string(obj, "content_text"),
        summary: string(obj, "summary"),
        image_url: string(obj, "image").or_else(|| string(obj, "banner_image")),
        date_published: string(obj, "date_published")
            .as_deref()
            .and_then(parse_date),
        date_modified: string(obj, "date_modified").as_deref().and_then(parse_date),
        authors: authors(obj),
        tags,
        attachments,
    })
}

/// `authors` (1.1) wins over the singular `author` (1.0).
fn authors(obj: &Map<String, Value>) -> Vec<ParsedAuthor> {
    let raw: Vec<&Value> = match obj.get("authors").and_then(Value::as_array) {
        Some(list) => list.iter().collect(),
        None => obj.get("author").into_iter().collect(),
    };
    raw.into_iter()
        .filter_map(|a| serde_json::from_value::<RawAuthor>(a.clone()).ok())
        .map(|a| ParsedAuthor {
            name: a.name,
            url: a.url,
            avatar_url: a.avatar,
            email: None,
        })
        .filter(|a| !a.is_empty())
        .collect()
}

fn string(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Raw serde shapes for nested objects
// =============================================================================

#[derive(Deserialize)]
struct RawAuthor {
    name: Option<String>,
    url: Option<String>,
    avatar: Option<String>,
}

#[derive(Deserialize)]
struct RawAttachment {
    url: String,
    mime_type: Option<String>,
    title: Option<String>,
    size_in_bytes: Option<u64>,
    duration_in_seconds: Option<f64>,
}

impl From<RawAttachment> for ParsedAttachment {
    fn from(raw: RawAttachment) -> Self {
        Self {
            url: raw.url,
            mime_type: raw.mime_type,
            title: raw.title,
            size_in_bytes: raw.size_in_bytes,
            duration_in_seconds: raw.duration_in_seconds,
        }
    }
}

#[derive(Deserialize)]
struct RawHub {
    #[serde(rename = "type")]
    hub_type: String,
    url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(s: &str) -> Result<Option<ParsedFeed>, FeedParseError> {
        parse(&ParserData::from_bytes(s.as_bytes()))
    }

    #[test]
    fn test_version_1_1_feed() {
        let json = r#"{
            "version": "https://jsonfeed.org/version/1.1",
            "title": "My Example Feed",
            "home_page_url": "https://example.org/",
            "feed_url": "https://example.org/feed.json",
            "authors": [{"name": "Jane", "avatar": "https://example.org/jane.png"}],
            "hubs": [{"type": "WebSub", "url": "https://hub.example.org/"}],
            "items": [
                {"id": "2", "content_text": "This is a second item.", "url": "https://example.org/second-item",
                 "tags": ["a", "b"], "date_published": "2024-01-15T14:30:22Z",
                 "attachments": [{"url": "https://example.org/ep.mp3", "mime_type": "audio/mpeg", "size_in_bytes": 99}]},
                {"id": 1, "content_html": "<p>Hello, world!</p>", "url": "https://example.org/initial-post"}
            ]
        }"#;
        let feed = parse_str(json).unwrap().unwrap();
        assert_eq!(feed.format, Some(FeedFormat::JsonFeed));
        assert_eq!(feed.title.as_deref(), Some("My Example Feed"));
        assert_eq!(feed.authors[0].avatar_url.as_deref(), Some("https://example.org/jane.png"));
        assert_eq!(feed.hubs[0].hub_type, "WebSub");
        assert_eq!(feed.items.len(), 2);
        assert_eq!(feed.items[0].tags, vec!["a", "b"]);
        assert_eq!(feed.items[0].attachments[0].size_in_bytes, Some(99));
        assert!(feed.items[0].date_published.is_some());
        assert_eq!(feed.items[1].unique_id, "1", "numeric id accepted");
    }

    #[test]
    fn test_version_1_singular_author() {
        let json = r#"{"version": "https://jsonfeed.org/version/1", "title": "Old",
            "author": {"name": "Solo"}, "items": []}"#;
        let feed = parse_str(json).unwrap().unwrap();
        assert_eq!(feed.authors.len(), 1);
        assert_eq!(feed.authors[0].name.as_deref(), Some("Solo"));
        assert!(feed.items.is_empty());
    }

    #[test]
    fn test_items_without_id_skipped() {
        let json = r#"{"version": "https://jsonfeed.org/version/1", "title": "T",
            "items": [{"title": "no id"}, {"id": "", "title": "blank"}, {"id": "ok"}]}"#;
        let feed = parse_str(json).unwrap().unwrap();
        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].unique_id, "ok");
    }

    #[test]
    fn test_feed_url_falls_back_to_source_url() {
        let json = br#"{"version": "https://jsonfeed.org/version/1", "title": "T", "items": []}"#;
        let feed = parse(&ParserData::new(Some("https://example.org/f.json"), json))
            .unwrap()
            .unwrap();
        assert_eq!(feed.feed_url.as_deref(), Some("https://example.org/f.json"));
    }

    #[test]
    fn test_error_order() {
        assert!(matches!(
            parse_str("{\"version\": "),
            Err(FeedParseError::InvalidJson { format: FeedFormat::JsonFeed, .. })
        ));
        assert!(matches!(parse_str("[]"), Err(FeedParseError::VersionNotFound)));
        assert!(matches!(
            parse_str(r#"{"title": "T", "items": []}"#),
            Err(FeedParseError::VersionNotFound)
        ));
        assert!(matches!(
            parse_str(r#"{"version": "1", "items": []}"#),
            Err(FeedParseError::TitleNotFound)
        ));
        assert!(matches!(
            parse_str(r#"{"version": "1", "title": "T", "items": {}}"#),
            Err(FeedParseError::ItemsMissing)
        ));
    }
}
