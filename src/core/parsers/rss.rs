// feedsniff - core/parsers/rss.rs
//
// Best-effort RSS 0.9x / 1.0 (RDF) / 2.0 extraction.
//
// Never fails. A document with no `<channel>` yields `None`; anything else
// yields a feed with whatever fields could be read. RSS 1.0 places `<item>`
// elements beside the channel rather than inside it, so items are collected
// from the whole document.

use crate::core::model::{
    FeedFormat, ParsedAttachment, ParsedAuthor, ParsedFeed, ParsedHub, ParsedItem, ParserData,
};
use crate::core::parsers::dates::parse_date;
use crate::core::parsers::markup::{
    before_first, child_text, elements, first_child_text, first_element, without_elements,
};

pub fn parse(data: &ParserData<'_>) -> Option<ParsedFeed> {
    let xml = String::from_utf8_lossy(data.data);
    let channel = first_element(&xml, "channel")?;

    // Channel-level fields come from the part of the channel before the
    // first item, minus nested blocks that reuse <title>/<link>.
    let head_raw = before_first(channel.inner, "item");
    let head = without_elements(head_raw, &["image", "textinput", "textInput"]);

    let mut feed = ParsedFeed {
        format: Some(FeedFormat::Rss),
        title: child_text(&head, "title"),
        home_page_url: child_text(&head, "link"),
        description: child_text(&head, "description"),
        language: first_child_text(&head, &["language", "dc:language"]),
        ..Default::default()
    };

    if let Some(image) = first_element(head_raw, "image") {
        feed.icon_url = child_text(image.inner, "url");
    }

    for link in elements(&head, "atom:link") {
        let Some(href) = link.attr("href") else {
            continue;
        };
        match link.attr("rel").as_deref() {
            Some("self") if feed.feed_url.is_none() => feed.feed_url = Some(href),
            Some("hub") => feed.hubs.push(ParsedHub {
                hub_type: "WebSub".to_string(),
                url: href,
            }),
            _ => {}
        }
    }
    if feed.feed_url.is_none() {
        feed.feed_url = data.url.map(str::to_string);
    }

    if let Some(name) = first_child_text(&head, &["managingEditor", "dc:creator"]) {
        feed.authors.push(ParsedAuthor {
            name: Some(name),
            ..Default::default()
        });
    }

    feed.items = elements(&xml, "item")
        .iter()
        .enumerate()
        .map(|(index, item)| parse_item(item.inner, index))
        .collect();

    tracing::trace!(
        title = feed.title.as_deref().unwrap_or(""),
        items = feed.items.len(),
        "RSS document extracted"
    );

    Some(feed)
}

fn parse_item(xml: &str, index: usize) -> ParsedItem {
    let title = child_text(xml, "title");
    let url = child_text(xml, "link");
    let date_published = first_child_text(xml, &["pubDate", "dc:date"])
        .as_deref()
        .and_then(parse_date);
    let date_modified = child_text(xml, "dcterms:modified")
        .as_deref()
        .and_then(parse_date);

    // Prefer the guid, then the link, then something stable-ish.
    let unique_id = child_text(xml, "guid")
        .or_else(|| url.clone())
        .or_else(|| {
            title.as_ref().map(|t| match date_published {
                Some(d) => format!("{t}|{}", d.to_rfc3339()),
                None => t.clone(),
            })
        })
        .unwrap_or_else(|| format!("item-{index}"));

    let authors = first_child_text(xml, &["author", "dc:creator"])
        .map(|raw| vec![author_from_rss(&raw)])
        .unwrap_or_default();

    let tags = elements(xml, "category")
        .iter()
        .filter_map(|c| c.text())
        .collect();

    let attachments = elements(xml, "enclosure")
        .iter()
        .filter_map(|enc| {
            Some(ParsedAttachment {
                url: enc.attr("url")?,
                mime_type: enc.attr("type"),
                size_in_bytes: enc.attr("length").and_then(|l| l.trim().parse().ok()),
                ..Default::default()
            })
        })
        .collect();

    let image_url = first_element(xml, "media:thumbnail")
        .and_then(|el| el.attr("url"))
        .or_else(|| {
            first_element(xml, "media:content")
                .filter(|el| el.attr("medium").as_deref() == Some("image"))
                .and_then(|el| el.attr("url"))
        });

    ParsedItem {
        unique_id,
        url,
        title,
        content_html: child_text(xml, "content:encoded"),
        summary: child_text(xml, "description"),
        image_url,
        date_published,
        date_modified,
        authors,
        tags,
        attachments,
        ..Default::default()
    }
}

/// RSS `<author>` is nominally "email (Name)"; dc:creator is just a name.
fn author_from_rss(raw: &str) -> ParsedAuthor {
    if let Some((email, rest)) = raw.split_once('(') {
        let name = rest.trim_end_matches(')').trim();
        let email = email.trim();
        if email.contains('@') && !name.is_empty() {
            return ParsedAuthor {
                name: Some(name.to_string()),
                email: Some(email.to_string()),
                ..Default::default()
            };
        }
    }
    if raw.contains('@') && !raw.contains(' ') {
        return ParsedAuthor {
            email: Some(raw.to_string()),
            ..Default::default()
        };
    }
    ParsedAuthor {
        name: Some(raw.to_string()),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS2: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom" xmlns:content="http://purl.org/rss/1.0/modules/content/">
<channel>
  <title>Example &amp; Friends</title>
  <link>https://example.org/</link>
  <description>An example feed</description>
  <language>en-us</language>
  <atom:link href="https://example.org/feed.xml" rel="self" type="application/rss+xml"/>
  <atom:link href="https://hub.example.org/" rel="hub"/>
  <image><url>https://example.org/icon.png</url><title>Ignored</title><link>https://ignored.example/</link></image>
  <item>
    <title>First post</title>
    <link>https://example.org/1</link>
    <guid isPermaLink="false">tag:example.org,2024:1</guid>
    <pubDate>Mon, 15 Jan 2024 14:30:22 GMT</pubDate>
    <author>jane@example.org (Jane Doe)</author>
    <category>rust</category><category>feeds</category>
    <description>Short</description>
    <content:encoded><![CDATA[<p>Long</p>]]></content:encoded>
    <enclosure url="https://example.org/ep1.mp3" length="1024" type="audio/mpeg"/>
  </item>
  <item>
    <title>Second post</title>
    <link>https://example.org/2</link>
  </item>
</channel>
</rss>"#;

    #[test]
    fn test_rss2_channel_fields() {
        let feed = parse(&ParserData::from_bytes(RSS2.as_bytes())).unwrap();
        assert_eq!(feed.format, Some(FeedFormat::Rss));
        assert_eq!(feed.title.as_deref(), Some("Example & Friends"));
        assert_eq!(feed.home_page_url.as_deref(), Some("https://example.org/"));
        assert_eq!(feed.description.as_deref(), Some("An example feed"));
        assert_eq!(feed.language.as_deref(), Some("en-us"));
        assert_eq!(feed.icon_url.as_deref(), Some("https://example.org/icon.png"));
        assert_eq!(feed.feed_url.as_deref(), Some("https://example.org/feed.xml"));
        assert_eq!(feed.hubs.len(), 1);
        assert_eq!(feed.hubs[0].url, "https://hub.example.org/");
    }

    #[test]
    fn test_rss2_items() {
        let feed = parse(&ParserData::from_bytes(RSS2.as_bytes())).unwrap();
        assert_eq!(feed.items.len(), 2);

        let first = &feed.items[0];
        assert_eq!(first.unique_id, "tag:example.org,2024:1");
        assert_eq!(first.content_html.as_deref(), Some("<p>Long</p>"));
        assert_eq!(first.summary.as_deref(), Some("Short"));
        assert_eq!(first.tags, vec!["rust", "feeds"]);
        assert_eq!(first.authors[0].name.as_deref(), Some("Jane Doe"));
        assert_eq!(first.authors[0].email.as_deref(), Some("jane@example.org"));
        assert_eq!(first.attachments[0].size_in_bytes, Some(1024));
        assert!(first.date_published.is_some());

        assert_eq!(feed.items[1].unique_id, "https://example.org/2", "link fallback");
    }

    #[test]
    fn test_rss1_items_outside_channel() {
        let rdf = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns="http://purl.org/rss/1.0/" xmlns:dc="http://purl.org/dc/elements/1.1/">
<channel rdf:about="https://example.org/"><title>RDF feed</title><link>https://example.org/</link></channel>
<item rdf:about="https://example.org/a"><title>A</title><link>https://example.org/a</link><dc:date>2024-01-15T14:30:22Z</dc:date><dc:creator>Sam</dc:creator></item>
</rdf:RDF>"#;
        let feed = parse(&ParserData::new(Some("https://example.org/index.rdf"), rdf.as_bytes()))
            .unwrap();
        assert_eq!(feed.title.as_deref(), Some("RDF feed"));
        assert_eq!(feed.feed_url.as_deref(), Some("https://example.org/index.rdf"));
        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].authors[0].name.as_deref(), Some("Sam"));
        assert!(feed.items[0].date_published.is_some());
    }

    #[test]
    fn test_no_channel_is_none() {
        assert!(parse(&ParserData::from_bytes(b"<rss version=\"2.0\"></rss>")).is_none());
    }

    #[test]
    fn test_truncated_document_still_extracts() {
        let cut = &RSS2[..RSS2.find("<category>").unwrap()];
        let feed = parse(&ParserData::from_bytes(cut.as_bytes())).unwrap();
        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].title.as_deref(), Some("First post"));
    }

    #[test]
    fn test_untitled_item_gets_index_id() {
        let xml = "<rss><channel><title>T</title><item><description>x</description></item></channel></rss>";
        let feed = parse(&ParserData::from_bytes(xml.as_bytes())).unwrap();
        assert_eq!(feed.items[0].unique_id, "item-0");
    }
}
