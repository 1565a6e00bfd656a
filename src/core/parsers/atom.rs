// feedsniff - core/parsers/atom.rs
//
// Best-effort Atom 1.0 (and 0.3) extraction. Never fails; a document
// without a `<feed>` element yields `None`.
//
// Element names are matched with and without the conventional `atom:`
// prefix, since some publishers bind the Atom namespace to a prefix.

use crate::core::model::{
    FeedFormat, ParsedAttachment, ParsedAuthor, ParsedFeed, ParsedHub, ParsedItem, ParserData,
};
use crate::core::parsers::dates::parse_date;
use crate::core::parsers::markup::{self, before_first, elements, first_element, Element};

pub fn parse(data: &ParserData<'_>) -> Option<ParsedFeed> {
    let xml = String::from_utf8_lossy(data.data);
    let (feed_el, prefix) = match first_element(&xml, "feed") {
        Some(el) => (el, ""),
        None => (first_element(&xml, "atom:feed")?, "atom:"),
    };
    let names = Names { prefix };

    let head = before_first(feed_el.inner, &names.of("entry"));

    let mut feed = ParsedFeed {
        format: Some(FeedFormat::Atom),
        title: names.text(head, "title"),
        description: names.text(head, "subtitle").or_else(|| names.text(head, "tagline")),
        favicon_url: names.text(head, "icon"),
        icon_url: names.text(head, "logo"),
        language: markup::attr(feed_el.attrs, "xml:lang"),
        ..Default::default()
    };

    for link in names.elements(head, "link") {
        let Some(href) = link.attr("href") else {
            continue;
        };
        match link.attr("rel").as_deref().unwrap_or("alternate") {
            "alternate" if feed.home_page_url.is_none() => feed.home_page_url = Some(href),
            "self" if feed.feed_url.is_none() => feed.feed_url = Some(href),
            "hub" => feed.hubs.push(ParsedHub {
                hub_type: "WebSub".to_string(),
                url: href,
            }),
            _ => {}
        }
    }
    if feed.feed_url.is_none() {
        feed.feed_url = data.url.map(str::to_string);
    }

    feed.authors = names.authors(head);

    feed.items = names
        .elements(feed_el.inner, "entry")
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_entry(&names, entry.inner, index))
        .collect();

    tracing::trace!(
        title = feed.title.as_deref().unwrap_or(""),
        entries = feed.items.len(),
        "Atom document extracted"
    );

    Some(feed)
}

fn parse_entry(names: &Names, xml: &str, index: usize) -> ParsedItem {
    let mut item = ParsedItem {
        title: names.text(xml, "title"),
        summary: names.text(xml, "summary"),
        date_published: names
            .text(xml, "published")
            .or_else(|| names.text(xml, "issued"))
            .as_deref()
            .and_then(parse_date),
        date_modified: names
            .text(xml, "updated")
            .or_else(|| names.text(xml, "modified"))
            .as_deref()
            .and_then(parse_date),
        authors: names.authors(xml),
        ..Default::default()
    };

    for link in names.elements(xml, "link") {
        let Some(href) = link.attr("href") else {
            continue;
        };
        match link.attr("rel").as_deref().unwrap_or("alternate") {
            "alternate" if item.url.is_none() => item.url = Some(href),
            "related" if item.external_url.is_none() => item.external_url = Some(href),
            "enclosure" => item.attachments.push(ParsedAttachment {
                url: href,
                mime_type: link.attr("type"),
                title: link.attr("title"),
                size_in_bytes: link.attr("length").and_then(|l| l.trim().parse().ok()),
                ..Default::default()
            }),
            _ => {}
        }
    }

    if let Some(content) = names.first(xml, "content") {
        let body = content.text();
        match content.attr("type").as_deref() {
            Some("html") | Some("xhtml") | Some("text/html") => item.content_html = body,
            _ => item.content_text = body,
        }
    }

    item.tags = names
        .elements(xml, "category")
        .iter()
        .filter_map(|c| c.attr("term").or_else(|| c.attr("label")))
        .collect();

    item.unique_id = names
        .text(xml, "id")
        .or_else(|| item.url.clone())
        .unwrap_or_else(|| format!("entry-{index}"));

    item
}

/// Element lookup that honours the document's Atom prefix.
struct Names {
    prefix: &'static str,
}

impl Names {
    fn of(&self, local: &str) -> String {
        format!("{}{local}", self.prefix)
    }

    fn first<'a>(&self, xml: &'a str, local: &str) -> Option<Element<'a>> {
        first_element(xml, &self.of(local))
    }

    fn elements<'a>(&self, xml: &'a str, local: &str) -> Vec<Element<'a>> {
        elements(xml, &self.of(local))
    }

    fn text(&self, xml: &str, local: &str) -> Option<String> {
        self.first(xml, local).and_then(|el| el.text())
    }

    fn authors(&self, xml: &str) -> Vec<ParsedAuthor> {
        self.elements(xml, "author")
            .iter()
            .map(|a| ParsedAuthor {
                name: self.text(a.inner, "name"),
                url: self.text(a.inner, "uri"),
                email: self.text(a.inner, "email"),
                ..Default::default()
            })
            .filter(|a| !a.is_empty())
            .collect()
    }
}
