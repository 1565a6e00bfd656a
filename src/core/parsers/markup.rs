// feedsniff - core/parsers/markup.rs
//
// Lightweight, forgiving element extraction for the RSS and Atom parsers.
//
// This is not an XML parser. It locates `<name ...>...</name>` spans by
// literal tag name, reads attributes with a regex, and decodes CDATA and
// character references. That is enough for best-effort feed extraction and
// it never fails: truncated or malformed markup yields fewer fields, not an
// error. Tag names are matched case-sensitively, as XML requires.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// One located element.
#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    /// Raw attribute text between the tag name and `>`.
    pub attrs: &'a str,
    /// Raw content between the start and end tags (empty when self-closing).
    pub inner: &'a str,
    /// Byte offset just past the element in the searched text.
    end: usize,
}

impl<'a> Element<'a> {
    /// Value of attribute `name`, entity-decoded.
    pub fn attr(&self, name: &str) -> Option<String> {
        attr(self.attrs, name)
    }

    /// Decoded, trimmed text content; `None` when empty.
    pub fn text(&self) -> Option<String> {
        non_empty(text(self.inner))
    }
}

/// First `<tag>` element in `xml`.
pub fn first_element<'a>(xml: &'a str, tag: &str) -> Option<Element<'a>> {
    next_element(xml, tag, 0)
}

/// All non-overlapping `<tag>` elements in `xml`, in document order.
pub fn elements<'a>(xml: &'a str, tag: &str) -> Vec<Element<'a>> {
    let mut found = Vec::new();
    let mut from = 0;
    while let Some(el) = next_element(xml, tag, from) {
        from = el.end;
        found.push(el);
    }
    found
}

/// Decoded text of the first `<tag>` child, if non-empty.
pub fn child_text(xml: &str, tag: &str) -> Option<String> {
    first_element(xml, tag).and_then(|el| el.text())
}

/// Decoded text of the first of `tags` that yields something.
pub fn first_child_text(xml: &str, tags: &[&str]) -> Option<String> {
    tags.iter().find_map(|tag| child_text(xml, tag))
}

/// `xml` up to (not including) the first `<tag` start tag. Used to read
/// feed-level fields without picking up values from items/entries.
pub fn before_first<'a>(xml: &'a str, tag: &str) -> &'a str {
    let open = format!("<{tag}");
    let mut search = 0;
    while let Some(rel) = xml[search..].find(&open) {
        let start = search + rel;
        let after = start + open.len();
        if is_tag_delimiter(xml[after..].chars().next()) {
            return &xml[..start];
        }
        search = after;
    }
    xml
}

/// `xml` with every `<tag>...</tag>` element removed.
pub fn without_elements<'a>(xml: &'a str, tags: &[&str]) -> Cow<'a, str> {
    let mut out: Cow<'a, str> = Cow::Borrowed(xml);
    for tag in tags {
        if first_element(&out, tag).is_none() {
            continue;
        }
        let mut kept = String::with_capacity(out.len());
        let mut from = 0;
        while let Some((start, el)) = locate(&out, tag, from) {
            kept.push_str(&out[from..start]);
            from = el.end;
        }
        kept.push_str(&out[from..]);
        out = Cow::Owned(kept);
    }
    out
}

fn next_element<'a>(xml: &'a str, tag: &str, from: usize) -> Option<Element<'a>> {
    locate(xml, tag, from).map(|(_, el)| el)
}

/// Find the next `<tag` start tag at or after `from`; returns its offset
/// and the element. An unterminated element runs to the end of `xml`.
fn locate<'a>(xml: &'a str, tag: &str, from: usize) -> Option<(usize, Element<'a>)> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut search = from;

    loop {
        let start = search + xml.get(search..)?.find(&open)?;
        let after_name = start + open.len();
        if !is_tag_delimiter(xml[after_name..].chars().next()) {
            search = after_name;
            continue;
        }

        let tag_end = after_name + xml[after_name..].find('>')?;
        let attrs = &xml[after_name..tag_end];
        if let Some(attrs) = attrs.strip_suffix('/') {
            return Some((
                start,
                Element {
                    attrs,
                    inner: "",
                    end: tag_end + 1,
                },
            ));
        }

        let inner_start = tag_end + 1;
        let (inner, end) = match xml[inner_start..].find(&close) {
            Some(rel) => (
                &xml[inner_start..inner_start + rel],
                inner_start + rel + close.len(),
            ),
            None => (&xml[inner_start..], xml.len()),
        };
        return Some((start, Element { attrs, inner, end }));
    }
}

fn is_tag_delimiter(c: Option<char>) -> bool {
    matches!(c, Some(c) if c.is_ascii_whitespace() || c == '>' || c == '/')
}

// =============================================================================
// Attributes and text
// =============================================================================

/// Value of attribute `name` in raw attribute text, entity-decoded.
pub fn attr(attrs: &str, name: &str) -> Option<String> {
    static ATTR_RE: OnceLock<Regex> = OnceLock::new();
    let re = ATTR_RE.get_or_init(|| {
        Regex::new(r#"([A-Za-z_][\w:.-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
            .expect("markup: invalid attribute regex")
    });

    re.captures_iter(attrs)
        .find(|caps| &caps[1] == name)
        .and_then(|caps| caps.get(2).or_else(|| caps.get(3)))
        .map(|m| decode_entities(m.as_str()).into_owned())
}

/// Text content of an element: CDATA sections are kept verbatim, the rest
/// has character references decoded. Leading/trailing whitespace trimmed.
pub fn text(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut rest = inner;

    while let Some(start) = rest.find("<![CDATA[") {
        out.push_str(&decode_entities(&rest[..start]));
        let body = &rest[start + "<![CDATA[".len()..];
        match body.find("]]>") {
            Some(end) => {
                out.push_str(&body[..end]);
                rest = &body[end + 3..];
            }
            None => {
                out.push_str(body);
                rest = "";
            }
        }
    }
    out.push_str(&decode_entities(rest));

    out.trim().to_string()
}

/// Decode the five predefined XML entities and numeric character references.
/// Unknown entities are left as-is.
pub fn decode_entities(s: &str) -> Cow<'_, str> {
    static ENTITY_RE: OnceLock<Regex> = OnceLock::new();
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }
    let re = ENTITY_RE.get_or_init(|| {
        Regex::new(r"&(?:#[xX]([0-9a-fA-F]{1,6})|#([0-9]{1,7})|(amp|lt|gt|quot|apos));")
            .expect("markup: invalid entity regex")
    });

    re.replace_all(s, |caps: &regex::Captures<'_>| {
        let code = if let Some(hex) = caps.get(1) {
            u32::from_str_radix(hex.as_str(), 16).ok()
        } else if let Some(dec) = caps.get(2) {
            dec.as_str().parse::<u32>().ok()
        } else {
            None
        };
        if let Some(code) = code {
            return char::from_u32(code)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string());
        }
        match caps.get(3).map(|m| m.as_str()) {
            Some("amp") => "&",
            Some("lt") => "<",
            Some("gt") => ">",
            Some("quot") => "\"",
            Some("apos") => "'",
            _ => &caps[0],
        }
        .to_string()
    })
}

pub fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
