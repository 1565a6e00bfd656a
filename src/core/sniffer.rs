// feedsniff - core/sniffer.rs
//
// Feed format sniffing: maps a raw, possibly truncated byte buffer to a
// `FeedFormat` without parsing it.
//
// Core layer: pure functions over a borrowed slice. No I/O, no logging,
// no state between calls. Only the first
// `SNIFF_WINDOW_BYTES` bytes are ever examined, so the cost is bounded no
// matter how large the buffer is and it is safe to call on a UI thread.
//
// Can be called with partial data (while still downloading, for instance).
// Below `MIN_BYTES_REQUIRED` the answer is always `Unknown`: ask again when
// there is more data. `NotAFeed` is definitive.

use crate::core::model::{FeedFormat, ParserData};
use crate::util::constants;

/// Classify the bytes held by `parser_data`. The origin URL is ignored.
pub fn feed_type(parser_data: &ParserData<'_>) -> FeedFormat {
    classify(parser_data.data)
}

/// Classify a byte buffer.
///
/// The checks run in a fixed order and the first match wins:
///
/// 1. fewer than `MIN_BYTES_REQUIRED` bytes: `Unknown`
/// 2. JSON Feed
/// 3. RSS-in-JSON
/// 4. HTML: `NotAFeed`
/// 5. RSS
/// 6. Atom
/// 7. anything else: `NotAFeed`
///
/// The HTML check must precede the RSS and Atom checks: feed auto-discovery
/// pages reference their feeds by URL and MIME type, and may quote feed
/// markup, which the looser RSS/Atom marker scans would otherwise accept.
pub fn classify(data: &[u8]) -> FeedFormat {
    if data.len() < constants::MIN_BYTES_REQUIRED {
        return FeedFormat::Unknown;
    }

    let prefix = Prefix::new(data);

    if prefix.is_probably_json_feed() {
        return FeedFormat::JsonFeed;
    }
    if prefix.is_probably_rss_in_json() {
        return FeedFormat::RssInJson;
    }

    if prefix.is_probably_html() {
        return FeedFormat::NotAFeed;
    }

    if prefix.is_probably_rss() {
        return FeedFormat::Rss;
    }
    if prefix.is_probably_atom() {
        return FeedFormat::Atom;
    }

    FeedFormat::NotAFeed
}

// =============================================================================
// Prefix analysis
// =============================================================================

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Everything the individual checks need, computed once per call from the
/// sniff window.
struct Prefix<'a> {
    /// The window with any BOM and leading whitespace removed.
    body: &'a [u8],

    /// True when the first significant byte opens a JSON object or array.
    /// JSON-shaped buffers never take the markup substring fallbacks.
    json_shaped: bool,

    /// Top-level object members seen inside the window (JSON-shaped only).
    json: JsonObject<'a>,

    /// Root element and doctype (markup-shaped only).
    markup: Markup<'a>,
}

impl<'a> Prefix<'a> {
    fn new(data: &'a [u8]) -> Self {
        let window = &data[..data.len().min(constants::SNIFF_WINDOW_BYTES)];
        let window = window.strip_prefix(UTF8_BOM).unwrap_or(window);
        let body = &window[skip_ws(window, 0)..];

        let json_shaped = matches!(body.first(), Some(b'{') | Some(b'['));
        let json = if body.first() == Some(&b'{') {
            scan_object(body)
        } else {
            JsonObject::default()
        };
        let markup = if json_shaped {
            Markup::default()
        } else {
            scan_markup(body)
        };

        Self {
            body,
            json_shaped,
            json,
            markup,
        }
    }

    fn has_key(&self, name: &[u8]) -> bool {
        self.json.keys.iter().any(|k| k.name == name)
    }

    /// A JSON object is taken for a JSON Feed when any of these hold:
    ///
    /// - a top-level `version` naming `jsonfeed.org/version`
    /// - both of the mandatory `title` and `items` members
    /// - a member only JSON Feed defines (`home_page_url`, `hubs`, ...)
    /// - the object is still open at the end of the window
    ///
    /// Member order is free, so the identifying members of a valid feed
    /// may sit past the window or past the bytes received so far. An object
    /// that is still open is presumed to be a feed and left for the parser
    /// to reject. Only a top-level `rss` member rules JSON Feed out.
    fn is_probably_json_feed(&self) -> bool {
        let versioned = self.json.keys.iter().any(|k| {
            k.name == b"version"
                && k.value
                    .is_some_and(|v| contains_unescaped(v, constants::JSON_FEED_VERSION_MARKER))
        });
        if versioned {
            return true;
        }
        if self.has_key(b"rss") {
            return false;
        }
        (self.has_key(b"items") && self.has_key(b"title"))
            || JSON_FEED_ONLY_KEYS.iter().any(|k| self.has_key(k.as_bytes()))
            || self.json.truncated
    }

    /// `{"rss": {"channel": {...}}}`
    fn is_probably_rss_in_json(&self) -> bool {
        self.has_key(b"rss")
    }

    fn is_probably_html(&self) -> bool {
        if self.json_shaped {
            return false;
        }
        if self.markup.doctype_html {
            return true;
        }
        match self.markup.root_local_name() {
            Some(name) if name.eq_ignore_ascii_case(b"html") => true,
            Some(name) if is_feed_root(name) => false,
            _ => contains_tag(self.body, b"<html"),
        }
    }

    fn is_probably_rss(&self) -> bool {
        if self.json_shaped {
            return false;
        }
        if let Some(name) = self.markup.root_local_name() {
            if is_feed_root(name) {
                return is_rss_root(name);
            }
        }
        contains_tag(self.body, b"<rss") || contains_tag(self.body, b"<rdf:rdf")
    }

    fn is_probably_atom(&self) -> bool {
        if self.json_shaped {
            return false;
        }
        if let Some(name) = self.markup.root_local_name() {
            if is_feed_root(name) {
                return name.eq_ignore_ascii_case(b"feed");
            }
        }
        contains_tag(self.body, b"<feed")
            || find(self.body, constants::ATOM_NAMESPACE.as_bytes()).is_some()
    }
}

fn is_feed_root(local_name: &[u8]) -> bool {
    is_rss_root(local_name) || local_name.eq_ignore_ascii_case(b"feed")
}

/// RSS 0.9x/2.0 (`<rss>`) and RSS 1.0 (`<rdf:RDF>`).
fn is_rss_root(local_name: &[u8]) -> bool {
    local_name.eq_ignore_ascii_case(b"rss") || local_name.eq_ignore_ascii_case(b"rdf")
}

// =============================================================================
// JSON top-level key scan
// =============================================================================

/// Top-level members that no other JSON document shape is expected to use.
const JSON_FEED_ONLY_KEYS: &[&str] = &[
    "home_page_url",
    "feed_url",
    "favicon",
    "user_comment",
    "next_url",
    "hubs",
];

/// A top-level member of a JSON object. Slices are raw (escapes intact).
#[derive(Debug)]
struct JsonKey<'a> {
    name: &'a [u8],
    /// Contents of the value when it is a complete string.
    value: Option<&'a [u8]>,
}

/// The top-level members of a JSON object, as far as the window shows them.
#[derive(Debug, Default)]
struct JsonObject<'a> {
    keys: Vec<JsonKey<'a>>,
    /// The walk ran out of bytes before the closing brace.
    truncated: bool,
}

/// Walk the members of the object starting at `body[0] == b'{'`.
///
/// Tolerates truncation: a member whose value runs past the end of the
/// window is still recorded (without a value), the walk stops there and
/// `truncated` is set. Malformed input ends the walk early without it.
fn scan_object(body: &[u8]) -> JsonObject<'_> {
    let mut object = JsonObject::default();
    let mut pos = 1;

    loop {
        pos = skip_ws(body, pos);
        match body.get(pos) {
            Some(b'"') => {}
            Some(_) => break,
            None => {
                object.truncated = true;
                break;
            }
        }
        let Some((name, after_name)) = scan_string(body, pos) else {
            object.truncated = true;
            break;
        };
        pos = skip_ws(body, after_name);
        match body.get(pos) {
            Some(b':') => {}
            Some(_) => break,
            None => {
                object.truncated = true;
                break;
            }
        }
        pos = skip_ws(body, pos + 1);

        if body.get(pos) == Some(&b'"') {
            match scan_string(body, pos) {
                Some((value, after)) => {
                    object.keys.push(JsonKey {
                        name,
                        value: Some(value),
                    });
                    pos = after;
                }
                None => {
                    object.keys.push(JsonKey { name, value: None });
                    object.truncated = true;
                    break;
                }
            }
        } else {
            object.keys.push(JsonKey { name, value: None });
            match skip_value(body, pos) {
                Some(after) => pos = after,
                None => {
                    object.truncated = true;
                    break;
                }
            }
        }

        pos = skip_ws(body, pos);
        match body.get(pos) {
            Some(b',') => pos += 1,
            Some(_) => break,
            None => {
                object.truncated = true;
                break;
            }
        }
    }

    object
}

/// `body[start]` is an opening quote. Returns the raw contents and the
/// position just past the closing quote, or `None` if the string is cut off.
fn scan_string(body: &[u8], start: usize) -> Option<(&[u8], usize)> {
    let mut i = start + 1;
    while i < body.len() {
        match body[i] {
            b'\\' => i += 2,
            b'"' => return Some((&body[start + 1..i], i + 1)),
            _ => i += 1,
        }
    }
    None
}

/// Skip a non-string JSON value (object, array, number, literal).
/// Returns the position of the byte after it, or `None` if cut off.
fn skip_value(body: &[u8], mut pos: usize) -> Option<usize> {
    let mut depth = 0usize;
    while let Some(&b) = body.get(pos) {
        match b {
            b'"' => {
                pos = scan_string(body, pos)?.1;
                continue;
            }
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                if depth == 0 {
                    // End of the enclosing object: a scalar just finished.
                    return Some(pos);
                }
                depth -= 1;
                if depth == 0 {
                    return Some(pos + 1);
                }
            }
            b',' if depth == 0 => return Some(pos),
            _ => {}
        }
        pos += 1;
    }
    None
}

/// Substring test that ignores JSON backslash escapes (`https:\/\/...`).
fn contains_unescaped(raw: &[u8], needle: &str) -> bool {
    let unescaped: Vec<u8> = raw.iter().copied().filter(|&b| b != b'\\').collect();
    find(&unescaped, needle.as_bytes()).is_some()
}

// =============================================================================
// Markup prolog scan
// =============================================================================

#[derive(Debug, Default)]
struct Markup<'a> {
    /// `<!DOCTYPE html ...>` was seen before the root element.
    doctype_html: bool,
    /// Qualified name of the first element, if one starts inside the window.
    root: Option<&'a [u8]>,
}

impl<'a> Markup<'a> {
    /// Root name without its namespace prefix (`rdf:RDF` -> `RDF`).
    fn root_local_name(&self) -> Option<&'a [u8]> {
        self.root.map(|name| match name.iter().rposition(|&b| b == b':') {
            Some(colon) => &name[colon + 1..],
            None => name,
        })
    }
}

/// Skip the XML prolog (declaration, processing instructions, comments,
/// doctype) and report the first element name.
fn scan_markup(body: &[u8]) -> Markup<'_> {
    let mut markup = Markup::default();
    let mut pos = 0;

    loop {
        pos = skip_ws(body, pos);
        let rest = &body[pos..];

        if rest.starts_with(b"<?") {
            match find(rest, b"?>") {
                Some(end) => pos += end + 2,
                None => break,
            }
        } else if rest.starts_with(b"<!--") {
            match find(&rest[4..], b"-->") {
                Some(end) => pos += 4 + end + 3,
                None => break,
            }
        } else if starts_with_ignore_case(rest, b"<!doctype") {
            let name_start = skip_ws(rest, 9);
            if starts_with_name(&rest[name_start..], b"html") {
                markup.doctype_html = true;
                break;
            }
            match doctype_end(rest) {
                Some(end) => pos += end,
                None => break,
            }
        } else if rest.first() == Some(&b'<') {
            let len = rest[1..].iter().take_while(|&&b| is_name_byte(b)).count();
            if len > 0 {
                markup.root = Some(&rest[1..1 + len]);
            }
            break;
        } else {
            break;
        }
    }

    markup
}

/// Length of a `<!DOCTYPE ...>` declaration including any internal subset.
fn doctype_end(rest: &[u8]) -> Option<usize> {
    let mut in_subset = false;
    for (i, &b) in rest.iter().enumerate() {
        match b {
            b'[' => in_subset = true,
            b']' => in_subset = false,
            b'>' if !in_subset => return Some(i + 1),
            _ => {}
        }
    }
    None
}

// =============================================================================
// Byte helpers
// =============================================================================

fn skip_ws(bytes: &[u8], mut pos: usize) -> usize {
    while bytes.get(pos).is_some_and(|b| b.is_ascii_whitespace()) {
        pos += 1;
    }
    pos
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b':' | b'-' | b'_' | b'.')
}

fn starts_with_ignore_case(hay: &[u8], prefix: &[u8]) -> bool {
    hay.len() >= prefix.len() && hay[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// `hay` starts with the whole name `name` (not merely a longer name
/// sharing its first letters).
fn starts_with_name(hay: &[u8], name: &[u8]) -> bool {
    starts_with_ignore_case(hay, name) && !hay.get(name.len()).is_some_and(|&b| is_name_byte(b))
}

fn find(hay: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || hay.len() < needle.len() {
        return None;
    }
    hay.windows(needle.len()).position(|w| w == needle)
}

/// Case-insensitive search for an opening tag such as `<rss`, requiring a
/// delimiter after the name so `<rss` does not match `<rssfoo`.
fn contains_tag(hay: &[u8], tag: &[u8]) -> bool {
    if hay.len() <= tag.len() {
        return false;
    }
    hay.windows(tag.len() + 1).any(|w| {
        w[..tag.len()].eq_ignore_ascii_case(tag)
            && matches!(w[tag.len()], b' ' | b'\t' | b'\r' | b'\n' | b'>' | b'/')
    })
}

// =============================================================================
// Tests
// =============================================================================
