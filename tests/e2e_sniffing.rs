// feedsniff - tests/e2e_sniffing.rs
//
// End-to-end tests over real feed files on disk.
//
// These exercise the real filesystem, walkdir discovery, the sniffer, the
// dispatcher and the built-in parsers together, with no mocks. Fixtures
// live in tests/fixtures/.

use feedsniff::app::batch::{run_batch, BatchConfig};
use feedsniff::app::stream::sniff_reader;
use feedsniff::core::discovery::{discover_files, DiscoveryConfig};
use feedsniff::core::export::export_json;
use feedsniff::{classify, parse_feed, FeedFormat, FeedParseError, ParserData};
use std::fs;
use std::path::{Path, PathBuf};

// =============================================================================
// Helpers
// =============================================================================

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn fixture(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

fn read(name: &str) -> Vec<u8> {
    fs::read(fixture(name)).unwrap_or_else(|e| panic!("read fixture {name}: {e}"))
}

// =============================================================================
// Classification
// =============================================================================

#[test]
fn e2e_fixture_classifications() {
    let expected = [
        ("rss2.xml", FeedFormat::Rss),
        ("atom.xml", FeedFormat::Atom),
        ("jsonfeed.json", FeedFormat::JsonFeed),
        ("rss_in_json.json", FeedFormat::RssInJson),
        ("html_autodiscovery.html", FeedFormat::NotAFeed),
        ("error404.html", FeedFormat::NotAFeed),
        ("truncated.json", FeedFormat::Unknown),
        ("broken_jsonfeed.json", FeedFormat::JsonFeed),
    ];
    for (name, format) in expected {
        assert_eq!(classify(&read(name)), format, "classification of {name}");
    }
}

/// Growing a prefix of a real feed byte by byte: Unknown below the
/// threshold, then the final answer, never anything in between.
#[test]
fn e2e_prefixes_refine_monotonically() {
    for (name, format) in [
        ("rss2.xml", FeedFormat::Rss),
        ("atom.xml", FeedFormat::Atom),
        ("jsonfeed.json", FeedFormat::JsonFeed),
        ("rss_in_json.json", FeedFormat::RssInJson),
    ] {
        let bytes = read(name);
        for len in 0..=bytes.len() {
            let got = classify(&bytes[..len]);
            if len < 128 {
                assert_eq!(got, FeedFormat::Unknown, "{name} at {len} bytes");
            } else {
                assert_eq!(got, format, "{name} at {len} bytes");
            }
        }
    }
}

/// Key order in a JSON Feed is free; a feed whose `version` and `title`
/// come after a large `items` array is still a JSON Feed.
#[test]
fn e2e_sorted_key_json_feed_parses() {
    let mut doc = String::from(r#"{"items":["#);
    for i in 0..150 {
        if i > 0 {
            doc.push(',');
        }
        doc.push_str(&format!(
            r#"{{"content_text":"Entry {i} with enough text to take up room","id":"{i}"}}"#
        ));
    }
    doc.push_str(r#"],"title":"Sorted","version":"https://jsonfeed.org/version/1.1"}"#);
    assert!(doc.len() > 8 * 1024);

    assert_eq!(classify(doc.as_bytes()), FeedFormat::JsonFeed);
    let feed = parse_feed(&ParserData::from_bytes(doc.as_bytes()))
        .unwrap()
        .unwrap();
    assert_eq!(feed.title.as_deref(), Some("Sorted"));
    assert_eq!(feed.items.len(), 150);
}

#[test]
fn e2e_stream_decides_at_threshold() {
    let file = fs::File::open(fixture("atom.xml")).unwrap();
    let sniffer = sniff_reader(file, 50).unwrap();
    assert_eq!(sniffer.format(), FeedFormat::Atom);
    assert_eq!(sniffer.decided_at(), Some(150));
}

// =============================================================================
// Dispatch and parsing
// =============================================================================

#[test]
fn e2e_parse_rss() {
    let bytes = read("rss2.xml");
    let feed = parse_feed(&ParserData::from_bytes(&bytes)).unwrap().unwrap();
    assert_eq!(feed.format, Some(FeedFormat::Rss));
    assert_eq!(feed.title.as_deref(), Some("Inessential"));
    assert_eq!(
        feed.feed_url.as_deref(),
        Some("https://inessential.example/xml/rss.xml")
    );
    assert_eq!(feed.items.len(), 2);
    assert_eq!(feed.items[0].authors[0].name.as_deref(), Some("Brent"));
    assert_eq!(feed.items[1].unique_id, "episode-12");
    assert_eq!(feed.items[1].attachments[0].size_in_bytes, Some(24_986_239));
}

#[test]
fn e2e_parse_atom() {
    let bytes = read("atom.xml");
    let feed = parse_feed(&ParserData::from_bytes(&bytes)).unwrap().unwrap();
    assert_eq!(feed.title.as_deref(), Some("Example Atom Feed"));
    assert_eq!(feed.authors[0].email.as_deref(), Some("johndoe@atom.example"));
    assert_eq!(feed.items.len(), 1);
    let entry = &feed.items[0];
    assert_eq!(entry.url.as_deref(), Some("https://atom.example/2024/02/01/atom03"));
    assert!(entry
        .content_html
        .as_deref()
        .is_some_and(|html| html.contains("<p>This is the entry content.</p>")));
}

#[test]
fn e2e_parse_json_feed() {
    let bytes = read("jsonfeed.json");
    let feed = parse_feed(&ParserData::from_bytes(&bytes)).unwrap().unwrap();
    assert_eq!(feed.title.as_deref(), Some("My Example Feed"));
    assert_eq!(feed.items.len(), 2);
    assert!(feed.items[0].date_published > feed.items[1].date_published);
}

#[test]
fn e2e_parse_rss_in_json() {
    let bytes = read("rss_in_json.json");
    let url = "http://scripting.example/rss.json";
    let feed = parse_feed(&ParserData::new(Some(url), &bytes)).unwrap().unwrap();
    assert_eq!(feed.title.as_deref(), Some("Scripting News"));
    assert_eq!(feed.feed_url.as_deref(), Some(url));
    assert_eq!(
        feed.items[0].unique_id,
        "http://scripting.example/2024/01/15.html#a143022"
    );
}

#[test]
fn e2e_non_feeds_yield_nothing() {
    for name in ["html_autodiscovery.html", "error404.html", "truncated.json"] {
        let bytes = read(name);
        assert!(
            parse_feed(&ParserData::from_bytes(&bytes)).unwrap().is_none(),
            "{name} should not parse"
        );
    }
}

#[test]
fn e2e_broken_json_feed_reports_parser_error() {
    let bytes = read("broken_jsonfeed.json");
    let result = parse_feed(&ParserData::from_bytes(&bytes));
    assert!(
        matches!(result, Err(FeedParseError::TitleNotFound)),
        "expected TitleNotFound, got {result:?}"
    );
}

// =============================================================================
// Discovery + batch
// =============================================================================

#[test]
fn e2e_discover_and_batch_fixtures() {
    let (files, warnings) =
        discover_files(&fixtures_dir(), &DiscoveryConfig::default(), |_, _| {}).unwrap();
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    assert_eq!(files.len(), 8);

    let config = BatchConfig {
        parse: true,
        worker_threads: 2,
        ..Default::default()
    };
    let reports = run_batch(&files, &config);
    assert_eq!(reports.len(), files.len());
    for (report, file) in reports.iter().zip(&files) {
        assert_eq!(report.size, file.size);
    }

    let by_name = |name: &str| {
        reports
            .iter()
            .find(|r| r.path.file_name().and_then(|n| n.to_str()) == Some(name))
            .unwrap_or_else(|| panic!("no report for {name}"))
    };

    let rss = by_name("rss2.xml");
    assert_eq!(rss.format, FeedFormat::Rss);
    assert_eq!(rss.summary.as_ref().map(|s| s.item_count), Some(2));

    let broken = by_name("broken_jsonfeed.json");
    assert_eq!(broken.format, FeedFormat::JsonFeed);
    assert!(broken.error.is_some());

    assert!(by_name("error404.html").summary.is_none());
    assert_eq!(by_name("truncated.json").format, FeedFormat::Unknown);

    // The report survives a JSON round trip through a file.
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("report.json");
    let file = fs::File::create(&out).unwrap();
    export_json(&reports, file, Path::new(&out)).unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
    assert_eq!(parsed.as_array().map(Vec::len), Some(8));
}
