// Tests for JSON crawl export parsing

use crawldiff_core::model::{Indexability, LinkPosition, LinkType};
use crawldiff_sources::error::SourceError;
use crawldiff_sources::json::{load_pages_json, parse_links_json, parse_pages_json};
use std::io::Write;
use tempfile::NamedTempFile;

// ============================================================================
// Page Export Tests
// ============================================================================

#[test]
fn test_parse_pages_results_wrapper() {
    let export = parse_pages_json(
        r#"{
            "crawlId": "crawl-2024-06-01",
            "pagesCrawled": 2,
            "durationMs": 5120,
            "timestamp": "2024-06-01T10:00:00Z",
            "results": [
                {
                    "url": "https://example.com/",
                    "status": 200,
                    "contentType": "text/html",
                    "title": "Home",
                    "h1": "Welcome",
                    "canonicalUrl": "https://example.com/",
                    "wordCount": 420,
                    "depth": 0,
                    "indexable": true
                },
                {
                    "url": "https://example.com/draft",
                    "status": 200,
                    "indexable": false
                }
            ]
        }"#,
    )
    .expect("valid export");

    assert_eq!(export.crawl_id.as_deref(), Some("crawl-2024-06-01"));
    assert_eq!(export.pages.len(), 2);

    let home = &export.pages[0];
    assert_eq!(home.url, "https://example.com/");
    assert_eq!(home.status, 200);
    assert_eq!(home.title, "Home");
    assert_eq!(home.h1, "Welcome");
    assert_eq!(home.word_count, 420);
    assert_eq!(home.indexable, Indexability::Indexable);
    assert_eq!(export.pages[1].indexable, Indexability::NonIndexable);

    let metadata = export.run_metadata.expect("run metadata");
    assert_eq!(metadata.pages_crawled, 2);
    assert_eq!(metadata.duration_ms, 5120);
    assert_eq!(metadata.timestamp.as_deref(), Some("2024-06-01T10:00:00Z"));
}

#[test]
fn test_parse_pages_plain_array() {
    let export = parse_pages_json(
        r#"[{"address": "https://example.com/a", "statusCode": "301", "crawlDepth": 2}]"#,
    )
    .expect("valid export");

    assert!(export.crawl_id.is_none());
    assert!(export.run_metadata.is_none());
    assert_eq!(export.pages[0].url, "https://example.com/a");
    assert_eq!(export.pages[0].status, 301);
    assert_eq!(export.pages[0].depth, 2);
}

#[test]
fn test_parse_pages_lenient_fields() {
    let export = parse_pages_json(
        r#"{"pages": [
            {"url": "https://example.com/x", "status": null, "wordCount": "n/a", "title": null, "indexable": "Non-Indexable"},
            "not an object",
            {"url": "https://example.com/y", "wordCount": 12.0}
        ]}"#,
    )
    .expect("valid export");

    assert_eq!(export.pages.len(), 2);
    let x = &export.pages[0];
    assert_eq!(x.status, 0);
    assert_eq!(x.word_count, 0);
    assert_eq!(x.title, "");
    assert_eq!(x.indexable, Indexability::NonIndexable);
    assert_eq!(export.pages[1].word_count, 12);
    assert_eq!(export.pages[1].indexable, Indexability::Unknown);
}

#[test]
fn test_parse_pages_rejects_unexpected_shape() {
    let result = parse_pages_json(r#"{"items": []}"#);
    assert!(matches!(result, Err(SourceError::InvalidFormat(_))));

    let result = parse_pages_json("42");
    assert!(matches!(result, Err(SourceError::InvalidFormat(_))));
}

#[test]
fn test_parse_pages_malformed_json() {
    let result = parse_pages_json("{ unterminated");
    assert!(matches!(result, Err(SourceError::JsonError(_))));
}

#[test]
fn test_load_pages_json_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = NamedTempFile::new()?;
    write!(file, r#"{{"results": [{{"url": "https://example.com/"}}]}}"#)?;

    let export = load_pages_json(file.path())?;
    assert_eq!(export.pages.len(), 1);
    Ok(())
}

// ============================================================================
// Link Export Tests
// ============================================================================

#[test]
fn test_parse_links_current_field_names() {
    let links = parse_links_json(
        r#"{"links": [{
            "sourceUrl": "https://example.com/",
            "targetUrl": "https://example.com/pricing",
            "linkText": "Pricing",
            "linkType": "anchor",
            "follow": false,
            "rel": "nofollow",
            "target": "_blank",
            "pathType": "absolute",
            "position": "content"
        }]}"#,
    )
    .expect("valid links");

    assert_eq!(links.len(), 1);
    let link = &links[0];
    assert_eq!(link.source, "https://example.com/");
    assert_eq!(link.target, "https://example.com/pricing");
    assert_eq!(link.anchor_text, "Pricing");
    assert_eq!(link.link_type, LinkType::Anchor);
    assert!(!link.follow);
    assert_eq!(link.rel, "nofollow");
    assert_eq!(link.target_attr, "_blank");
    assert_eq!(link.path_type, "absolute");
    assert_eq!(link.position, LinkPosition::Content);
}

#[test]
fn test_parse_links_legacy_field_names() {
    let links = parse_links_json(
        r#"[{"from": "https://example.com/", "to": "https://example.com/app.js", "type": "script", "linkPosition": "head"}]"#,
    )
    .expect("valid links");

    let link = &links[0];
    assert_eq!(link.source, "https://example.com/");
    assert_eq!(link.target, "https://example.com/app.js");
    assert_eq!(link.link_type, LinkType::Script);
    assert_eq!(link.position, LinkPosition::Head);
    // follow defaults to true when absent
    assert!(link.follow);
}

#[test]
fn test_parse_links_follow_as_string() {
    let links = parse_links_json(
        r#"{"results": [
            {"from": "a", "to": "b", "follow": "false"},
            {"from": "a", "to": "c", "follow": "TRUE"},
            {"from": "a", "to": "d", "follow": "maybe"}
        ]}"#,
    )
    .expect("valid links");

    let follows: Vec<bool> = links.iter().map(|l| l.follow).collect();
    assert_eq!(follows, vec![false, true, true]);
}
