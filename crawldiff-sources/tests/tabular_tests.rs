// Tests for CSV crawl export parsing

use crawldiff_core::model::{Indexability, LinkPosition, LinkType};
use crawldiff_sources::error::SourceError;
use crawldiff_sources::tabular::{load_links_csv, read_links_csv, read_pages_csv};
use std::io::Write;
use tempfile::NamedTempFile;

// ============================================================================
// Page Export Tests
// ============================================================================

#[test]
fn test_read_pages_csv_columns() {
    let csv = "\
Address,Status Code,Content Type,Title 1,H1-1,H2-1,Word Count,Indexability,Crawl Depth,Canonical Link Element 1
https://example.com/,200,text/html; charset=utf-8,Home,Welcome,Intro,350,Indexable,0,https://example.com/
https://example.com/old,301,,,,,,Non-Indexable,1,
";
    let pages = read_pages_csv(csv.as_bytes()).expect("valid csv");

    assert_eq!(pages.len(), 2);
    let home = &pages[0];
    assert_eq!(home.url, "https://example.com/");
    assert_eq!(home.status, 200);
    assert_eq!(home.content_type, "text/html; charset=utf-8");
    assert_eq!(home.title, "Home");
    assert_eq!(home.h1, "Welcome");
    assert_eq!(home.h2, "Intro");
    assert_eq!(home.word_count, 350);
    assert_eq!(home.depth, 0);
    assert_eq!(home.canonical_url, "https://example.com/");
    assert_eq!(home.indexable, Indexability::Indexable);

    assert_eq!(pages[1].status, 301);
    assert_eq!(pages[1].indexable, Indexability::NonIndexable);
}

#[test]
fn test_read_pages_csv_non_digit_counts_are_zero() {
    let csv = "Address,Status Code,Word Count,Crawl Depth\nhttps://example.com/,n/a,1.5,-1\n";
    let pages = read_pages_csv(csv.as_bytes()).expect("valid csv");

    assert_eq!(pages[0].status, 0);
    assert_eq!(pages[0].word_count, 0);
    assert_eq!(pages[0].depth, 0);
}

#[test]
fn test_read_pages_csv_headers_ignore_case_and_bom() {
    let csv = "\u{feff}address,STATUS CODE\nhttps://example.com/,404\n";
    let pages = read_pages_csv(csv.as_bytes()).expect("valid csv");
    assert_eq!(pages[0].url, "https://example.com/");
    assert_eq!(pages[0].status, 404);
}

#[test]
fn test_read_pages_csv_skips_blank_address_and_short_rows() {
    let csv = "Address,Status Code,Title 1\n,200,Ghost\nhttps://example.com/a\n";
    let pages = read_pages_csv(csv.as_bytes()).expect("valid csv");

    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].url, "https://example.com/a");
    assert_eq!(pages[0].status, 0);
    assert_eq!(pages[0].title, "");
}

#[test]
fn test_read_pages_csv_missing_address_column() {
    let result = read_pages_csv("URL,Status Code\nhttps://example.com/,200\n".as_bytes());
    assert!(matches!(result, Err(SourceError::MissingColumn(col)) if col == "Address"));
}

// ============================================================================
// Link Export Tests
// ============================================================================

#[test]
fn test_read_links_csv_columns() {
    let csv = "\
Type,Source,Destination,Alt Text,Anchor,Follow,Target,Rel,Path Type,Link Position
Hyperlink,https://example.com/,https://example.com/pricing,,Pricing,true,_blank,noopener,Absolute,Content
Image,https://example.com/,https://example.com/logo.png,Company logo,,false,,,Root-Relative,Head
";
    let links = read_links_csv(csv.as_bytes()).expect("valid csv");

    assert_eq!(links.len(), 2);
    let anchor = &links[0];
    assert_eq!(anchor.link_type, LinkType::Anchor);
    assert_eq!(anchor.anchor_text, "Pricing");
    assert!(anchor.follow);
    assert_eq!(anchor.target_attr, "_blank");
    assert_eq!(anchor.rel, "noopener");
    assert_eq!(anchor.path_type, "Absolute");
    assert_eq!(anchor.position, LinkPosition::Content);

    let image = &links[1];
    assert_eq!(image.link_type, LinkType::Image);
    // Alt text stands in for a missing anchor
    assert_eq!(image.anchor_text, "Company logo");
    assert!(!image.follow);
    assert_eq!(image.position, LinkPosition::Head);
}

#[test]
fn test_read_links_csv_follow_only_false_is_false() {
    let csv = "Source,Destination,Follow\na,b,FALSE\na,c,\na,d,no\n";
    let links = read_links_csv(csv.as_bytes()).expect("valid csv");
    let follows: Vec<bool> = links.iter().map(|l| l.follow).collect();
    assert_eq!(follows, vec![false, true, true]);
}

#[test]
fn test_read_links_csv_requires_both_endpoints() {
    let result = read_links_csv("Source,Anchor\na,b\n".as_bytes());
    assert!(matches!(result, Err(SourceError::MissingColumn(col)) if col == "Destination"));
}

#[test]
fn test_load_links_csv_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "Source,Destination")?;
    writeln!(file, "https://example.com/,https://example.com/a")?;
    writeln!(file, ",https://example.com/b")?;

    let links = load_links_csv(file.path())?;
    assert_eq!(links.len(), 1);
    Ok(())
}
