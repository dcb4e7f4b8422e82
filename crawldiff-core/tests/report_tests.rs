// Tests for report generation functionality

use crawldiff_core::compare::{ContentPair, compare_datasets};
use crawldiff_core::config::{CompareOptions, StabilityOptions};
use crawldiff_core::index::build_index;
use crawldiff_core::model::PageRecord;
use crawldiff_core::report::{
    ReportFormat, generate_comparison_json, generate_comparison_text, generate_stability_json,
    generate_stability_text, render_comparison, render_stability, save_report,
};
use crawldiff_core::stability::analyze_stability;
use crawldiff_core::{ComparisonReport, StabilityReport};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tempfile::TempDir;

fn html(url: &str, status: u16) -> PageRecord {
    PageRecord {
        content_type: "text/html".to_string(),
        status,
        ..PageRecord::new(url)
    }
}

fn sample_comparison() -> ComparisonReport {
    let a = build_index(
        vec![
            html("https://example.com/", 200),
            html("https://example.com/pricing", 200),
            html("https://example.com/old", 301),
        ],
        vec![],
    );
    let b = build_index(
        vec![
            html("https://example.com/", 200),
            html("https://example.com/old", 404),
            html("https://example.com/new", 200),
        ],
        vec![],
    );
    compare_datasets(&a, &b, None, &CompareOptions::default())
}

fn sample_stability() -> StabilityReport {
    let mut snapshots = BTreeMap::new();
    for (run, urls) in [
        ("run-1", vec!["https://example.com/", "https://example.com/flaky"]),
        ("run-2", vec!["https://example.com/"]),
        ("run-3", vec!["https://example.com/"]),
    ] {
        snapshots.insert(
            run.to_string(),
            urls.into_iter().map(String::from).collect::<BTreeSet<_>>(),
        );
    }
    analyze_stability(&snapshots, None, &StabilityOptions::default())
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str_text() {
    assert!(matches!(ReportFormat::from_str("text"), Some(ReportFormat::Text)));
    assert!(matches!(ReportFormat::from_str("txt"), Some(ReportFormat::Text)));
}

#[test]
fn test_report_format_from_str_json() {
    let format = ReportFormat::from_str("json");
    assert!(matches!(format, Some(ReportFormat::Json)));
}

#[test]
fn test_report_format_from_str_case_insensitive() {
    assert!(matches!(ReportFormat::from_str("TEXT"), Some(ReportFormat::Text)));
    assert!(matches!(ReportFormat::from_str("Json"), Some(ReportFormat::Json)));
}

#[test]
fn test_report_format_from_str_invalid() {
    assert!(ReportFormat::from_str("csv").is_none());
    assert!(ReportFormat::from_str("html").is_none());
    assert!(ReportFormat::from_str("").is_none());
}

// ============================================================================
// Comparison Report Tests
// ============================================================================

#[test]
fn test_comparison_text_sections() {
    let text = generate_comparison_text(&sample_comparison());

    assert!(text.contains("CRAWL COMPARISON REPORT"));
    assert!(text.contains("URL COVERAGE"));
    assert!(text.contains("STATUS CODES"));
    assert!(text.contains("OUTBOUND LINKS"));
    assert!(text.contains("PAGE ATTRIBUTES"));
    assert!(text.contains("LINK ATTRIBUTES"));
    assert!(text.contains("Generated by crawldiff"));
    // No content directories were supplied
    assert!(!text.contains("CONTENT SIMILARITY"));
    assert!(!text.contains("KEY COLLISIONS"));
}

#[test]
fn test_comparison_text_lists_differences() {
    let text = generate_comparison_text(&sample_comparison());

    assert!(text.contains("https://example.com/pricing"));
    assert!(text.contains("https://example.com/new"));
    assert!(text.contains("301 vs 404  https://example.com/old"));
}

#[test]
fn test_comparison_text_truncates_long_lists() {
    let b_pages: Vec<PageRecord> = (0..25)
        .map(|i| html(&format!("https://example.com/extra-{:02}", i), 200))
        .collect();
    let report = compare_datasets(
        &build_index(vec![], vec![]),
        &build_index(b_pages, vec![]),
        None,
        &CompareOptions::default(),
    );

    let text = generate_comparison_text(&report);
    assert!(text.contains("Only in candidate (25):"));
    assert!(text.contains("https://example.com/extra-19"));
    assert!(!text.contains("https://example.com/extra-20"));
    assert!(text.contains("... and 5 more"));
}

#[test]
fn test_comparison_text_reports_collisions() {
    let a = build_index(
        vec![
            html("https://example.com/docs/", 200),
            html("https://example.com/docs", 200),
        ],
        vec![],
    );
    let b = build_index(vec![html("https://example.com/docs", 200)], vec![]);
    let report = compare_datasets(&a, &b, None, &CompareOptions::default());

    let text = generate_comparison_text(&report);
    assert!(text.contains("KEY COLLISIONS"));
    assert!(text.contains("[reference] https://example.com/docs"));
}

#[test]
fn test_comparison_text_reports_content_collisions() {
    let dataset = build_index(vec![html("https://example.com/docs", 200)], vec![]);
    let text_a: HashMap<String, String> = [
        ("https://example.com/docs", "old text"),
        ("https://example.com/docs/", "new text"),
    ]
    .into_iter()
    .map(|(url, text)| (url.to_string(), text.to_string()))
    .collect();
    let text_b: HashMap<String, String> = HashMap::new();
    let content = ContentPair {
        a: &text_a,
        b: &text_b,
    };
    let report = compare_datasets(&dataset, &dataset, Some(content), &CompareOptions::default());

    let text = generate_comparison_text(&report);
    assert!(text.contains("KEY COLLISIONS"));
    assert!(text.contains(
        "[reference text] https://example.com/docs: https://example.com/docs replaced by https://example.com/docs/"
    ));
}

#[test]
fn test_comparison_json_envelope() {
    let json = generate_comparison_json(&sample_comparison()).expect("serializable");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");

    let metadata = &value["report"]["metadata"];
    assert_eq!(metadata["generator"], "crawldiff");
    assert_eq!(metadata["format"], "json");
    assert_eq!(metadata["kind"], "comparison");
    assert!(metadata["generated_at"].is_string());

    let summary = &value["report"]["data"]["summary"];
    assert_eq!(summary["pages_a"], 3);
    assert_eq!(summary["pages_b"], 3);
    assert_eq!(summary["common"], 2);
    assert_eq!(summary["status_diffs"], 1);
    assert!(summary.get("low_similarity_pages").is_none());
}

#[test]
fn test_render_comparison_dispatches_on_format() {
    let report = sample_comparison();
    let text = render_comparison(&report, ReportFormat::Text).expect("text");
    let json = render_comparison(&report, ReportFormat::Json).expect("json");

    assert!(text.starts_with('━'));
    assert!(json.trim_start().starts_with('{'));
}

// ============================================================================
// Stability Report Tests
// ============================================================================

#[test]
fn test_stability_text_sections() {
    let text = generate_stability_text(&sample_stability());

    assert!(text.contains("CRAWL STABILITY REPORT"));
    assert!(text.contains("Runs analyzed:  3"));
    assert!(text.contains("RUNS"));
    assert!(text.contains("UNSTABLE URLS"));
    assert!(text.contains("HIGHLY UNSTABLE"));
    assert!(text.contains("1/3 (33%)  https://example.com/flaky"));
    // No run metadata, no correlation section
    assert!(!text.contains("RUN CORRELATION"));
    assert!(!text.contains("INBOUND LINK TRACES"));
}

#[test]
fn test_stability_json_envelope() {
    let json = generate_stability_json(&sample_stability()).expect("serializable");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");

    assert_eq!(value["report"]["metadata"]["kind"], "stability");
    let data = &value["report"]["data"];
    assert_eq!(data["total_runs"], 3);
    assert_eq!(data["total_urls"], 2);
    assert_eq!(data["highly_unstable"][0], "https://example.com/flaky");
}

#[test]
fn test_render_stability_empty_report() {
    let text = render_stability(&StabilityReport::default(), ReportFormat::Text).expect("text");
    assert!(text.contains("Runs analyzed:  0"));
    assert!(text.contains("(none)"));
}

// ============================================================================
// Saving Tests
// ============================================================================

#[test]
fn test_save_report_writes_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let path = dir.path().join("report.txt");
    let text = generate_stability_text(&sample_stability());

    save_report(&text, &path)?;

    assert_eq!(std::fs::read_to_string(&path)?, text);
    Ok(())
}

#[test]
fn test_save_report_into_missing_directory_fails() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("missing").join("report.json");
    assert!(save_report("{}", &path).is_err());
}
