// Report rendering for comparison and stability results

use crate::compare::{ComparisonReport, ContentComparison, LinkDiff, ValueDiff};
use crate::stability::{StabilityReport, UrlStability};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const HEAVY_RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";
const LIGHT_RULE: &str = "────────────────────────────────────────────────────────────────────────────────";

/// Entries printed per list section of a text report
const TEXT_LIST_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

fn push_banner(report: &mut String, title: &str) {
    report.push_str(HEAVY_RULE);
    report.push('\n');
    report.push_str(&format!("{:^80}\n", title));
    report.push_str(HEAVY_RULE);
    report.push_str("\n\n");
}

fn push_section(report: &mut String, title: &str) {
    report.push_str(HEAVY_RULE);
    report.push('\n');
    report.push_str(title);
    report.push('\n');
    report.push_str(HEAVY_RULE);
    report.push_str("\n\n");
}

fn push_footer(report: &mut String) {
    report.push_str(HEAVY_RULE);
    report.push('\n');
    report.push_str(&format!("{:^80}\n", "End of Report"));
    report.push_str(HEAVY_RULE);
    report.push_str("\n\nGenerated by crawldiff\n\n");
}

/// Up to `TEXT_LIST_LIMIT` lines, then a count of what was left out.
fn push_list<I, T, F>(report: &mut String, items: I, render: F)
where
    I: ExactSizeIterator<Item = T>,
    F: Fn(T) -> String,
{
    let total = items.len();
    if total == 0 {
        report.push_str("  (none)\n");
        return;
    }
    for item in items.take(TEXT_LIST_LIMIT) {
        report.push_str("  ");
        report.push_str(&render(item));
        report.push('\n');
    }
    if total > TEXT_LIST_LIMIT {
        report.push_str(&format!("  ... and {} more\n", total - TEXT_LIST_LIMIT));
    }
}

fn push_value_diffs<T: Display>(report: &mut String, label: &str, diffs: &[ValueDiff<T>]) {
    if diffs.is_empty() {
        return;
    }
    report.push_str(&format!("{} ({}):\n", label, diffs.len()));
    push_list(report, diffs.iter(), |d| {
        format!("{}\n      reference: {}\n      candidate: {}", d.url, d.a, d.b)
    });
    report.push('\n');
}

fn push_link_diffs<T: Display>(report: &mut String, label: &str, diffs: &[LinkDiff<T>]) {
    if diffs.is_empty() {
        return;
    }
    report.push_str(&format!("{} ({}):\n", label, diffs.len()));
    push_list(report, diffs.iter(), |d| {
        format!("{} -> {}: {} vs {}", d.source, d.dest, d.a, d.b)
    });
    report.push('\n');
}

fn format_content_line(c: &ContentComparison) -> String {
    format!(
        "{:.3} jaccard  {:.3} overlap  {:.3} dice  {:.3} sequence  {}",
        c.metrics.jaccard, c.metrics.overlap, c.metrics.dice, c.metrics.sequence_ratio, c.url
    )
}

pub fn generate_comparison_text(report: &ComparisonReport) -> String {
    let mut out = String::new();
    let summary = &report.summary;

    push_banner(&mut out, "CRAWL COMPARISON REPORT");

    out.push_str(&format!("Reference pages:   {}\n", summary.pages_a));
    out.push_str(&format!("Candidate pages:   {}\n", summary.pages_b));
    out.push_str(&format!(
        "Common pages:      {} ({:.1}% coverage)\n",
        summary.common, summary.coverage_pct
    ));
    out.push_str(&format!("Only in reference: {}\n", summary.only_in_a));
    out.push_str(&format!("Only in candidate: {}\n", summary.only_in_b));
    out.push_str(&format!(
        "Excluded:          {} / {} pages, {} / {} links\n",
        summary.excluded_pages_a,
        summary.excluded_pages_b,
        summary.excluded_links_a,
        summary.excluded_links_b
    ));
    out.push('\n');

    push_section(&mut out, "URL COVERAGE");
    out.push_str("Pages per category (reference / candidate):\n");
    let categories = report
        .urls
        .count_by_category_a
        .keys()
        .chain(report.urls.count_by_category_b.keys())
        .collect::<std::collections::BTreeSet<_>>();
    for category in categories {
        out.push_str(&format!(
            "  {:<12} {:>6} / {}\n",
            category.as_str(),
            report.urls.count_by_category_a.get(category).unwrap_or(&0),
            report.urls.count_by_category_b.get(category).unwrap_or(&0)
        ));
    }
    out.push('\n');

    for (category, urls) in &report.urls.missing_by_category {
        out.push_str(&format!("Missing {} in candidate ({}):\n", category, urls.len()));
        push_list(&mut out, urls.iter(), |u| u.clone());
        out.push('\n');
    }
    out.push_str(&format!("Only in candidate ({}):\n", report.urls.only_in_b.len()));
    push_list(&mut out, report.urls.only_in_b.iter(), |u| u.clone());
    out.push('\n');

    push_section(&mut out, "STATUS CODES");
    push_list(&mut out, report.status.iter(), |d| {
        format!("{} vs {}  {}", d.status_a, d.status_b, d.url)
    });
    out.push('\n');

    push_section(&mut out, "OUTBOUND LINKS");
    out.push_str(&format!(
        "Pages checked: {}, differing: {}\n\n",
        report.outlinks.checked_pages,
        report.outlinks.diffs.len()
    ));
    push_list(&mut out, report.outlinks.diffs.iter(), |d| {
        format!(
            "{} ({} vs {}, -{} +{})",
            d.source,
            d.count_a,
            d.count_b,
            d.only_in_a.len(),
            d.only_in_b.len()
        )
    });
    out.push('\n');

    push_section(&mut out, "PAGE ATTRIBUTES");
    let pages = &report.page_attributes;
    if pages.total() == 0 {
        out.push_str("  (none)\n\n");
    }
    push_value_diffs(&mut out, "Depth", &pages.depth);
    push_value_diffs(&mut out, "Title", &pages.title);
    push_value_diffs(&mut out, "H1", &pages.h1);
    if !pages.word_count.is_empty() {
        out.push_str(&format!("Word count ({}):\n", pages.word_count.len()));
        push_list(&mut out, pages.word_count.iter(), |d| {
            format!("{} vs {} ({:.1}%)  {}", d.a, d.b, d.diff_pct, d.url)
        });
        out.push('\n');
    }
    push_value_diffs(&mut out, "Indexability", &pages.indexable);
    push_value_diffs(&mut out, "Canonical", &pages.canonical);

    push_section(&mut out, "LINK ATTRIBUTES");
    let links = &report.link_attributes;
    out.push_str(&format!(
        "Links checked: {}, differences: {}\n\n",
        links.checked_links,
        links.total()
    ));
    push_link_diffs(&mut out, "Follow", &links.follow);
    push_link_diffs(&mut out, "Rel", &links.rel);
    push_link_diffs(&mut out, "Target", &links.target_attr);
    push_link_diffs(&mut out, "Path type", &links.path_type);
    push_link_diffs(&mut out, "Position", &links.position);
    push_link_diffs(&mut out, "Link type", &links.link_type);

    if let Some(content) = &report.content {
        push_section(&mut out, "CONTENT SIMILARITY");
        out.push_str(&format!(
            "Pages with content: {} / {}, compared: {}\n",
            content.pages_with_content_a,
            content.pages_with_content_b,
            content.comparisons.len()
        ));
        out.push_str(&format!(
            "Averages: jaccard {:.3}, overlap {:.3}, dice {:.3}, sequence {:.3}\n",
            content.averages.jaccard,
            content.averages.overlap,
            content.averages.dice,
            content.averages.sequence_ratio
        ));
        out.push_str(&format!(
            "Content only in reference: {}, only in candidate: {}\n\n",
            content.only_in_a.len(),
            content.only_in_b.len()
        ));
        out.push_str(&format!(
            "Low similarity ({}):\n",
            content.low_similarity_count
        ));
        push_list(&mut out, content.low_similarity.iter(), format_content_line);
        out.push('\n');
    }

    let (content_a, content_b) = match &report.content {
        Some(content) => (&content.collisions_a[..], &content.collisions_b[..]),
        None => (&[][..], &[][..]),
    };
    let all: Vec<_> = report
        .collisions_a
        .iter()
        .map(|c| ("reference", c))
        .chain(report.collisions_b.iter().map(|c| ("candidate", c)))
        .chain(content_a.iter().map(|c| ("reference text", c)))
        .chain(content_b.iter().map(|c| ("candidate text", c)))
        .collect();
    if !all.is_empty() {
        push_section(&mut out, "KEY COLLISIONS");
        push_list(&mut out, all.into_iter(), |(side, c)| {
            format!("[{}] {}: {} replaced by {}", side, c.key, c.replaced, c.kept)
        });
        out.push('\n');
    }

    push_footer(&mut out);
    out
}

fn format_unstable_line(u: &UrlStability, total_runs: usize) -> String {
    format!(
        "{}/{} ({:.0}%)  {}",
        u.appearances,
        total_runs,
        u.rate * 100.0,
        u.url
    )
}

fn format_average(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{:.*}", precision, v))
        .unwrap_or_else(|| "n/a".to_string())
}

pub fn generate_stability_text(report: &StabilityReport) -> String {
    let mut out = String::new();

    push_banner(&mut out, "CRAWL STABILITY REPORT");

    out.push_str(&format!("Runs analyzed:  {}\n", report.total_runs));
    out.push_str(&format!("Distinct URLs:  {}\n", report.total_urls));
    out.push_str(&format!("Stable URLs:    {}\n", report.stable_count()));
    out.push_str(&format!("Unstable URLs:  {}\n", report.unstable_count()));
    out.push('\n');

    push_section(&mut out, "RUNS");
    for (run_id, count) in &report.run_url_counts {
        out.push_str(&format!("  {:<24} {} URLs\n", run_id, count));
    }
    out.push_str("\nURL count distribution:\n");
    for (size, runs) in report.size_distribution.iter().rev() {
        out.push_str(&format!("  {:>6} URLs: {} runs\n", size, runs.len()));
    }
    out.push('\n');

    push_section(&mut out, "UNSTABLE URLS");
    push_list(&mut out, report.unstable.iter(), |u| {
        format_unstable_line(u, report.total_runs)
    });
    out.push('\n');

    out.push_str("By category:\n");
    for (category, bucket) in &report.by_category {
        out.push_str(&format!(
            "  {:<12} {:>4} URLs, avg rate {:.1}%\n",
            category.label(),
            bucket.urls.len(),
            bucket.average_rate * 100.0
        ));
    }
    out.push_str("\nBy subdomain:\n");
    for (subdomain, bucket) in &report.by_subdomain {
        out.push_str(&format!(
            "  {:<12} {:>4} URLs, avg rate {:.1}%\n",
            subdomain,
            bucket.urls.len(),
            bucket.average_rate * 100.0
        ));
    }
    out.push('\n');

    push_section(&mut out, "HIGHLY UNSTABLE");
    push_list(&mut out, report.highly_unstable.iter(), |u| u.clone());
    out.push('\n');

    let correlated: Vec<&UrlStability> = report
        .unstable
        .iter()
        .filter(|u| u.correlation.is_some())
        .collect();
    if !correlated.is_empty() {
        push_section(&mut out, "RUN CORRELATION");
        for u in correlated.iter().take(TEXT_LIST_LIMIT) {
            let Some(c) = &u.correlation else {
                continue;
            };
            out.push_str(&format!("{}\n", u.url));
            out.push_str(&format!(
                "  duration present {}ms, missing {}ms\n",
                format_average(c.avg_duration_ms_present, 0),
                format_average(c.avg_duration_ms_missing, 0)
            ));
            out.push_str(&format!(
                "  pages present {}, missing {}\n",
                format_average(c.avg_pages_present, 1),
                format_average(c.avg_pages_missing, 1)
            ));
        }
        out.push('\n');
    }

    if !report.inbound_traces.is_empty() {
        push_section(&mut out, "INBOUND LINK TRACES");
        for trace in &report.inbound_traces {
            out.push_str(&format!("{}\n", trace.url));
            out.push_str(&format!(
                "  linked from {} sources in {} runs\n",
                trace.sources_when_present.len(),
                trace.present_runs.len()
            ));
            for missing in &trace.missing_runs {
                out.push_str(&format!(
                    "  {}: {} sources crawled, {} still linking\n",
                    missing.run_id,
                    missing.sources_present.len(),
                    missing.sources_still_linking.len()
                ));
            }
            out.push_str(LIGHT_RULE);
            out.push('\n');
        }
        out.push('\n');
    }

    push_footer(&mut out);
    out
}

fn wrap_json<T: Serialize>(kind: &str, data: &T) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "crawldiff",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json",
                "kind": kind
            },
            "data": serde_json::to_value(data)?
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_comparison_json(report: &ComparisonReport) -> Result<String, serde_json::Error> {
    wrap_json("comparison", report)
}

pub fn generate_stability_json(report: &StabilityReport) -> Result<String, serde_json::Error> {
    wrap_json("stability", report)
}

pub fn render_comparison(
    report: &ComparisonReport,
    format: ReportFormat,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_comparison_text(report)),
        ReportFormat::Json => generate_comparison_json(report),
    }
}

pub fn render_stability(
    report: &StabilityReport,
    format: ReportFormat,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_stability_text(report)),
        ReportFormat::Json => generate_stability_json(report),
    }
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
