// Stability analysis across repeated crawls of one target

use crate::config::StabilityOptions;
use crate::index::CrawlDataset;
use crate::model::RunMetadata;
use crate::urls::{extract_host, normalize};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, info};

/// Path-shape buckets for unstable URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlCategory {
    HtmlPages,
    JavaScript,
    Css,
    Images,
    Fonts,
    Other,
}

impl UrlCategory {
    pub fn label(&self) -> &'static str {
        match self {
            UrlCategory::HtmlPages => "HTML Pages",
            UrlCategory::JavaScript => "JavaScript",
            UrlCategory::Css => "CSS",
            UrlCategory::Images => "Images",
            UrlCategory::Fonts => "Fonts",
            UrlCategory::Other => "Other",
        }
    }
}

impl fmt::Display for UrlCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// Checked after the configured HTML path markers; first match wins.
const URL_CATEGORY_RULES: &[(&[&str], UrlCategory)] = &[
    (&[".js", "javascript"], UrlCategory::JavaScript),
    (&[".css"], UrlCategory::Css),
    (
        &[".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp", ".ico", "image?"],
        UrlCategory::Images,
    ),
    (&[".woff", ".ttf", ".otf", ".eot"], UrlCategory::Fonts),
];

pub fn categorize_url(url: &str, options: &StabilityOptions) -> UrlCategory {
    let lower = url.to_lowercase();
    if options
        .html_path_markers
        .iter()
        .any(|marker| lower.contains(&marker.to_lowercase()))
    {
        return UrlCategory::HtmlPages;
    }

    URL_CATEGORY_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
        .map(|(_, category)| *category)
        .unwrap_or(UrlCategory::Other)
}

pub const MAIN_BUCKET: &str = "main";

/// The first host label when it is a known subdomain, otherwise "main".
pub fn subdomain_bucket(url: &str, known_subdomains: &[String]) -> String {
    extract_host(url)
        .and_then(|host| {
            let label = host.split('.').next()?.to_lowercase();
            known_subdomains
                .iter()
                .any(|known| known.eq_ignore_ascii_case(&label))
                .then_some(label)
        })
        .unwrap_or_else(|| MAIN_BUCKET.to_string())
}

/// Average run metadata over the runs where a URL was present vs. absent.
/// `None` when no run on that side carries metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunCorrelation {
    pub avg_duration_ms_present: Option<f64>,
    pub avg_duration_ms_missing: Option<f64>,
    pub avg_pages_present: Option<f64>,
    pub avg_pages_missing: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlStability {
    pub url: String,
    pub appearances: usize,
    pub rate: f64,
    pub present_in: Vec<String>,
    pub missing_from: Vec<String>,
    pub category: UrlCategory,
    pub subdomain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation: Option<RunCorrelation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketSummary {
    pub urls: Vec<String>,
    pub average_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingRunTrace {
    pub run_id: String,
    /// Linking sources from the present runs that this run crawled
    pub sources_present: Vec<String>,
    /// Of those, the ones that still link to the URL in this run
    pub sources_still_linking: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundTrace {
    pub url: String,
    pub present_runs: Vec<String>,
    pub sources_when_present: Vec<String>,
    pub missing_runs: Vec<MissingRunTrace>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StabilityReport {
    pub total_runs: usize,
    pub run_ids: Vec<String>,
    pub run_url_counts: BTreeMap<String, usize>,
    /// Snapshot size -> runs of that size
    pub size_distribution: BTreeMap<usize, Vec<String>>,
    pub total_urls: usize,
    pub stable: Vec<String>,
    /// Least frequent first, ties by URL
    pub unstable: Vec<UrlStability>,
    pub by_category: BTreeMap<UrlCategory, BucketSummary>,
    pub by_subdomain: BTreeMap<String, BucketSummary>,
    pub highly_unstable: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub inbound_traces: Vec<InboundTrace>,
}

impl StabilityReport {
    pub fn stable_count(&self) -> usize {
        self.stable.len()
    }

    pub fn unstable_count(&self) -> usize {
        self.unstable.len()
    }
}

fn average(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

fn correlate(
    present: &[String],
    missing: &[String],
    metadata: &BTreeMap<String, RunMetadata>,
) -> RunCorrelation {
    let side = |runs: &[String], f: fn(&RunMetadata) -> f64| {
        average(runs.iter().filter_map(|id| metadata.get(id)).map(f))
    };
    RunCorrelation {
        avg_duration_ms_present: side(present, |m| m.duration_ms as f64),
        avg_duration_ms_missing: side(missing, |m| m.duration_ms as f64),
        avg_pages_present: side(present, |m| m.pages_crawled as f64),
        avg_pages_missing: side(missing, |m| m.pages_crawled as f64),
    }
}

fn bucket<K: Ord>(
    unstable: &[UrlStability],
    key: impl Fn(&UrlStability) -> K,
) -> BTreeMap<K, BucketSummary> {
    let mut grouped: BTreeMap<K, (Vec<String>, f64)> = BTreeMap::new();
    for entry in unstable {
        let slot = grouped.entry(key(entry)).or_default();
        slot.0.push(entry.url.clone());
        slot.1 += entry.rate;
    }
    grouped
        .into_iter()
        .map(|(k, (urls, rate_sum))| {
            let average_rate = rate_sum / urls.len() as f64;
            (k, BucketSummary { urls, average_rate })
        })
        .collect()
}

/// Appearance counts and rates for every URL across `snapshots`.
///
/// Zero snapshots produce an empty report. Correlation is computed only
/// when `run_metadata` is given.
pub fn analyze_stability(
    snapshots: &BTreeMap<String, BTreeSet<String>>,
    run_metadata: Option<&BTreeMap<String, RunMetadata>>,
    options: &StabilityOptions,
) -> StabilityReport {
    let total_runs = snapshots.len();
    if total_runs == 0 {
        return StabilityReport::default();
    }

    let mut report = StabilityReport {
        total_runs,
        run_ids: snapshots.keys().cloned().collect(),
        ..Default::default()
    };

    for (run_id, urls) in snapshots {
        report.run_url_counts.insert(run_id.clone(), urls.len());
        report
            .size_distribution
            .entry(urls.len())
            .or_default()
            .push(run_id.clone());
    }

    let all_urls: BTreeSet<&String> = snapshots.values().flatten().collect();
    report.total_urls = all_urls.len();

    for url in all_urls {
        let (present_in, missing_from): (Vec<String>, Vec<String>) = snapshots
            .iter()
            .map(|(run_id, urls)| (run_id.clone(), urls.contains(url)))
            .fold((Vec::new(), Vec::new()), |(mut present, mut missing), (id, hit)| {
                if hit {
                    present.push(id);
                } else {
                    missing.push(id);
                }
                (present, missing)
            });

        let appearances = present_in.len();
        if appearances == total_runs {
            report.stable.push(url.clone());
            continue;
        }

        report.unstable.push(UrlStability {
            url: url.clone(),
            appearances,
            rate: appearances as f64 / total_runs as f64,
            category: categorize_url(url, options),
            subdomain: subdomain_bucket(url, &options.known_subdomains),
            correlation: run_metadata.map(|meta| correlate(&present_in, &missing_from, meta)),
            present_in,
            missing_from,
        });
    }

    report
        .unstable
        .sort_by(|x, y| x.appearances.cmp(&y.appearances).then_with(|| x.url.cmp(&y.url)));

    report.by_category = bucket(&report.unstable, |u| u.category);
    report.by_subdomain = bucket(&report.unstable, |u| u.subdomain.clone());
    report.highly_unstable = report
        .unstable
        .iter()
        .filter(|u| u.rate < options.highly_unstable_rate)
        .map(|u| u.url.clone())
        .collect();

    info!(
        "Analyzed {} runs: {} URLs, {} stable, {} unstable",
        total_runs,
        report.total_urls,
        report.stable.len(),
        report.unstable.len()
    );

    report
}

/// Snapshots and run metadata from indexed datasets keyed by run id.
pub fn snapshots_from_datasets(
    datasets: &BTreeMap<String, CrawlDataset>,
) -> (BTreeMap<String, BTreeSet<String>>, BTreeMap<String, RunMetadata>) {
    let snapshots = datasets
        .iter()
        .map(|(run_id, dataset)| (run_id.clone(), dataset.url_set()))
        .collect();
    let metadata = datasets
        .iter()
        .filter_map(|(run_id, dataset)| Some((run_id.clone(), dataset.run_metadata()?.clone())))
        .collect();
    (snapshots, metadata)
}

/// Who links to `url` in the runs that found it, and what became of
/// those sources in the runs that did not.
pub fn trace_inbound_links(datasets: &BTreeMap<String, CrawlDataset>, url: &str) -> InboundTrace {
    let key = normalize(url);
    let links_to = |dataset: &CrawlDataset, source: &str| {
        dataset.outlinks(source).iter().any(|link| link.target == key)
    };

    let mut trace = InboundTrace {
        url: key.clone(),
        ..Default::default()
    };
    let mut sources: BTreeSet<String> = BTreeSet::new();
    let mut missing_ids = Vec::new();

    for (run_id, dataset) in datasets {
        if !dataset.contains(&key) {
            missing_ids.push(run_id);
            continue;
        }
        trace.present_runs.push(run_id.clone());
        for (source, links) in dataset.links_by_source() {
            if links.iter().any(|link| link.target == key) {
                sources.insert(source.clone());
            }
        }
    }

    for run_id in missing_ids {
        let Some(dataset) = datasets.get(run_id) else {
            continue;
        };
        let sources_present: Vec<String> = sources
            .iter()
            .filter(|source| dataset.contains(source))
            .cloned()
            .collect();
        let sources_still_linking = sources_present
            .iter()
            .filter(|source| links_to(dataset, source.as_str()))
            .cloned()
            .collect();
        trace.missing_runs.push(MissingRunTrace {
            run_id: run_id.clone(),
            sources_present,
            sources_still_linking,
        });
    }

    debug!(
        "Traced {}: {} linking sources, {} runs missing it",
        trace.url,
        sources.len(),
        trace.missing_runs.len()
    );
    trace.sources_when_present = sources.into_iter().collect();
    trace
}

/// Full analysis over indexed datasets, including inbound-link traces for
/// the first `trace_limit` highly unstable URLs.
pub fn analyze_datasets(
    datasets: &BTreeMap<String, CrawlDataset>,
    options: &StabilityOptions,
) -> StabilityReport {
    let (snapshots, metadata) = snapshots_from_datasets(datasets);
    let metadata = (!metadata.is_empty()).then_some(&metadata);

    let mut report = analyze_stability(&snapshots, metadata, options);
    report.inbound_traces = report
        .highly_unstable
        .iter()
        .take(options.trace_limit)
        .map(|url| trace_inbound_links(datasets, url))
        .collect();
    report
}
