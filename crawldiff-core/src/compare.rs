// Differential comparison of two crawl datasets: `a` is the reference, `b` the candidate

use crate::classify::{ResourceCategory, classify};
use crate::config::CompareOptions;
use crate::index::{CrawlDataset, KeyCollision};
use crate::model::{Indexability, LinkPosition, LinkRecord, LinkType};
use crate::similarity::{ContentMetrics, compute_content_metrics};
use crate::urls::normalize;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlSetDiff {
    pub only_in_a: BTreeSet<String>,
    pub only_in_b: BTreeSet<String>,
    pub common: BTreeSet<String>,
    /// `a`'s URLs of a category that `b` does not hold under the same category
    pub missing_by_category: BTreeMap<ResourceCategory, BTreeSet<String>>,
    pub count_by_category_a: BTreeMap<ResourceCategory, usize>,
    pub count_by_category_b: BTreeMap<ResourceCategory, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDiff {
    pub url: String,
    pub status_a: u16,
    pub status_b: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueDiff<T> {
    pub url: String,
    pub a: T,
    pub b: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordCountDiff {
    pub url: String,
    pub a: u32,
    pub b: u32,
    /// Relative difference in percent, one decimal
    pub diff_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageAttributeDiffs {
    pub depth: Vec<ValueDiff<u32>>,
    pub title: Vec<ValueDiff<String>>,
    pub h1: Vec<ValueDiff<String>>,
    pub word_count: Vec<WordCountDiff>,
    pub indexable: Vec<ValueDiff<Indexability>>,
    pub canonical: Vec<ValueDiff<String>>,
}

impl PageAttributeDiffs {
    pub fn total(&self) -> usize {
        self.depth.len()
            + self.title.len()
            + self.h1.len()
            + self.word_count.len()
            + self.indexable.len()
            + self.canonical.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDiff<T> {
    pub source: String,
    pub dest: String,
    pub a: T,
    pub b: T,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkAttributeDiffs {
    /// (source, destination) pairs present on both sides
    pub checked_links: usize,
    pub follow: Vec<LinkDiff<bool>>,
    pub rel: Vec<LinkDiff<String>>,
    pub target_attr: Vec<LinkDiff<String>>,
    pub path_type: Vec<LinkDiff<String>>,
    pub position: Vec<LinkDiff<LinkPosition>>,
    pub link_type: Vec<LinkDiff<LinkType>>,
}

impl LinkAttributeDiffs {
    pub fn total(&self) -> usize {
        self.follow.len()
            + self.rel.len()
            + self.target_attr.len()
            + self.path_type.len()
            + self.position.len()
            + self.link_type.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlinkDiff {
    pub source: String,
    pub count_a: usize,
    pub count_b: usize,
    pub only_in_a: Vec<String>,
    pub only_in_b: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlinkDiffs {
    pub checked_pages: usize,
    pub diffs: Vec<OutlinkDiff>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentComparison {
    pub url: String,
    #[serde(flatten)]
    pub metrics: ContentMetrics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentAverages {
    pub jaccard: f64,
    pub overlap: f64,
    pub dice: f64,
    pub sequence_ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentDiff {
    pub pages_with_content_a: usize,
    pub pages_with_content_b: usize,
    /// URLs with text on one side only
    pub only_in_a: Vec<String>,
    pub only_in_b: Vec<String>,
    /// Low-similarity pages first (ascending Jaccard), then the rest by URL
    pub comparisons: Vec<ContentComparison>,
    pub low_similarity_count: usize,
    /// The worst pages, capped at `low_similarity_limit`
    pub low_similarity: Vec<ContentComparison>,
    pub averages: ContentAverages,
    /// Raw content keys that normalized onto an already loaded key
    pub collisions_a: Vec<KeyCollision>,
    pub collisions_b: Vec<KeyCollision>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub pages_a: usize,
    pub pages_b: usize,
    pub common: usize,
    pub only_in_a: usize,
    pub only_in_b: usize,
    /// Share of `a`'s pages also found in `b`, in percent
    pub coverage_pct: f64,
    pub excluded_pages_a: usize,
    pub excluded_pages_b: usize,
    pub excluded_links_a: usize,
    pub excluded_links_b: usize,
    pub status_diffs: usize,
    pub outlink_diffs: usize,
    pub page_attribute_diffs: usize,
    pub link_attribute_diffs: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_similarity_pages: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub summary: ComparisonSummary,
    pub urls: UrlSetDiff,
    pub status: Vec<StatusDiff>,
    pub outlinks: OutlinkDiffs,
    pub page_attributes: PageAttributeDiffs,
    pub link_attributes: LinkAttributeDiffs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentDiff>,
    pub collisions_a: Vec<KeyCollision>,
    pub collisions_b: Vec<KeyCollision>,
}

/// Per-URL page text for both sides of a content comparison.
pub struct ContentPair<'c> {
    pub a: &'c HashMap<String, String>,
    pub b: &'c HashMap<String, String>,
}

fn category_counts(dataset: &CrawlDataset) -> BTreeMap<ResourceCategory, usize> {
    dataset
        .by_category()
        .iter()
        .filter(|(_, urls)| !urls.is_empty())
        .map(|(category, urls)| (*category, urls.len()))
        .collect()
}

fn sorted_common_keys(a: &CrawlDataset, b: &CrawlDataset) -> Vec<String> {
    let mut keys: Vec<String> = a
        .pages()
        .keys()
        .filter(|key| b.contains(key))
        .cloned()
        .collect();
    keys.sort();
    keys
}

pub fn diff_url_sets(a: &CrawlDataset, b: &CrawlDataset) -> UrlSetDiff {
    let set_a: BTreeSet<String> = a.url_set();
    let set_b: BTreeSet<String> = b.url_set();

    let mut missing_by_category = BTreeMap::new();
    for (category, urls_a) in a.by_category() {
        let missing: BTreeSet<String> = match b.category_urls(*category) {
            Some(urls_b) => urls_a.difference(urls_b).cloned().collect(),
            None => urls_a.iter().cloned().collect(),
        };
        if !missing.is_empty() {
            missing_by_category.insert(*category, missing);
        }
    }

    UrlSetDiff {
        only_in_a: set_a.difference(&set_b).cloned().collect(),
        only_in_b: set_b.difference(&set_a).cloned().collect(),
        common: set_a.intersection(&set_b).cloned().collect(),
        missing_by_category,
        count_by_category_a: category_counts(a),
        count_by_category_b: category_counts(b),
    }
}

/// Status mismatches for URLs crawled by both sides, sorted by URL.
pub fn diff_status_codes(a: &CrawlDataset, b: &CrawlDataset) -> Vec<StatusDiff> {
    sorted_common_keys(a, b)
        .into_iter()
        .filter_map(|url| {
            let status_a = a.page(&url)?.status;
            let status_b = b.page(&url)?.status;
            (status_a != status_b).then_some(StatusDiff {
                url,
                status_a,
                status_b,
            })
        })
        .collect()
}

fn excerpt(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

pub fn word_count_diff_pct(a: u32, b: u32) -> f64 {
    let larger = a.max(b).max(1) as f64;
    (a as f64 - b as f64).abs() / larger * 100.0
}

pub fn diff_page_attributes(
    a: &CrawlDataset,
    b: &CrawlDataset,
    options: &CompareOptions,
) -> PageAttributeDiffs {
    let mut diffs = PageAttributeDiffs::default();

    for url in sorted_common_keys(a, b) {
        let (Some(page_a), Some(page_b)) = (a.page(&url), b.page(&url)) else {
            continue;
        };

        if page_a.depth != page_b.depth {
            diffs.depth.push(ValueDiff {
                url: url.clone(),
                a: page_a.depth,
                b: page_b.depth,
            });
        }

        let (title_a, title_b) = (page_a.title.trim(), page_b.title.trim());
        if title_a != title_b {
            diffs.title.push(ValueDiff {
                url: url.clone(),
                a: excerpt(title_a, options.excerpt_chars),
                b: excerpt(title_b, options.excerpt_chars),
            });
        }

        let (h1_a, h1_b) = (page_a.h1.trim(), page_b.h1.trim());
        if h1_a != h1_b {
            diffs.h1.push(ValueDiff {
                url: url.clone(),
                a: excerpt(h1_a, options.excerpt_chars),
                b: excerpt(h1_b, options.excerpt_chars),
            });
        }

        let pct = word_count_diff_pct(page_a.word_count, page_b.word_count);
        if pct > options.word_count_tolerance_pct {
            diffs.word_count.push(WordCountDiff {
                url: url.clone(),
                a: page_a.word_count,
                b: page_b.word_count,
                diff_pct: (pct * 10.0).round() / 10.0,
            });
        }

        // Indexability only means something for HTML documents.
        if classify(&page_a.content_type) == ResourceCategory::Html
            && page_a.indexable.is_indexable() != page_b.indexable.is_indexable()
        {
            diffs.indexable.push(ValueDiff {
                url: url.clone(),
                a: page_a.indexable,
                b: page_b.indexable,
            });
        }

        let canonical_a = normalize(page_a.canonical_url.trim());
        let canonical_b = normalize(page_b.canonical_url.trim());
        if !canonical_a.is_empty() && !canonical_b.is_empty() && canonical_a != canonical_b {
            diffs.canonical.push(ValueDiff {
                url,
                a: canonical_a,
                b: canonical_b,
            });
        }
    }

    debug!("Page attribute diffs: {}", diffs.total());
    diffs
}

/// One edge per destination; a later edge to the same destination wins.
fn links_by_dest(links: &[LinkRecord]) -> BTreeMap<&str, &LinkRecord> {
    links
        .iter()
        .map(|link| (link.target.as_str(), link))
        .collect()
}

fn link_diff<T>(source: &str, dest: &str, a: T, b: T) -> LinkDiff<T> {
    LinkDiff {
        source: source.to_string(),
        dest: dest.to_string(),
        a,
        b,
    }
}

/// Script, stylesheet and image references on the reference side report a
/// head/content placement the candidate never records; treat it as unknown.
fn reference_position(link: &LinkRecord) -> LinkPosition {
    match link.position {
        LinkPosition::Head | LinkPosition::Content if link.link_type.is_resource() => {
            LinkPosition::Unknown
        }
        _ => link.position.clone(),
    }
}

pub fn diff_link_attributes(a: &CrawlDataset, b: &CrawlDataset) -> LinkAttributeDiffs {
    let mut diffs = LinkAttributeDiffs::default();

    let mut sources: Vec<&String> = a
        .links_by_source()
        .keys()
        .filter(|source| b.links_by_source().contains_key(*source))
        .collect();
    sources.sort();

    for source in sources {
        let map_a = links_by_dest(a.outlinks(source));
        let map_b = links_by_dest(b.outlinks(source));

        for (dest, link_a) in &map_a {
            let Some(link_b) = map_b.get(dest) else {
                continue;
            };
            diffs.checked_links += 1;

            if link_a.follow != link_b.follow {
                diffs
                    .follow
                    .push(link_diff(source, dest, link_a.follow, link_b.follow));
            }
            if link_a.target_attr != link_b.target_attr {
                diffs.target_attr.push(link_diff(
                    source,
                    dest,
                    link_a.target_attr.clone(),
                    link_b.target_attr.clone(),
                ));
            }
            if link_a.rel != link_b.rel {
                diffs.rel.push(link_diff(
                    source,
                    dest,
                    link_a.rel.clone(),
                    link_b.rel.clone(),
                ));
            }
            if link_a.path_type != link_b.path_type {
                diffs.path_type.push(link_diff(
                    source,
                    dest,
                    link_a.path_type.clone(),
                    link_b.path_type.clone(),
                ));
            }
            if reference_position(link_a) != link_b.position {
                diffs.position.push(link_diff(
                    source,
                    dest,
                    link_a.position.clone(),
                    link_b.position.clone(),
                ));
            }
            if link_a.link_type != link_b.link_type {
                diffs.link_type.push(link_diff(
                    source,
                    dest,
                    link_a.link_type.clone(),
                    link_b.link_type.clone(),
                ));
            }
        }
    }

    debug!(
        "Checked {} shared links, {} attribute diffs",
        diffs.checked_links,
        diffs.total()
    );
    diffs
}

/// Destination-set differences for every page both sides crawled.
pub fn diff_outlinks(a: &CrawlDataset, b: &CrawlDataset) -> OutlinkDiffs {
    let mut result = OutlinkDiffs::default();

    for source in sorted_common_keys(a, b) {
        result.checked_pages += 1;

        let dests_a: BTreeSet<&str> = a.outlinks(&source).iter().map(|l| l.target.as_str()).collect();
        let dests_b: BTreeSet<&str> = b.outlinks(&source).iter().map(|l| l.target.as_str()).collect();
        if dests_a == dests_b {
            continue;
        }

        result.diffs.push(OutlinkDiff {
            count_a: dests_a.len(),
            count_b: dests_b.len(),
            only_in_a: dests_a.difference(&dests_b).map(|s| s.to_string()).collect(),
            only_in_b: dests_b.difference(&dests_a).map(|s| s.to_string()).collect(),
            source,
        });
    }

    result
}

/// Fold raw content keys onto normalized keys in sorted raw-key order, so the
/// last raw key in that order wins and every replaced key is recorded.
fn normalized_content<'c>(
    content: &'c HashMap<String, String>,
    options: &CompareOptions,
) -> (BTreeMap<String, &'c str>, Vec<KeyCollision>) {
    let filter = options.url_filter();
    let mut raw: Vec<(&String, &String)> = content
        .iter()
        .filter(|(url, _)| !filter.excludes(url))
        .collect();
    raw.sort_by(|x, y| x.0.cmp(y.0));

    let mut texts: BTreeMap<String, (&'c str, &'c str)> = BTreeMap::new();
    let mut collisions = Vec::new();
    for (url, text) in raw {
        let key = normalize(url);
        if let Some((previous, _)) = texts.insert(key.clone(), (url.as_str(), text.as_str())) {
            debug!("Content key collision on {}: {} replaced by {}", key, previous, url);
            collisions.push(KeyCollision {
                key,
                replaced: previous.to_string(),
                kept: url.clone(),
            });
        }
    }

    let texts = texts
        .into_iter()
        .map(|(key, (_, text))| (key, text))
        .collect();
    (texts, collisions)
}

/// Score page text for every URL both sides supplied text for.
pub fn diff_content(
    content_a: &HashMap<String, String>,
    content_b: &HashMap<String, String>,
    options: &CompareOptions,
) -> ContentDiff {
    let (texts_a, collisions_a) = normalized_content(content_a, options);
    let (texts_b, collisions_b) = normalized_content(content_b, options);

    let mut low = Vec::new();
    let mut rest = Vec::new();
    let mut only_in_a = Vec::new();

    for (url, text_a) in &texts_a {
        let Some(text_b) = texts_b.get(url) else {
            only_in_a.push(url.clone());
            continue;
        };
        let metrics = compute_content_metrics(text_a, text_b, options.sequence_char_cap);
        let comparison = ContentComparison {
            url: url.clone(),
            metrics,
        };
        if comparison.metrics.jaccard < options.low_similarity_threshold {
            low.push(comparison);
        } else {
            rest.push(comparison);
        }
    }

    let only_in_b: Vec<String> = texts_b
        .keys()
        .filter(|url| !texts_a.contains_key(*url))
        .cloned()
        .collect();

    // Stable sort keeps URL order among equal scores.
    low.sort_by(|x, y| x.metrics.jaccard.total_cmp(&y.metrics.jaccard));

    let low_similarity_count = low.len();
    let low_similarity: Vec<ContentComparison> =
        low.iter().take(options.low_similarity_limit).cloned().collect();

    let mut comparisons = low;
    comparisons.extend(rest);

    let averages = if comparisons.is_empty() {
        ContentAverages::default()
    } else {
        let n = comparisons.len() as f64;
        let sum = |f: fn(&ContentMetrics) -> f64| -> f64 {
            comparisons.iter().map(|c| f(&c.metrics)).sum::<f64>() / n
        };
        ContentAverages {
            jaccard: sum(|m| m.jaccard),
            overlap: sum(|m| m.overlap),
            dice: sum(|m| m.dice),
            sequence_ratio: sum(|m| m.sequence_ratio),
        }
    };

    ContentDiff {
        pages_with_content_a: texts_a.len(),
        pages_with_content_b: texts_b.len(),
        only_in_a,
        only_in_b,
        comparisons,
        low_similarity_count,
        low_similarity,
        averages,
        collisions_a,
        collisions_b,
    }
}

/// Run every comparison and assemble the report.
pub fn compare_datasets(
    a: &CrawlDataset,
    b: &CrawlDataset,
    content: Option<ContentPair<'_>>,
    options: &CompareOptions,
) -> ComparisonReport {
    let urls = diff_url_sets(a, b);
    let status = diff_status_codes(a, b);
    let outlinks = diff_outlinks(a, b);
    let page_attributes = diff_page_attributes(a, b, options);
    let link_attributes = diff_link_attributes(a, b);
    let content = content.map(|pair| diff_content(pair.a, pair.b, options));

    let coverage_pct = if a.is_empty() {
        0.0
    } else {
        urls.common.len() as f64 / a.len() as f64 * 100.0
    };

    let summary = ComparisonSummary {
        pages_a: a.len(),
        pages_b: b.len(),
        common: urls.common.len(),
        only_in_a: urls.only_in_a.len(),
        only_in_b: urls.only_in_b.len(),
        coverage_pct,
        excluded_pages_a: a.excluded_pages(),
        excluded_pages_b: b.excluded_pages(),
        excluded_links_a: a.excluded_links(),
        excluded_links_b: b.excluded_links(),
        status_diffs: status.len(),
        outlink_diffs: outlinks.diffs.len(),
        page_attribute_diffs: page_attributes.total(),
        link_attribute_diffs: link_attributes.total(),
        low_similarity_pages: content.as_ref().map(|c| c.low_similarity_count),
    };

    info!(
        "Compared {} vs {} pages: {} common, {} only in reference, {} only in candidate",
        summary.pages_a, summary.pages_b, summary.common, summary.only_in_a, summary.only_in_b
    );

    ComparisonReport {
        summary,
        urls,
        status,
        outlinks,
        page_attributes,
        link_attributes,
        content,
        collisions_a: a.collisions().to_vec(),
        collisions_b: b.collisions().to_vec(),
    }
}
