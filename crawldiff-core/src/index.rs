// Dataset index: one crawl snapshot keyed by normalized URL

use crate::classify::{ResourceCategory, classify};
use crate::model::{LinkRecord, PageRecord, RunMetadata};
use crate::urls::{UrlFilter, normalize};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, info};

/// A raw URL whose normalized key replaced an earlier record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCollision {
    pub key: String,
    pub replaced: String,
    pub kept: String,
}

#[derive(Debug, Clone, Default)]
pub struct CrawlDataset {
    pages: HashMap<String, PageRecord>,
    links_by_source: HashMap<String, Vec<LinkRecord>>,
    by_category: HashMap<ResourceCategory, HashSet<String>>,
    run_metadata: Option<RunMetadata>,
    excluded_pages: usize,
    excluded_links: usize,
    collisions: Vec<KeyCollision>,
}

/// Index pages and links with the default exclusion rule.
pub fn build_index(pages: Vec<PageRecord>, links: Vec<LinkRecord>) -> CrawlDataset {
    build_index_with(pages, links, &UrlFilter::default())
}

/// Index pages and links, normalizing every key and endpoint.
///
/// Pages whose URL the filter excludes are dropped; links with either
/// endpoint excluded are dropped. Both are counted. When two raw URLs share
/// a key, the later record wins and the collision is recorded.
pub fn build_index_with(
    pages: Vec<PageRecord>,
    links: Vec<LinkRecord>,
    filter: &UrlFilter,
) -> CrawlDataset {
    let mut dataset = CrawlDataset::default();

    for page in pages {
        if page.url.trim().is_empty() {
            debug!("Skipping page record without URL");
            continue;
        }
        if filter.excludes(&page.url) {
            debug!("Excluding page {}", page.url);
            dataset.excluded_pages += 1;
            continue;
        }

        let key = normalize(&page.url);
        let category = classify(&page.content_type);

        if let Some(previous) = dataset.pages.remove(&key) {
            debug!(
                "Key collision on {}: {} replaced by {}",
                key, previous.url, page.url
            );
            let previous_category = classify(&previous.content_type);
            if let Some(set) = dataset.by_category.get_mut(&previous_category) {
                set.remove(&key);
                if set.is_empty() {
                    dataset.by_category.remove(&previous_category);
                }
            }
            dataset.collisions.push(KeyCollision {
                key: key.clone(),
                replaced: previous.url,
                kept: page.url.clone(),
            });
        }

        dataset
            .by_category
            .entry(category)
            .or_default()
            .insert(key.clone());
        dataset.pages.insert(key, page);
    }

    for mut link in links {
        if link.source.trim().is_empty() || link.target.trim().is_empty() {
            debug!("Skipping link record without both endpoints");
            continue;
        }
        if filter.excludes(&link.source) || filter.excludes(&link.target) {
            dataset.excluded_links += 1;
            continue;
        }

        link.source = normalize(&link.source);
        link.target = normalize(&link.target);
        dataset
            .links_by_source
            .entry(link.source.clone())
            .or_default()
            .push(link);
    }

    info!(
        "Indexed {} pages ({} excluded, {} collisions) and {} link sources ({} links excluded)",
        dataset.pages.len(),
        dataset.excluded_pages,
        dataset.collisions.len(),
        dataset.links_by_source.len(),
        dataset.excluded_links
    );

    dataset
}

impl CrawlDataset {
    pub fn with_run_metadata(mut self, metadata: RunMetadata) -> Self {
        self.run_metadata = Some(metadata);
        self
    }

    pub fn pages(&self) -> &HashMap<String, PageRecord> {
        &self.pages
    }

    pub fn page(&self, key: &str) -> Option<&PageRecord> {
        self.pages.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pages.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn links_by_source(&self) -> &HashMap<String, Vec<LinkRecord>> {
        &self.links_by_source
    }

    /// Outbound links recorded for a source page; empty when none were exported.
    pub fn outlinks(&self, source_key: &str) -> &[LinkRecord] {
        self.links_by_source
            .get(source_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn link_count(&self) -> usize {
        self.links_by_source.values().map(Vec::len).sum()
    }

    pub fn by_category(&self) -> &HashMap<ResourceCategory, HashSet<String>> {
        &self.by_category
    }

    pub fn category_urls(&self, category: ResourceCategory) -> Option<&HashSet<String>> {
        self.by_category.get(&category)
    }

    pub fn run_metadata(&self) -> Option<&RunMetadata> {
        self.run_metadata.as_ref()
    }

    pub fn excluded_pages(&self) -> usize {
        self.excluded_pages
    }

    pub fn excluded_links(&self) -> usize {
        self.excluded_links
    }

    pub fn collisions(&self) -> &[KeyCollision] {
        &self.collisions
    }

    /// Sorted page keys, the snapshot form used by stability analysis.
    pub fn url_set(&self) -> BTreeSet<String> {
        self.pages.keys().cloned().collect()
    }
}
