// Snapshots of repeated crawls: one pages export per run, optionally with links

use crate::error::{Result, SourceError};
use crate::export::{load_links, load_pages};
use crawldiff_core::index::{CrawlDataset, build_index_with};
use crawldiff_core::urls::UrlFilter;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// Pages file expected inside a snapshot directory
pub const PAGES_FILE: &str = "internal_all.json";
/// Optional links file inside a snapshot directory
pub const LINKS_FILE: &str = "all_outlinks.json";

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub run_id: String,
    pub dataset: CrawlDataset,
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// File stem, or the parent directory name when the file is a run's
/// `internal_all` export and its stem says nothing about the run.
fn run_label(path: &Path) -> String {
    let label = stem(path);
    if path.is_dir() || label != stem(Path::new(PAGES_FILE)) {
        return label;
    }
    path.parent()
        .and_then(|parent| parent.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or(label)
}

/// Load one run from a pages export file or a snapshot directory.
///
/// The run id is the export's crawl id when it has one, otherwise the
/// file or directory name. A bare `internal_all` export is named after the
/// directory holding it.
pub fn load_snapshot(path: &Path, filter: &UrlFilter) -> Result<Snapshot> {
    let (pages_path, links_path) = if path.is_dir() {
        let pages = path.join(PAGES_FILE);
        if !pages.is_file() {
            return Err(SourceError::InvalidFormat(format!(
                "snapshot directory {} has no {}",
                path.display(),
                PAGES_FILE
            )));
        }
        let links = path.join(LINKS_FILE);
        (pages, links.is_file().then_some(links))
    } else {
        (path.to_path_buf(), None)
    };

    let export = load_pages(&pages_path)?;
    let links = match links_path {
        Some(links_path) => load_links(&links_path)?,
        None => Vec::new(),
    };

    let run_id = export.crawl_id.clone().unwrap_or_else(|| run_label(path));
    let mut dataset = build_index_with(export.pages, links, filter);
    if let Some(metadata) = export.run_metadata {
        dataset = dataset.with_run_metadata(metadata);
    }

    Ok(Snapshot { run_id, dataset })
}

/// Load every run, keyed by run id. Two runs with the same id are an error.
pub fn load_snapshots<P: AsRef<Path>>(
    paths: &[P],
    filter: &UrlFilter,
) -> Result<BTreeMap<String, CrawlDataset>> {
    let mut runs = BTreeMap::new();
    for path in paths {
        let snapshot = load_snapshot(path.as_ref(), filter)?;
        if runs.contains_key(&snapshot.run_id) {
            warn!("Run id {} appears more than once", snapshot.run_id);
            return Err(SourceError::InvalidFormat(format!(
                "duplicate run id {} ({})",
                snapshot.run_id,
                path.as_ref().display()
            )));
        }
        runs.insert(snapshot.run_id, snapshot.dataset);
    }
    info!("Loaded {} snapshots", runs.len());
    Ok(runs)
}
