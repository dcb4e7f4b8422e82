// Per-URL page text stored as one file per page

use crate::error::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};
use url::Url;

/// How a crawler names the text file it saved for a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentNaming {
    /// `original_<scheme>_<host>_<path>.txt`, slashes flattened to `_`
    #[default]
    HostPrefixed,
    /// `<path?query>.txt` with unsafe characters replaced by `_`,
    /// the site root stored as `index.txt`
    PathFlattened,
}

impl ContentNaming {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "host-prefixed" | "host" => Some(ContentNaming::HostPrefixed),
            "path-flattened" | "path" => Some(ContentNaming::PathFlattened),
            _ => None,
        }
    }

    pub fn file_name(&self, url: &str) -> Option<String> {
        let parsed = Url::parse(url).ok()?;
        Some(match self {
            ContentNaming::HostPrefixed => host_prefixed_name(&parsed),
            ContentNaming::PathFlattened => path_flattened_name(&parsed),
        })
    }
}

const UNSAFE_CHARS: &[char] = &['/', '?', '=', '&', '#', ':', '*', '"', '<', '>', '|', ' '];

fn host_prefixed_name(url: &Url) -> String {
    let host = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    };
    let path = url.path().trim_start_matches('/');
    format!("original_{}_{}_{}.txt", url.scheme(), host, path).replace('/', "_")
}

fn path_flattened_name(url: &Url) -> String {
    let mut full = url.path().to_string();
    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        full.push('?');
        full.push_str(query);
    }
    if full.is_empty() || full == "/" {
        return "index.txt".to_string();
    }

    let mut name = full.trim_start_matches('/').replace(UNSAFE_CHARS, "_");
    if !name.ends_with(".txt") {
        name.push_str(".txt");
    }
    name
}

/// Read the text file for `url` from `dir`, if there is one.
pub fn read_page_text(dir: &Path, naming: ContentNaming, url: &str) -> Option<String> {
    let path = dir.join(naming.file_name(url)?);
    if !path.is_file() {
        return None;
    }
    match fs::read(&path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            warn!("Failed to read content file {}: {}", path.display(), e);
            None
        }
    }
}

/// Page text for every URL in `urls` that has a file in `dir`, keyed by the
/// URL as given. Pages without a file are left out.
pub fn load_content_dir<'u>(
    dir: &Path,
    naming: ContentNaming,
    urls: impl IntoIterator<Item = &'u str>,
) -> Result<HashMap<String, String>> {
    if !dir.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("content directory not found: {}", dir.display()),
        )
        .into());
    }

    let mut content = HashMap::new();
    let mut missing = 0usize;
    for url in urls {
        match read_page_text(dir, naming, url) {
            Some(text) => {
                content.insert(url.to_string(), text);
            }
            None => missing += 1,
        }
    }

    debug!("{} pages without a content file in {}", missing, dir.display());
    info!("Loaded text for {} pages from {}", content.len(), dir.display());
    Ok(content)
}
