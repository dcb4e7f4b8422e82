// JSON crawl exports: page results and outbound links

use crate::error::{Result, SourceError};
use crawldiff_core::model::{Indexability, LinkPosition, LinkRecord, LinkType, PageRecord, RunMetadata};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Pages loaded from a JSON export, with whatever run details it carried.
#[derive(Debug, Clone, Default)]
pub struct PagesExport {
    pub crawl_id: Option<String>,
    pub pages: Vec<PageRecord>,
    pub run_metadata: Option<RunMetadata>,
}

type Object = Map<String, Value>;

fn field<'v>(obj: &'v Object, names: &[&str]) -> Option<&'v Value> {
    names
        .iter()
        .find_map(|name| obj.get(*name).filter(|v| !v.is_null()))
}

fn string_field(obj: &Object, names: &[&str]) -> String {
    match field(obj, names) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Numbers may arrive as JSON numbers or digit strings; anything else is 0.
fn u64_field(obj: &Object, names: &[&str]) -> u64 {
    match field(obj, names) {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn bool_field(obj: &Object, names: &[&str], default: bool) -> bool {
    match field(obj, names) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => true,
            "false" | "no" | "0" => false,
            _ => default,
        },
        Some(Value::Number(n)) => n.as_u64().map(|v| v != 0).unwrap_or(default),
        _ => default,
    }
}

fn indexability_field(obj: &Object) -> Indexability {
    match field(obj, &["indexable", "indexability"]) {
        Some(Value::Bool(true)) => Indexability::Indexable,
        Some(Value::Bool(false)) => Indexability::NonIndexable,
        Some(Value::String(s)) => Indexability::from_label(s),
        _ => Indexability::Unknown,
    }
}

fn page_from_object(obj: &Object) -> PageRecord {
    PageRecord {
        url: string_field(obj, &["url", "address"]),
        status: u64_field(obj, &["status", "statusCode"]).min(u16::MAX as u64) as u16,
        content_type: string_field(obj, &["contentType", "content_type"]),
        title: string_field(obj, &["title"]),
        h1: string_field(obj, &["h1"]),
        h2: string_field(obj, &["h2"]),
        canonical_url: string_field(obj, &["canonicalUrl", "canonical"]),
        word_count: u64_field(obj, &["wordCount", "word_count"]).min(u32::MAX as u64) as u32,
        depth: u64_field(obj, &["depth", "crawlDepth"]).min(u32::MAX as u64) as u32,
        indexable: indexability_field(obj),
    }
}

fn link_from_object(obj: &Object) -> LinkRecord {
    LinkRecord {
        source: string_field(obj, &["sourceUrl", "from", "source"]),
        target: string_field(obj, &["targetUrl", "to", "destination"]),
        anchor_text: string_field(obj, &["linkText", "anchor", "anchorText"]),
        link_type: LinkType::from_label(&string_field(obj, &["linkType", "type"])),
        follow: bool_field(obj, &["follow"], true),
        rel: string_field(obj, &["rel"]),
        target_attr: string_field(obj, &["target"]),
        path_type: string_field(obj, &["pathType"]),
        position: LinkPosition::from_label(&string_field(obj, &["position", "linkPosition"])),
    }
}

/// The record array of an export: either the top-level array or the
/// array stored under one of `keys`.
fn records<'v>(root: &'v Value, keys: &[&str]) -> Result<&'v Vec<Value>> {
    match root {
        Value::Array(items) => Ok(items),
        Value::Object(obj) => match field(obj, keys) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(SourceError::InvalidFormat(format!(
                "expected an array or an object with one of {:?}",
                keys
            ))),
        },
        _ => Err(SourceError::InvalidFormat(
            "expected a JSON array or object".to_string(),
        )),
    }
}

fn objects<'v>(items: &'v [Value], kind: &'static str) -> impl Iterator<Item = &'v Object> {
    items.iter().filter_map(move |item| match item {
        Value::Object(obj) => Some(obj),
        _ => {
            warn!("Skipping non-object {} record", kind);
            None
        }
    })
}

fn run_metadata_from(obj: &Object) -> Option<RunMetadata> {
    let keys = ["pagesCrawled", "durationMs", "timestamp"];
    if !keys.iter().any(|key| field(obj, &[*key]).is_some()) {
        return None;
    }
    let timestamp = string_field(obj, &["timestamp"]);
    Some(RunMetadata {
        pages_crawled: u64_field(obj, &["pagesCrawled"]),
        duration_ms: u64_field(obj, &["durationMs"]),
        timestamp: (!timestamp.is_empty()).then_some(timestamp),
    })
}

pub fn parse_pages_json(content: &str) -> Result<PagesExport> {
    let root: Value = serde_json::from_str(content)?;
    let items = records(&root, &["results", "pages"])?;

    let pages: Vec<PageRecord> = objects(items, "page").map(page_from_object).collect();

    let (crawl_id, run_metadata) = match &root {
        Value::Object(obj) => {
            let id = string_field(obj, &["crawlId", "crawl_id"]);
            ((!id.is_empty()).then_some(id), run_metadata_from(obj))
        }
        _ => (None, None),
    };

    debug!("Parsed {} page records (crawl id {:?})", pages.len(), crawl_id);
    Ok(PagesExport {
        crawl_id,
        pages,
        run_metadata,
    })
}

pub fn parse_links_json(content: &str) -> Result<Vec<LinkRecord>> {
    let root: Value = serde_json::from_str(content)?;
    let items = records(&root, &["links", "results"])?;
    Ok(objects(items, "link").map(link_from_object).collect())
}

pub fn load_pages_json(path: &Path) -> Result<PagesExport> {
    let content = fs::read_to_string(path)?;
    let export = parse_pages_json(&content)?;
    info!("Loaded {} pages from {}", export.pages.len(), path.display());
    Ok(export)
}

pub fn load_links_json(path: &Path) -> Result<Vec<LinkRecord>> {
    let content = fs::read_to_string(path)?;
    let links = parse_links_json(&content)?;
    info!("Loaded {} links from {}", links.len(), path.display());
    Ok(links)
}
