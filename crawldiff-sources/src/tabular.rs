// Tabular (CSV) crawl exports with spreadsheet-style column headers

use crate::error::{Result, SourceError};
use crawldiff_core::model::{Indexability, LinkPosition, LinkRecord, LinkType, PageRecord};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

pub const COL_ADDRESS: &str = "Address";
pub const COL_STATUS: &str = "Status Code";
pub const COL_CONTENT_TYPE: &str = "Content Type";
pub const COL_TITLE: &str = "Title 1";
pub const COL_H1: &str = "H1-1";
pub const COL_H2: &str = "H2-1";
pub const COL_WORD_COUNT: &str = "Word Count";
pub const COL_INDEXABILITY: &str = "Indexability";
pub const COL_DEPTH: &str = "Crawl Depth";
pub const COL_CANONICAL: &str = "Canonical Link Element 1";

pub const COL_SOURCE: &str = "Source";
pub const COL_DESTINATION: &str = "Destination";
pub const COL_ANCHOR: &str = "Anchor";
pub const COL_ALT_TEXT: &str = "Alt Text";
pub const COL_TYPE: &str = "Type";
pub const COL_FOLLOW: &str = "Follow";
pub const COL_TARGET: &str = "Target";
pub const COL_REL: &str = "Rel";
pub const COL_PATH_TYPE: &str = "Path Type";
pub const COL_POSITION: &str = "Link Position";

/// Header name (trimmed, lowercased) -> column index
struct Columns(HashMap<String, usize>);

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        Columns(
            headers
                .iter()
                .enumerate()
                .map(|(idx, h)| (h.trim_start_matches('\u{feff}').trim().to_lowercase(), idx))
                .collect(),
        )
    }

    fn require(&self, name: &str) -> Result<()> {
        if self.0.contains_key(&name.to_lowercase()) {
            Ok(())
        } else {
            Err(SourceError::MissingColumn(name.to_string()))
        }
    }

    fn get<'r>(&self, record: &'r csv::StringRecord, name: &str) -> &'r str {
        self.0
            .get(&name.to_lowercase())
            .and_then(|idx| record.get(*idx))
            .map(str::trim)
            .unwrap_or("")
    }
}

/// Digit-only cells parse; anything else, including blanks, is 0.
fn parse_count<T: std::str::FromStr + Default>(cell: &str) -> T {
    if !cell.is_empty() && cell.bytes().all(|b| b.is_ascii_digit()) {
        cell.parse().unwrap_or_default()
    } else {
        T::default()
    }
}

fn parse_follow(cell: &str) -> bool {
    !cell.eq_ignore_ascii_case("false")
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new().flexible(true).from_reader(input)
}

pub fn read_pages_csv<R: Read>(input: R) -> Result<Vec<PageRecord>> {
    let mut reader = reader(input);
    let columns = Columns::from_headers(reader.headers()?);
    columns.require(COL_ADDRESS)?;

    let mut pages = Vec::new();
    for record in reader.records() {
        let record = record?;
        let url = columns.get(&record, COL_ADDRESS);
        if url.is_empty() {
            debug!("Skipping row without address");
            continue;
        }
        pages.push(PageRecord {
            url: url.to_string(),
            status: parse_count(columns.get(&record, COL_STATUS)),
            content_type: columns.get(&record, COL_CONTENT_TYPE).to_string(),
            title: columns.get(&record, COL_TITLE).to_string(),
            h1: columns.get(&record, COL_H1).to_string(),
            h2: columns.get(&record, COL_H2).to_string(),
            canonical_url: columns.get(&record, COL_CANONICAL).to_string(),
            word_count: parse_count(columns.get(&record, COL_WORD_COUNT)),
            depth: parse_count(columns.get(&record, COL_DEPTH)),
            indexable: Indexability::from_label(columns.get(&record, COL_INDEXABILITY)),
        });
    }
    Ok(pages)
}

pub fn read_links_csv<R: Read>(input: R) -> Result<Vec<LinkRecord>> {
    let mut reader = reader(input);
    let columns = Columns::from_headers(reader.headers()?);
    columns.require(COL_SOURCE)?;
    columns.require(COL_DESTINATION)?;

    let mut links = Vec::new();
    for record in reader.records() {
        let record = record?;
        let source = columns.get(&record, COL_SOURCE);
        let target = columns.get(&record, COL_DESTINATION);
        if source.is_empty() || target.is_empty() {
            debug!("Skipping link row without both endpoints");
            continue;
        }

        let anchor = match columns.get(&record, COL_ANCHOR) {
            "" => columns.get(&record, COL_ALT_TEXT),
            anchor => anchor,
        };

        links.push(LinkRecord {
            source: source.to_string(),
            target: target.to_string(),
            anchor_text: anchor.to_string(),
            link_type: LinkType::from_label(columns.get(&record, COL_TYPE)),
            follow: parse_follow(columns.get(&record, COL_FOLLOW)),
            rel: columns.get(&record, COL_REL).to_string(),
            target_attr: columns.get(&record, COL_TARGET).to_string(),
            path_type: columns.get(&record, COL_PATH_TYPE).to_string(),
            position: LinkPosition::from_label(columns.get(&record, COL_POSITION)),
        });
    }
    Ok(links)
}

pub fn load_pages_csv(path: &Path) -> Result<Vec<PageRecord>> {
    let pages = read_pages_csv(File::open(path)?)?;
    info!("Loaded {} pages from {}", pages.len(), path.display());
    Ok(pages)
}

pub fn load_links_csv(path: &Path) -> Result<Vec<LinkRecord>> {
    let links = read_links_csv(File::open(path)?)?;
    info!("Loaded {} links from {}", links.len(), path.display());
    Ok(links)
}
