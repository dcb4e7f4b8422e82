// Export format detection and format-agnostic loading

use crate::error::Result;
use crate::json::{self, PagesExport};
use crate::tabular;
use crawldiff_core::model::LinkRecord;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    /// `.csv` files are tabular exports; everything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Json,
        }
    }
}

pub fn load_pages(path: &Path) -> Result<PagesExport> {
    match ExportFormat::from_path(path) {
        ExportFormat::Csv => Ok(PagesExport {
            pages: tabular::load_pages_csv(path)?,
            ..Default::default()
        }),
        ExportFormat::Json => json::load_pages_json(path),
    }
}

pub fn load_links(path: &Path) -> Result<Vec<LinkRecord>> {
    match ExportFormat::from_path(path) {
        ExportFormat::Csv => tabular::load_links_csv(path),
        ExportFormat::Json => json::load_links_json(path),
    }
}
