// Page and link records as handed over by a crawl export

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indexability {
    Indexable,
    NonIndexable,
    #[default]
    Unknown,
}

impl Indexability {
    /// Maps the labels used by the different exporters onto one vocabulary.
    /// "Indexable" and "Yes" are the same claim; "Non-Indexable" and any
    /// "No, <reason>" label are the same claim; "-" and empty say nothing.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        match label.as_str() {
            "indexable" | "yes" | "true" => Indexability::Indexable,
            "non-indexable" | "non indexable" | "false" => Indexability::NonIndexable,
            l if l == "no" || l.starts_with("no,") || l.starts_with("no ") => {
                Indexability::NonIndexable
            }
            _ => Indexability::Unknown,
        }
    }

    pub fn is_indexable(&self) -> bool {
        matches!(self, Indexability::Indexable)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Indexability::Indexable => "indexable",
            Indexability::NonIndexable => "non_indexable",
            Indexability::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Indexability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    #[default]
    Anchor,
    Script,
    Stylesheet,
    Image,
    Other(String),
}

impl LinkType {
    /// Exporters disagree on naming ("Hyperlink" vs "anchor", "JavaScript"
    /// vs "script", "CSS" vs "stylesheet"); both spellings map to one variant.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        match label.as_str() {
            "anchor" | "hyperlink" => LinkType::Anchor,
            "script" | "javascript" => LinkType::Script,
            "stylesheet" | "css" => LinkType::Stylesheet,
            "image" => LinkType::Image,
            _ => LinkType::Other(label),
        }
    }

    /// Script, stylesheet and image references carry no head/content placement.
    pub fn is_resource(&self) -> bool {
        matches!(
            self,
            LinkType::Script | LinkType::Stylesheet | LinkType::Image
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            LinkType::Anchor => "anchor",
            LinkType::Script => "script",
            LinkType::Stylesheet => "stylesheet",
            LinkType::Image => "image",
            LinkType::Other(label) => label.as_str(),
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkPosition {
    Head,
    Content,
    #[default]
    Unknown,
    /// Any other placement label (navigation, footer, ...) kept verbatim, lowercased.
    Other(String),
}

impl LinkPosition {
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        match label.as_str() {
            "head" => LinkPosition::Head,
            "content" => LinkPosition::Content,
            "" | "unknown" => LinkPosition::Unknown,
            _ => LinkPosition::Other(label),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LinkPosition::Head => "head",
            LinkPosition::Content => "content",
            LinkPosition::Unknown => "unknown",
            LinkPosition::Other(label) => label.as_str(),
        }
    }
}

impl fmt::Display for LinkPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    /// HTTP status, 0 when unknown
    pub status: u16,
    pub content_type: String,
    pub title: String,
    pub h1: String,
    pub h2: String,
    pub canonical_url: String,
    pub word_count: u32,
    pub depth: u32,
    pub indexable: Indexability,
}

impl PageRecord {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub source: String,
    pub target: String,
    pub anchor_text: String,
    pub link_type: LinkType,
    pub follow: bool,
    pub rel: String,
    /// HTML `target` attribute
    pub target_attr: String,
    pub path_type: String,
    pub position: LinkPosition,
}

impl LinkRecord {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            anchor_text: String::new(),
            link_type: LinkType::Anchor,
            follow: true,
            rel: String::new(),
            target_attr: String::new(),
            path_type: String::new(),
            position: LinkPosition::Unknown,
        }
    }
}

/// Per-run facts used only by stability analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub pages_crawled: u64,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}
