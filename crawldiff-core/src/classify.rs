// Content-type classification

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceCategory {
    Html,
    Image,
    Css,
    Javascript,
    Pdf,
    Font,
    Video,
    Audio,
    Data,
    Other,
}

impl ResourceCategory {
    pub const ALL: [ResourceCategory; 10] = [
        ResourceCategory::Html,
        ResourceCategory::Image,
        ResourceCategory::Css,
        ResourceCategory::Javascript,
        ResourceCategory::Pdf,
        ResourceCategory::Font,
        ResourceCategory::Video,
        ResourceCategory::Audio,
        ResourceCategory::Data,
        ResourceCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceCategory::Html => "html",
            ResourceCategory::Image => "image",
            ResourceCategory::Css => "css",
            ResourceCategory::Javascript => "javascript",
            ResourceCategory::Pdf => "pdf",
            ResourceCategory::Font => "font",
            ResourceCategory::Video => "video",
            ResourceCategory::Audio => "audio",
            ResourceCategory::Data => "data",
            ResourceCategory::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s.to_lowercase())
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Order matters: "text/html" must win before the looser substrings below it.
const CATEGORY_RULES: &[(&[&str], ResourceCategory)] = &[
    (&["text/html"], ResourceCategory::Html),
    (
        &[
            "image/jpeg",
            "image/jpg",
            "image/png",
            "image/gif",
            "image/webp",
            "image/svg",
        ],
        ResourceCategory::Image,
    ),
    (&["text/css", "stylesheet"], ResourceCategory::Css),
    (
        &["javascript", "application/js", "text/js"],
        ResourceCategory::Javascript,
    ),
    (&["application/pdf"], ResourceCategory::Pdf),
    (&["font", "woff"], ResourceCategory::Font),
    (&["video"], ResourceCategory::Video),
    (&["audio"], ResourceCategory::Audio),
    (
        &["application/xml", "text/xml", "application/json"],
        ResourceCategory::Data,
    ),
];

pub fn classify(content_type: &str) -> ResourceCategory {
    let ct = content_type.to_lowercase();
    if ct.trim().is_empty() {
        return ResourceCategory::Other;
    }

    CATEGORY_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| ct.contains(n)))
        .map(|(_, category)| *category)
        .unwrap_or(ResourceCategory::Other)
}
