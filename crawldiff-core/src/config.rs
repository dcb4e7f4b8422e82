// Analysis configuration

use crate::error::{ConfigError, Result};
use crate::similarity::DEFAULT_SEQUENCE_CAP;
use crate::urls::{RSC_MARKER, UrlFilter};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tunables for the differential comparator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    /// Word counts differing by more than this percentage are reported
    pub word_count_tolerance_pct: f64,
    /// Characters of title/h1 kept on each side of a diff
    pub excerpt_chars: usize,
    /// Pages whose Jaccard score falls below this are low-similarity
    pub low_similarity_threshold: f64,
    /// Characters per text fed into sequence matching
    pub sequence_char_cap: usize,
    /// Case-insensitive substrings marking URLs to exclude
    pub exclude_markers: Vec<String>,
    /// How many low-similarity pages the content summary keeps
    pub low_similarity_limit: usize,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            word_count_tolerance_pct: 10.0,
            excerpt_chars: 100,
            low_similarity_threshold: 0.70,
            sequence_char_cap: DEFAULT_SEQUENCE_CAP,
            exclude_markers: vec![RSC_MARKER.to_string()],
            low_similarity_limit: 20,
        }
    }
}

impl CompareOptions {
    pub fn url_filter(&self) -> UrlFilter {
        UrlFilter::new(&self.exclude_markers)
    }
}

/// Tunables for the stability analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityOptions {
    /// Path fragments that mark a URL as an HTML page
    pub html_path_markers: Vec<String>,
    /// First host labels that get their own bucket; everything else is "main"
    pub known_subdomains: Vec<String>,
    /// Unstable URLs below this appearance rate are highly unstable
    pub highly_unstable_rate: f64,
    /// How many highly unstable URLs get an inbound-link trace
    pub trace_limit: usize,
}

impl Default for StabilityOptions {
    fn default() -> Self {
        Self {
            html_path_markers: [
                "/blog/",
                "/tools/",
                "/privacy",
                "/terms",
                "/refund",
                "/pricing",
                "/newsletter",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            known_subdomains: ["workspace", "handbook", "storage"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            highly_unstable_rate: 0.80,
            trace_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub compare: CompareOptions,
    pub stability: StabilityOptions,
}

impl AnalysisConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: AnalysisConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        let compare = &self.compare;
        if !compare.word_count_tolerance_pct.is_finite() || compare.word_count_tolerance_pct < 0.0
        {
            return Err(ConfigError::Invalid(format!(
                "word_count_tolerance_pct must be a non-negative number, got {}",
                compare.word_count_tolerance_pct
            )));
        }
        if !(0.0..=1.0).contains(&compare.low_similarity_threshold) {
            return Err(ConfigError::Invalid(format!(
                "low_similarity_threshold must be within [0, 1], got {}",
                compare.low_similarity_threshold
            )));
        }
        if compare.sequence_char_cap == 0 {
            return Err(ConfigError::Invalid(
                "sequence_char_cap must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.stability.highly_unstable_rate) {
            return Err(ConfigError::Invalid(format!(
                "highly_unstable_rate must be within [0, 1], got {}",
                self.stability.highly_unstable_rate
            )));
        }
        Ok(())
    }
}
