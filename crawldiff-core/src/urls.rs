// URL keys and exclusion rules shared by every comparison

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use url::Url;

/// Marker carried by framework-generated cache-busting duplicates (Next.js RSC prefetches).
pub const RSC_MARKER: &str = "_rsc=";

/// Canonicalize a URL into its comparison key.
///
/// Percent-decodes the whole string, then drops trailing `/` characters.
/// Host and scheme casing, query strings, fragments and default ports are
/// left untouched. Malformed escapes are kept as written and invalid UTF-8
/// is replaced, so this never fails.
pub fn normalize(url: &str) -> String {
    let decoded = percent_decode_str(url).decode_utf8_lossy();
    decoded.trim_end_matches('/').to_string()
}

/// True for URLs that never take part in a comparison.
pub fn should_exclude(url: &str) -> bool {
    url.to_lowercase().contains(RSC_MARKER)
}

/// Case-insensitive substring filter over URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlFilter {
    markers: Vec<String>,
}

impl Default for UrlFilter {
    fn default() -> Self {
        Self::new([RSC_MARKER])
    }
}

impl UrlFilter {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(|m| m.as_ref().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    pub fn excludes(&self, url: &str) -> bool {
        if self.markers.is_empty() {
            return false;
        }
        let lowered = url.to_lowercase();
        self.markers.iter().any(|m| lowered.contains(m.as_str()))
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}

/// Host of an absolute URL, if it parses.
pub fn extract_host(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|s| s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_decodes_before_stripping() {
        assert_eq!(normalize("https://example.com/a%2F"), "https://example.com/a");
    }

    #[test]
    fn test_filter_without_markers_keeps_everything() {
        let filter = UrlFilter::new(Vec::<String>::new());
        assert!(!filter.excludes("https://example.com/?_rsc=1"));
    }
}
