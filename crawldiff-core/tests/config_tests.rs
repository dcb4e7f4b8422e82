// Tests for analysis configuration loading and validation

use crawldiff_core::config::{AnalysisConfig, CompareOptions, StabilityOptions};
use crawldiff_core::error::ConfigError;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_defaults() {
    let config = AnalysisConfig::default();
    assert_eq!(config.compare.word_count_tolerance_pct, 10.0);
    assert_eq!(config.compare.excerpt_chars, 100);
    assert_eq!(config.compare.low_similarity_threshold, 0.70);
    assert_eq!(config.compare.sequence_char_cap, 50_000);
    assert_eq!(config.compare.exclude_markers, vec!["_rsc="]);
    assert_eq!(config.compare.low_similarity_limit, 20);
    assert_eq!(config.stability.highly_unstable_rate, 0.80);
    assert_eq!(config.stability.trace_limit, 10);
    assert_eq!(
        config.stability.known_subdomains,
        vec!["workspace", "handbook", "storage"]
    );
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_json_keeps_defaults() {
    let config = AnalysisConfig::from_json_str(
        r#"{"compare": {"word_count_tolerance_pct": 5.0}, "stability": {"trace_limit": 3}}"#,
    )
    .expect("valid config");

    assert_eq!(config.compare.word_count_tolerance_pct, 5.0);
    assert_eq!(config.compare.low_similarity_threshold, 0.70);
    assert_eq!(config.stability.trace_limit, 3);
    assert_eq!(config.stability.highly_unstable_rate, 0.80);
}

#[test]
fn test_empty_object_is_default() {
    let config = AnalysisConfig::from_json_str("{}").expect("valid config");
    assert_eq!(config, AnalysisConfig::default());
}

#[test]
fn test_invalid_threshold_rejected() {
    let result = AnalysisConfig::from_json_str(r#"{"compare": {"low_similarity_threshold": 1.5}}"#);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_negative_tolerance_rejected() {
    let config = AnalysisConfig {
        compare: CompareOptions {
            word_count_tolerance_pct: -1.0,
            ..Default::default()
        },
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_zero_sequence_cap_rejected() {
    let config = AnalysisConfig {
        compare: CompareOptions {
            sequence_char_cap: 0,
            ..Default::default()
        },
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_unstable_rate_out_of_range_rejected() {
    let config = AnalysisConfig {
        stability: StabilityOptions {
            highly_unstable_rate: -0.1,
            ..Default::default()
        },
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_malformed_json_is_json_error() {
    let result = AnalysisConfig::from_json_str("{ not json");
    assert!(matches!(result, Err(ConfigError::Json(_))));
}

#[test]
fn test_load_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, r#"{{"compare": {{"exclude_markers": ["_rsc=", "preview="]}}}}"#)?;

    let config = AnalysisConfig::load(file.path())?;
    assert_eq!(config.compare.exclude_markers.len(), 2);
    assert!(config.compare.url_filter().excludes("https://example.com/?PREVIEW=1"));

    Ok(())
}

#[test]
fn test_load_missing_file_is_io_error() {
    let result = AnalysisConfig::load(std::path::Path::new("/nonexistent/crawldiff.json"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}
