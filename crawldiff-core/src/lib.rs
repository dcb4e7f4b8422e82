// Crawl result comparison and consistency engine

pub mod classify;
pub mod compare;
pub mod config;
pub mod error;
pub mod index;
pub mod model;
pub mod report;
pub mod similarity;
pub mod stability;
pub mod text;
pub mod urls;

pub use classify::{ResourceCategory, classify};
pub use compare::{ComparisonReport, ContentPair, compare_datasets};
pub use config::{AnalysisConfig, CompareOptions, StabilityOptions};
pub use error::ConfigError;
pub use index::{CrawlDataset, KeyCollision, build_index, build_index_with};
pub use model::{Indexability, LinkPosition, LinkRecord, LinkType, PageRecord, RunMetadata};
pub use report::ReportFormat;
pub use similarity::{ContentMetrics, compute_content_metrics};
pub use stability::{StabilityReport, analyze_datasets, analyze_stability};
pub use urls::{UrlFilter, normalize};
