pub mod content;
pub mod error;
pub mod export;
pub mod json;
pub mod snapshot;
pub mod tabular;

pub use content::{ContentNaming, load_content_dir};
pub use error::SourceError;
pub use export::{ExportFormat, load_links, load_pages};
pub use json::PagesExport;
pub use snapshot::{Snapshot, load_snapshot, load_snapshots};
