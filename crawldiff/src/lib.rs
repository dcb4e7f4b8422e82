// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

pub use handlers::{
    CompareArgs, CrawlInput, StabilityArgs, expand_path, init_tracing, load_crawl, run_compare,
    run_stability,
};
