use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use crawldiff_core::compare::{ContentPair, compare_datasets};
use crawldiff_core::config::AnalysisConfig;
use crawldiff_core::index::{CrawlDataset, build_index_with};
use crawldiff_core::report::{ReportFormat, render_comparison, render_stability, save_report};
use crawldiff_core::stability::analyze_datasets;
use crawldiff_core::urls::UrlFilter;
use crawldiff_sources::content::{ContentNaming, load_content_dir};
use crawldiff_sources::export::{load_links, load_pages};
use crawldiff_sources::snapshot::load_snapshots;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber; `RUST_LOG` overrides the `warn` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Expand a leading `~` in a user-supplied path
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).as_ref())
}

/// Banner goes to stderr; stdout carries only the report.
pub fn print_banner() {
    eprintln!("{}", "═".repeat(60).bright_blue().bold());
    eprintln!(
        "{} {}",
        "  CRAWLDIFF".bright_white().bold(),
        env!("CARGO_PKG_VERSION").dimmed()
    );
    eprintln!("{}", "═".repeat(60).bright_blue().bold());
    eprintln!();
}

fn spinner(quiet: bool) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

fn load_config(path: Option<&PathBuf>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => {
            let path = expand_path(path);
            AnalysisConfig::load(&path)
                .with_context(|| format!("Failed to load config {}", path.display()))
        }
        None => Ok(AnalysisConfig::default()),
    }
}

fn parse_format(matches: &ArgMatches) -> Result<ReportFormat> {
    let raw = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text");
    ReportFormat::from_str(raw).with_context(|| format!("Unknown report format: {}", raw))
}

fn parse_naming(matches: &ArgMatches, id: &str) -> Result<ContentNaming> {
    match matches.get_one::<String>(id) {
        Some(raw) => {
            ContentNaming::from_str(raw).with_context(|| format!("Unknown content naming: {}", raw))
        }
        None => Ok(ContentNaming::default()),
    }
}

/// One side of a comparison as given on the command line
#[derive(Debug, Clone)]
pub struct CrawlInput {
    pub pages: PathBuf,
    pub links: Option<PathBuf>,
    pub content: Option<(PathBuf, ContentNaming)>,
}

#[derive(Debug, Clone)]
pub struct CompareArgs {
    pub reference: CrawlInput,
    pub candidate: CrawlInput,
    pub config: Option<PathBuf>,
    pub word_count_tolerance: Option<f64>,
    pub similarity_threshold: Option<f64>,
    pub format: ReportFormat,
    pub output: Option<PathBuf>,
}

impl CompareArgs {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let side = |prefix: &str| -> Result<CrawlInput> {
            let pages = matches
                .get_one::<PathBuf>(&format!("{}-pages", prefix))
                .with_context(|| format!("--{}-pages is required", prefix))?;
            let content = match matches.get_one::<PathBuf>(&format!("{}-content", prefix)) {
                Some(dir) => Some((dir.clone(), parse_naming(matches, &format!("{}-naming", prefix))?)),
                None => None,
            };
            Ok(CrawlInput {
                pages: pages.clone(),
                links: matches.get_one::<PathBuf>(&format!("{}-links", prefix)).cloned(),
                content,
            })
        };

        Ok(Self {
            reference: side("reference")?,
            candidate: side("candidate")?,
            config: matches.get_one::<PathBuf>("config").cloned(),
            word_count_tolerance: matches.get_one::<f64>("word-count-tolerance").copied(),
            similarity_threshold: matches.get_one::<f64>("similarity-threshold").copied(),
            format: parse_format(matches)?,
            output: matches.get_one::<PathBuf>("output").cloned(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct StabilityArgs {
    pub snapshots: Vec<PathBuf>,
    pub config: Option<PathBuf>,
    pub highly_unstable_rate: Option<f64>,
    pub format: ReportFormat,
    pub output: Option<PathBuf>,
}

impl StabilityArgs {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        Ok(Self {
            snapshots: matches
                .get_many::<PathBuf>("SNAPSHOT")
                .map(|paths| paths.cloned().collect())
                .unwrap_or_default(),
            config: matches.get_one::<PathBuf>("config").cloned(),
            highly_unstable_rate: matches.get_one::<f64>("highly-unstable-rate").copied(),
            format: parse_format(matches)?,
            output: matches.get_one::<PathBuf>("output").cloned(),
        })
    }
}

/// Load and index one side of a comparison, plus its page text if given.
pub fn load_crawl(
    input: &CrawlInput,
    filter: &UrlFilter,
) -> Result<(CrawlDataset, Option<HashMap<String, String>>)> {
    let pages_path = expand_path(&input.pages);
    let export = load_pages(&pages_path)
        .with_context(|| format!("Failed to load pages from {}", pages_path.display()))?;

    let links = match &input.links {
        Some(links) => {
            let links_path = expand_path(links);
            load_links(&links_path)
                .with_context(|| format!("Failed to load links from {}", links_path.display()))?
        }
        None => Vec::new(),
    };

    let mut dataset = build_index_with(export.pages, links, filter);
    if let Some(metadata) = export.run_metadata {
        dataset = dataset.with_run_metadata(metadata);
    }

    let content = match &input.content {
        Some((dir, naming)) => {
            let dir = expand_path(dir);
            let urls = dataset.pages().values().map(|page| page.url.as_str());
            Some(
                load_content_dir(&dir, *naming, urls)
                    .with_context(|| format!("Failed to load content from {}", dir.display()))?,
            )
        }
        None => None,
    };

    Ok((dataset, content))
}

/// Run a comparison end to end and return the rendered report.
pub fn run_compare(args: &CompareArgs, progress: &ProgressBar) -> Result<String> {
    let mut config = load_config(args.config.as_ref())?;
    if let Some(tolerance) = args.word_count_tolerance {
        config.compare.word_count_tolerance_pct = tolerance;
    }
    if let Some(threshold) = args.similarity_threshold {
        config.compare.low_similarity_threshold = threshold;
    }
    config.validate()?;

    let filter = config.compare.url_filter();

    progress.set_message("Loading reference crawl...");
    let (reference, reference_content) = load_crawl(&args.reference, &filter)?;
    progress.set_message("Loading candidate crawl...");
    let (candidate, candidate_content) = load_crawl(&args.candidate, &filter)?;

    let content = match (&reference_content, &candidate_content) {
        (Some(a), Some(b)) => Some(ContentPair { a, b }),
        (None, None) => None,
        _ => bail!("Content directories must be given for both crawls"),
    };

    progress.set_message("Comparing crawls...");
    let report = compare_datasets(&reference, &candidate, content, &config.compare);
    info!(
        "Comparison finished: {} status diffs, {} page attribute diffs",
        report.summary.status_diffs, report.summary.page_attribute_diffs
    );

    Ok(render_comparison(&report, args.format)?)
}

/// Run a stability analysis end to end and return the rendered report.
pub fn run_stability(args: &StabilityArgs, progress: &ProgressBar) -> Result<String> {
    if args.snapshots.len() < 2 {
        bail!("At least two snapshots are needed to measure stability");
    }

    let mut config = load_config(args.config.as_ref())?;
    if let Some(rate) = args.highly_unstable_rate {
        config.stability.highly_unstable_rate = rate;
    }
    config.validate()?;

    progress.set_message(format!("Loading {} snapshots...", args.snapshots.len()));
    let paths: Vec<PathBuf> = args.snapshots.iter().map(|p| expand_path(p)).collect();
    let datasets = load_snapshots(&paths, &config.compare.url_filter())?;

    progress.set_message("Analyzing stability...");
    let report = analyze_datasets(&datasets, &config.stability);

    Ok(render_stability(&report, args.format)?)
}

fn emit(content: &str, output: Option<&PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            let path = expand_path(path);
            save_report(content, &path)
                .with_context(|| format!("Failed to save report to {}", path.display()))?;
            println!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        None => print!("{}", content),
    }
    Ok(())
}

pub fn handle_compare(matches: &ArgMatches, quiet: bool) -> Result<()> {
    let args = CompareArgs::from_matches(matches)?;
    let progress = spinner(quiet)?;
    let result = run_compare(&args, &progress);
    progress.finish_and_clear();
    emit(&result?, args.output.as_ref())
}

pub fn handle_stability(matches: &ArgMatches, quiet: bool) -> Result<()> {
    let args = StabilityArgs::from_matches(matches)?;
    let progress = spinner(quiet)?;
    let result = run_stability(&args, &progress);
    progress.finish_and_clear();
    emit(&result?, args.output.as_ref())
}
