use crate::CLAP_STYLING;
use clap::{arg, command};
use std::path::PathBuf;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("crawldiff")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("crawldiff")
        .about("Compare crawler outputs and measure crawl stability")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and progress output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("compare")
                .about(
                    "Compare a reference crawl against a candidate crawl of the same site. \
                Inputs ending in .csv are read as tabular exports, anything else as JSON.",
                )
                .arg(
                    arg!(--"reference-pages" <PATH>)
                        .required(true)
                        .help("Pages export of the reference crawl")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--"candidate-pages" <PATH>)
                        .required(true)
                        .help("Pages export of the candidate crawl")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--"reference-links" <PATH>)
                        .required(false)
                        .help("Outbound links export of the reference crawl")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--"candidate-links" <PATH>)
                        .required(false)
                        .help("Outbound links export of the candidate crawl")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--"reference-content" <DIR>)
                        .required(false)
                        .help("Directory of per-page text files saved by the reference crawler")
                        .value_parser(clap::value_parser!(PathBuf))
                        .requires("candidate-content"),
                )
                .arg(
                    arg!(--"reference-naming" <NAMING>)
                        .required(false)
                        .help("File naming used in the reference content directory")
                        .value_parser(["host-prefixed", "path-flattened"])
                        .default_value("host-prefixed"),
                )
                .arg(
                    arg!(--"candidate-content" <DIR>)
                        .required(false)
                        .help("Directory of per-page text files saved by the candidate crawler")
                        .value_parser(clap::value_parser!(PathBuf))
                        .requires("reference-content"),
                )
                .arg(
                    arg!(--"candidate-naming" <NAMING>)
                        .required(false)
                        .help("File naming used in the candidate content directory")
                        .value_parser(["host-prefixed", "path-flattened"])
                        .default_value("path-flattened"),
                )
                .arg(
                    arg!(-c --"config" <PATH>)
                        .required(false)
                        .help("JSON analysis configuration file")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--"word-count-tolerance" <PERCENT>)
                        .required(false)
                        .help("Report word counts differing by more than this percentage")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    arg!(--"similarity-threshold" <SCORE>)
                        .required(false)
                        .help("Pages below this Jaccard score are flagged as low similarity")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                ),
        )
        .subcommand(
            command!("stability")
                .about(
                    "Measure which URLs appear consistently across repeated crawls of one site. \
                Each snapshot is a pages export or a directory holding internal_all.json and \
                optionally all_outlinks.json.",
                )
                .arg(
                    arg!(<SNAPSHOT> ...)
                        .required(true)
                        .help("Snapshot files or directories, one per run")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-c --"config" <PATH>)
                        .required(false)
                        .help("JSON analysis configuration file")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--"highly-unstable-rate" <RATE>)
                        .required(false)
                        .help("Unstable URLs below this appearance rate are highly unstable")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                ),
        )
}
