use crate::CLAP_STYLING;
use clap::{arg, command};

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("gossamer")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("gossamer")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl a site from a seed URL, building a link graph with per-page \
                metrics and categorized outbound links.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The seed URL to crawl (http:// is assumed when no scheme is given)"),
                )
                .arg(
                    arg!(-s --"strategy" <STRATEGY>)
                        .required(false)
                        .help("Traversal order: bfs (level by level) or dfs (one branch at a time)")
                        .value_parser(["bfs", "dfs"])
                        .default_value("bfs"),
                )
                .arg(
                    arg!(-d --"depth" <DEPTH>)
                        .required(false)
                        .help("Maximum link distance from the seed")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("2"),
                )
                .arg(
                    arg!(--"quick")
                        .required(false)
                        .help("Shallow crawl: the seed and its direct links only")
                        .action(clap::ArgAction::SetTrue)
                        .conflicts_with_all(["depth", "unbounded-depth"]),
                )
                .arg(
                    arg!(--"unbounded-depth")
                        .required(false)
                        .help("Crawl without a depth bound (use with --allow-domain)")
                        .action(clap::ArgAction::SetTrue)
                        .conflicts_with("depth"),
                )
                .arg(
                    arg!(--"allow-domain" <DOMAIN>)
                        .required(false)
                        .help("Only follow links on this domain; repeatable (default: unrestricted)")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(--"skip-ext" <EXTENSION>)
                        .required(false)
                        .help("Skip links whose path ends with this extension, e.g. pdf; repeatable")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Per-request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("30"),
                )
                .arg(
                    arg!(--"delay-ms" <MILLISECONDS>)
                        .required(false)
                        .help("Minimum pause between requests (robots.txt Crawl-delay can extend it)")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("1000"),
                )
                .arg(
                    arg!(--"summary")
                        .required(false)
                        .help("Print the crawl summary (default when no view is selected)")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"top" [N])
                        .required(false)
                        .help("Show the top N pages by number of HTTP links")
                        .value_parser(clap::value_parser!(usize))
                        .num_args(0..=1)
                        .default_missing_value("10"),
                )
                .arg(
                    arg!(-e --"external" "List links pointing outside the crawled pages")
                        .required(false)
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"seo")
                        .required(false)
                        .help("Audit crawled pages for missing titles, duplicate titles and missing h1s")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-j --"json" <PATH>)
                        .required(false)
                        .help("Save the crawl graph as pretty-printed JSON to this path"),
                ),
        )
}
