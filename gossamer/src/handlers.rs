use std::path::PathBuf;
use std::time::Duration;

use clap::ArgMatches;
use colored::Colorize;
use gossamer_core::{RunOptions, SiteMap, execute_crawl, save_report};
use gossamer_crawler::Strategy;
use url::Url;

// Helper functions for crawl handler

/// Accept a seed URL as typed, trying an http:// prefix when no scheme parses.
pub fn parse_seed_url(raw: &str) -> Option<String> {
    // Try to parse as-is
    if Url::parse(raw).is_ok() {
        return Some(raw.to_string());
    }

    // Try adding http://
    let with_scheme = format!("http://{}", raw);
    if Url::parse(&with_scheme).is_ok() {
        return Some(with_scheme);
    }

    None
}

/// Collapse the three depth flags into a single bound; `None` is unbounded.
pub fn resolve_depth(quick: bool, unbounded: bool, depth: usize) -> Option<usize> {
    if unbounded {
        None
    } else if quick {
        Some(1)
    } else {
        Some(depth)
    }
}

/// Extensions may be given with or without the leading dot.
pub fn normalize_extension(raw: &str) -> String {
    if raw.starts_with('.') {
        raw.to_string()
    } else {
        format!(".{}", raw)
    }
}

/// Expand a leading tilde so `-j ~/maps/site.json` lands under the home dir.
pub fn resolve_export_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

pub async fn handle_crawl(sub_matches: &ArgMatches) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let raw_url = sub_matches.get_one::<String>("url").unwrap();
    let strategy_name = sub_matches.get_one::<String>("strategy").unwrap();
    let depth = *sub_matches.get_one::<usize>("depth").unwrap();
    let quick = sub_matches.get_flag("quick");
    let unbounded = sub_matches.get_flag("unbounded-depth");
    let timeout_secs = *sub_matches.get_one::<u64>("timeout").unwrap();
    let delay_ms = *sub_matches.get_one::<u64>("delay-ms").unwrap();
    let summary = sub_matches.get_flag("summary");
    let seo = sub_matches.get_flag("seo");
    let external = sub_matches.get_flag("external");
    let top = sub_matches.get_one::<usize>("top").copied();
    let json_path = sub_matches.get_one::<String>("json");

    let seed = match parse_seed_url(raw_url) {
        Some(seed) => seed,
        None => {
            eprintln!("✗ Invalid seed URL '{}'", raw_url);
            std::process::exit(1);
        }
    };
    let strategy = match strategy_name.parse::<Strategy>() {
        Ok(strategy) => strategy,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };

    let mut options = RunOptions::new(seed);
    options.strategy = strategy;
    options.max_depth = resolve_depth(quick, unbounded, depth);
    options.allowed_domains = sub_matches
        .get_many::<String>("allow-domain")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    options.disallowed_extensions = sub_matches
        .get_many::<String>("skip-ext")
        .map(|values| values.map(|ext| normalize_extension(ext)).collect())
        .unwrap_or_default();
    options.timeout = Duration::from_secs(timeout_secs);
    options.politeness_delay = Duration::from_millis(delay_ms);

    // Print crawl configuration
    println!("\n🕸️  Crawling {}", options.seed);
    println!("Strategy: {}", options.strategy);
    match options.max_depth {
        Some(depth) => println!("Max depth: {}", depth),
        None => println!("Max depth: unbounded"),
    }
    if !options.allowed_domains.is_empty() {
        println!("Allowed domains: {}", options.allowed_domains.join(", "));
    }
    if !options.disallowed_extensions.is_empty() {
        println!(
            "Skipping extensions: {}",
            options.disallowed_extensions.join(", ")
        );
    }
    println!();

    let outcome = match execute_crawl(options).await {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("✗ Crawl failed: {}", e);
            std::process::exit(1);
        }
    };

    let stats = &outcome.stats;
    println!(
        "\n{}",
        format!(
            "✓ Visited {} pages ({} unique URLs seen) in {}s",
            stats.pages_visited, stats.urls_seen, stats.elapsed_seconds
        )
        .green()
    );
    if stats.blocked_by_robots > 0 {
        println!("Blocked by robots.txt: {}", stats.blocked_by_robots);
    }
    if stats.fetch_failures > 0 {
        println!("Fetch failures: {}", stats.fetch_failures);
    }
    if stats.skipped_non_web > 0 {
        println!("Skipped non-web links: {}", stats.skipped_non_web);
    }
    if stats.cancelled {
        println!("{}", "Interrupted; results below are partial.".yellow());
    }

    let map = SiteMap::new(&outcome.graph);
    let any_view = summary || seo || external || top.is_some();
    if summary || !any_view {
        print!("{}", map.render_summary());
    }
    if let Some(n) = top {
        print!("{}", map.render_top_pages(n));
    }
    if external {
        print!("{}", map.render_external_links());
    }
    if seo {
        print!("{}", map.render_seo_audit());
    }

    if let Some(raw_path) = json_path {
        let path = resolve_export_path(raw_path);
        let json = match map.to_json() {
            Ok(json) => json,
            Err(e) => {
                eprintln!("✗ Failed to serialize crawl graph: {}", e);
                std::process::exit(1);
            }
        };
        if let Err(e) = save_report(&json, &path) {
            eprintln!("✗ Failed to write {}: {}", path.display(), e);
            std::process::exit(1);
        }
        println!("\n✓ Crawl graph saved to {}", path.display());
    }
}
