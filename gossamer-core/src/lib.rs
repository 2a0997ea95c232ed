pub mod run;
pub mod sitemap;

pub use run::{RunOptions, execute_crawl, extract_url_path};
pub use sitemap::{LinkTotals, SeoAudit, SiteMap, save_report};

use colored::Colorize;

/// Prints the Gossamer title banner.
pub fn print_banner() {
    let art = r#"
   __ _  ___  ___ ___  __ _ _ __ ___   ___ _ __
  / _` |/ _ \/ __/ __|/ _` | '_ ` _ \ / _ \ '__|
 | (_| | (_) \__ \__ \ (_| | | | | | |  __/ |
  \__, |\___/|___/___/\__,_|_| |_| |_|\___|_|
  |___/"#;
    println!("{}", art.cyan());
    println!(
        "  {}  {}\n",
        "weaving site maps, one thread at a time".magenta(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
