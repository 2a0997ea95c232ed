use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use colored::Colorize;
use gossamer_crawler::SiteGraph;

/// Read-only reporting views over a finalized [`SiteGraph`].
///
/// Every `render_*` method builds a `String` rather than printing, so
/// front-ends decide where the output goes and tests can assert on it.
pub struct SiteMap<'a> {
    graph: &'a SiteGraph,
}

/// Sum of links per category across the whole crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkTotals {
    pub http: usize,
    pub mail: usize,
    pub video: usize,
    pub image: usize,
    pub other: usize,
}

impl LinkTotals {
    pub fn total(&self) -> usize {
        self.http + self.mail + self.video + self.image + self.other
    }
}

/// Findings of the SEO audit pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeoAudit {
    pub missing_titles: Vec<String>,
    /// Normalized title text, with every page carrying it, for titles shared
    /// by two or more pages.
    pub duplicate_titles: Vec<(String, Vec<String>)>,
    pub missing_h1s: Vec<String>,
}

impl SeoAudit {
    pub fn is_clean(&self) -> bool {
        self.missing_titles.is_empty()
            && self.duplicate_titles.is_empty()
            && self.missing_h1s.is_empty()
    }
}

impl<'a> SiteMap<'a> {
    pub fn new(graph: &'a SiteGraph) -> Self {
        Self { graph }
    }

    pub fn link_totals(&self) -> LinkTotals {
        let mut totals = LinkTotals::default();
        for page in self.graph.pages() {
            totals.http += page.categorized_links.http_links.len();
            totals.mail += page.categorized_links.mail_links.len();
            totals.video += page.categorized_links.video_links.len();
            totals.image += page.categorized_links.image_links.len();
            totals.other += page.categorized_links.other_links.len();
        }
        totals
    }

    pub fn render_summary(&self) -> String {
        let totals = self.link_totals();
        let mut out = String::new();
        out.push_str(&format!("\n{}\n", "===== Crawl Summary =====".cyan()));
        out.push_str(&format!(
            "{}\n",
            format!("Total pages crawled: {}", self.graph.len()).green()
        ));
        out.push_str(&format!(
            "{}\n",
            format!("Total HTTP(s) links: {}", totals.http).blue()
        ));
        out.push_str(&format!(
            "{}\n",
            format!("Total mailto links: {}", totals.mail).yellow()
        ));
        out.push_str(&format!(
            "{}\n",
            format!("Total video links: {}", totals.video).red()
        ));
        out.push_str(&format!(
            "{}\n",
            format!("Total image links: {}", totals.image).magenta()
        ));
        out.push_str(&format!("Total other links: {}\n", totals.other));
        out.push_str(&format!("{}\n", "==========================".cyan()));
        out
    }

    /// Pages ranked by how many HTTP(s) links they carry, most first.
    /// Ties keep visitation order. At most `n` entries.
    pub fn top_pages_by_links(&self, n: usize) -> Vec<(&'a str, usize)> {
        let mut pages: Vec<(&str, usize)> = self
            .graph
            .pages()
            .map(|page| (page.url.as_str(), page.categorized_links.http_links.len()))
            .collect();
        pages.sort_by(|a, b| b.1.cmp(&a.1));
        pages.truncate(n);
        pages
    }

    pub fn render_top_pages(&self, n: usize) -> String {
        let mut out = String::new();
        out.push_str(&format!("\nTop {} pages by number of HTTP links:\n", n));
        for (url, count) in self.top_pages_by_links(n) {
            out.push_str(&format!("{} -> {} links\n", url, count));
        }
        out
    }

    /// Every HTTP(s) link that is not itself a crawled page, paired with the
    /// page it appears on. Uncrawled same-site pages count too: "external"
    /// means outside the graph, not outside the domain.
    pub fn external_links(&self) -> Vec<(&'a str, &'a str)> {
        let mut found = Vec::new();
        for page in self.graph.pages() {
            for link in &page.categorized_links.http_links {
                if !self.graph.contains(link) {
                    found.push((page.url.as_str(), link.as_str()));
                }
            }
        }
        found
    }

    pub fn render_external_links(&self) -> String {
        let external = self.external_links();
        let mut out = String::new();
        out.push_str("\nExternal links found:\n");
        if external.is_empty() {
            out.push_str("(none)\n");
        }
        for (page, link) in external {
            out.push_str(&format!("{} -> {}\n", page, link));
        }
        out
    }

    /// Flags pages with a missing title, pages sharing a title (compared
    /// case-insensitively after trimming), and pages with a missing h1.
    pub fn seo_audit(&self) -> SeoAudit {
        let mut audit = SeoAudit::default();
        let mut title_order: Vec<String> = Vec::new();
        let mut title_pages: HashMap<String, Vec<String>> = HashMap::new();

        for page in self.graph.pages() {
            let title = page.title.trim();
            if title.is_empty() {
                audit.missing_titles.push(page.url.clone());
            } else {
                let normalized = title.to_lowercase();
                if !title_pages.contains_key(&normalized) {
                    title_order.push(normalized.clone());
                }
                title_pages.entry(normalized).or_default().push(page.url.clone());
            }

            if page.h1.trim().is_empty() {
                audit.missing_h1s.push(page.url.clone());
            }
        }

        for title in title_order {
            let pages = &title_pages[&title];
            if pages.len() > 1 {
                audit.duplicate_titles.push((title, pages.clone()));
            }
        }

        audit
    }

    pub fn render_seo_audit(&self) -> String {
        let audit = self.seo_audit();
        let mut out = String::new();
        out.push_str(&format!(
            "\n{}\n",
            "====== SEO AUDIT REPORT ======".cyan()
        ));

        if audit.missing_titles.is_empty() {
            out.push_str(&format!("{}\n", "All pages have Title Tags.".green()));
        } else {
            out.push_str(&format!(
                "{}\n",
                format!("Missing Title Tags ({} pages):", audit.missing_titles.len()).red()
            ));
            for url in &audit.missing_titles {
                out.push_str(&format!("    - {}\n", url));
            }
        }

        if audit.duplicate_titles.is_empty() {
            out.push_str(&format!("\n{}\n", "No duplicate Title Tags found.".green()));
        } else {
            out.push_str(&format!(
                "\n{}\n",
                format!(
                    "Duplicate Title Tags ({} unique titles):",
                    audit.duplicate_titles.len()
                )
                .yellow()
            ));
            for (title, pages) in &audit.duplicate_titles {
                out.push_str(&format!("    - Title: '{}' appears on:\n", title));
                for url in pages {
                    out.push_str(&format!("        - {}\n", url));
                }
            }
        }

        if audit.missing_h1s.is_empty() {
            out.push_str(&format!("\n{}\n", "All pages have H1 Tags.".green()));
        } else {
            out.push_str(&format!(
                "\n{}\n",
                format!("Missing H1 Tags ({} pages):", audit.missing_h1s.len()).red()
            ));
            for url in &audit.missing_h1s {
                out.push_str(&format!("    - {}\n", url));
            }
        }

        out.push_str(&format!("{}\n", "==============================".cyan()));
        out
    }

    /// Pretty JSON dump of the graph, keyed by URL in visitation order.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self.graph)
    }
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
