use scraper::{Html, Selector};
use url::Url;

/// What the parser could pull out of one HTML document.
///
/// `title` and `h1` are `None` when the element is absent, so downstream
/// consumers can tell "no title tag" apart from an empty one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    /// Resolved absolute links in document order, duplicates included.
    pub links: Vec<String>,
    pub title: Option<String>,
    pub h1: Option<String>,
}

/// Parses a document once and extracts links, title and first h1.
pub fn extract_content(html: &str, base_url: &Url) -> PageContent {
    let document = Html::parse_document(html);
    PageContent {
        links: collect_links(&document, base_url),
        title: first_text(&document, "title"),
        h1: first_text(&document, "h1"),
    }
}

/// Extracts every anchor href as an absolute URL.
///
/// Each href is resolved against `base_url` and has its fragment stripped,
/// so `/about`, `about` and `#section` all become canonical absolute URLs.
/// Hrefs that cannot be resolved are dropped. Order and duplicates are
/// preserved; dedup is the frontier's job, not the parser's.
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    collect_links(&document, base_url)
}

/// Applies the crawl boundary rules to a list of absolute links.
///
/// A link survives when its host is allowed (an empty `allowed_domains`
/// allows everything) and its path does not end in a disallowed extension.
/// Links that fail to parse are dropped silently. Order is preserved.
pub fn filter_links(
    links: &[String],
    allowed_domains: &[String],
    disallowed_extensions: &[String],
) -> Vec<String> {
    let mut kept = Vec::new();
    for link in links {
        let Ok(parsed) = Url::parse(link) else {
            continue;
        };
        if !allowed_domains.is_empty() {
            let allowed = parsed
                .host_str()
                .map(|host| allowed_domains.iter().any(|d| d.eq_ignore_ascii_case(host)))
                .unwrap_or(false);
            if !allowed {
                continue;
            }
        }
        let path = parsed.path().to_lowercase();
        if disallowed_extensions
            .iter()
            .any(|ext| path.ends_with(&ext.to_lowercase()))
        {
            continue;
        }
        kept.push(link.clone());
    }
    kept
}

fn collect_links(document: &Html, base_url: &Url) -> Vec<String> {
    let selector = Selector::parse("a[href]").unwrap();
    let mut links = Vec::new();
    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            if let Ok(mut resolved) = base_url.join(href) {
                resolved.set_fragment(None);
                links.push(resolved.to_string());
            }
        }
    }
    links
}

fn first_text(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).unwrap();
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
}
