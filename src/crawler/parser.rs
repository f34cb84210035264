//! HTML parser for the contact crawler
//!
//! This module handles parsing HTML content to extract:
//! - Same-site links to crawl next
//! - `mailto:` targets

use scraper::{Html, Selector};
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Absolute links on the same host and port as the page, fragments removed
    pub internal_links: Vec<String>,

    /// Addresses taken from `mailto:` links, query string removed
    pub mailto_addresses: Vec<String>,
}

/// Parses HTML content and extracts internal links and `mailto:` targets
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` resolving to HTTP(S) on the same host and port as `base_url`
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` and `data:` links (scheme matched case-insensitively)
/// - Fragment-only links
/// - Links to other hosts
///
/// # Example
///
/// ```
/// use hive_leads::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<a href="/contact">Contact</a><a href="mailto:hi@example.com?subject=x">Mail</a>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.internal_links, vec!["https://example.com/contact"]);
/// assert_eq!(parsed.mailto_addresses, vec!["hi@example.com"]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);
    let mut parsed = ParsedPage::default();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return parsed;
    };

    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        let lower = href.to_ascii_lowercase();

        if lower.starts_with("mailto:") {
            let address = href[7..].split('?').next().unwrap_or("").trim();
            if !address.is_empty() {
                parsed.mailto_addresses.push(address.to_string());
            }
            continue;
        }

        if let Some(link) = resolve_internal_link(href, &lower, base_url) {
            if !parsed.internal_links.contains(&link) {
                parsed.internal_links.push(link);
            }
        }
    }

    parsed
}

/// Resolves a link href to an absolute same-site URL
///
/// Returns None if the link should be excluded:
/// - javascript:, tel:, data: schemes
/// - Fragment-only or empty hrefs
/// - Invalid URLs
/// - Non-HTTP(S) URLs or other hosts after resolution
fn resolve_internal_link(href: &str, lower: &str, base_url: &Url) -> Option<String> {
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if lower.starts_with("javascript:") || lower.starts_with("tel:") || lower.starts_with("data:") {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }

    if absolute_url.host_str() != base_url.host_str() || absolute_url.port() != base_url.port() {
        return None;
    }

    absolute_url.set_fragment(None);
    Some(absolute_url.to_string())
}
