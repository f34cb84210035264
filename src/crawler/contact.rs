//! Website contact discovery
//!
//! Given a business website, the crawler fetches the site root, picks a
//! bounded set of internal pages (contact-like pages first) and extracts
//! emails and social profile links from every page it manages to load.

use super::extract::{extract_contacts, ContactInfo};
use super::fetcher::{default_identities, fetch_with_fallback, BrowserIdentity, PageFetcher};
use super::parser::parse_html;
use crate::url::{extract_domain, normalize_website, root_url};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Default number of simultaneous page fetches per site
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 10;

/// Crawls a single business website for contact data
#[derive(Clone)]
pub struct ContactCrawler {
    fetcher: Arc<dyn PageFetcher>,
    identities: Vec<BrowserIdentity>,
    timeout: Duration,
    max_concurrent_fetches: usize,
}

impl ContactCrawler {
    pub fn new(fetcher: Arc<dyn PageFetcher>, timeout: Duration) -> Self {
        Self {
            fetcher,
            identities: default_identities(),
            timeout,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }

    pub fn with_identities(mut self, identities: Vec<BrowserIdentity>) -> Self {
        self.identities = identities;
        self
    }

    pub fn with_max_concurrent_fetches(mut self, max: usize) -> Self {
        self.max_concurrent_fetches = max.max(1);
        self
    }

    /// Discovers emails and social links on `website`, visiting at most `max_pages` pages
    ///
    /// Never fails: an unparseable URL or a site that cannot be fetched yields
    /// an empty [`ContactInfo`].
    pub async fn discover(&self, website: &str, max_pages: usize) -> ContactInfo {
        let start = match normalize_website(website) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(website, "Skipping website: {}", e);
                return ContactInfo::default();
            }
        };
        let root = root_url(&start);
        let domain = extract_domain(&start).unwrap_or_default();

        let root_body = self.fetch(root.as_str()).await;
        let crawl_set = build_crawl_set(&start, &root, root_body.as_deref(), max_pages);

        tracing::debug!(
            domain = %domain,
            pages = crawl_set.len(),
            "Crawling website for contacts"
        );

        // The root page was already fetched; reuse its body
        let fetches = crawl_set.into_iter().map(|page| {
            let cached = if page == root.as_str() {
                root_body.clone()
            } else {
                None
            };
            async move {
                let body = match cached {
                    Some(body) => Some(body),
                    None => self.fetch(&page).await,
                };
                body.map(|body| contacts_from_page(&page, &body))
            }
        });
        let found: Vec<Option<ContactInfo>> = stream::iter(fetches)
            .buffer_unordered(self.max_concurrent_fetches)
            .collect()
            .await;

        let mut contacts = ContactInfo::default();
        for info in found.into_iter().flatten() {
            contacts.merge(info);
        }

        tracing::debug!(
            domain = %domain,
            emails = contacts.emails.len(),
            "Website crawl finished"
        );
        contacts
    }

    async fn fetch(&self, url: &str) -> Option<String> {
        fetch_with_fallback(self.fetcher.as_ref(), url, &self.identities, self.timeout).await
    }
}

fn contacts_from_page(page: &str, body: &str) -> ContactInfo {
    let mailto = match Url::parse(page) {
        Ok(base) => parse_html(body, &base).mailto_addresses,
        Err(_) => Vec::new(),
    };
    extract_contacts(body, &mailto)
}

/// Orders the pages to visit: the given URL, the root, contact-like links, then the rest
///
/// Duplicates are dropped before truncating to `max_pages`. Without a root
/// body only the given URL and the root are visited.
fn build_crawl_set(start: &Url, root: &Url, root_body: Option<&str>, max_pages: usize) -> Vec<String> {
    let mut pages = vec![start.to_string(), root.to_string()];

    if let Some(body) = root_body {
        let links = parse_html(body, root).internal_links;
        let (contact, other): (Vec<String>, Vec<String>) = links
            .into_iter()
            .partition(|link| link.to_ascii_lowercase().contains("contact"));
        pages.extend(contact);
        pages.extend(other);
    }

    let mut unique: Vec<String> = Vec::with_capacity(pages.len());
    for page in pages {
        if !unique.contains(&page) {
            unique.push(page);
        }
    }
    unique.truncate(max_pages);
    unique
}
