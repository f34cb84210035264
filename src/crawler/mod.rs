//! Crawler module for business website contact discovery
//!
//! This module contains the website-facing side of enrichment:
//! - HTTP fetching with browser-identity fallback
//! - HTML parsing for internal links and `mailto:` targets
//! - Email and social-profile extraction
//! - Per-site crawl planning in [`ContactCrawler`]

mod contact;
mod extract;
mod fetcher;
mod parser;

pub use contact::{ContactCrawler, DEFAULT_MAX_CONCURRENT_FETCHES};
pub use extract::{
    empty_social_links, extract_contacts, extract_emails, extract_social_links,
    is_plausible_email, ContactInfo, SocialLinks, SocialPlatform,
};
pub use fetcher::{
    default_identities, fetch_with_fallback, BrowserIdentity, FetchError, HttpPageFetcher,
    PageFetcher, CHROME_WINDOWS_UA, GOOGLEBOT_UA, SAFARI_MAC_UA,
};
pub use parser::{parse_html, ParsedPage};
