//! Email and social-profile extraction from page markup

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// File extensions that look like TLDs in asset names such as `logo@2x.png`
const INVALID_EMAIL_TLDS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "webp", "bmp", "ico", "tiff", "css", "js", "pdf", "doc",
    "docx", "xls", "xlsx", "ppt", "pptx", "zip",
];

/// Local parts at least this long and made only of hex digits are treated as tokens
const HEX_TOKEN_MIN_LEN: usize = 16;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid email regex")
});

static QUOTED_EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)['"]([A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,})['"]"#)
        .expect("valid quoted email regex")
});

static SOCIAL_REGEXES: Lazy<Vec<(SocialPlatform, Regex)>> = Lazy::new(|| {
    SocialPlatform::all()
        .into_iter()
        .map(|platform| {
            let pattern = format!(
                r#"(?i)https?://(?:www\.)?(?:{})/[^\s'"<>]+"#,
                platform.host_pattern()
            );
            (platform, Regex::new(&pattern).expect("valid social regex"))
        })
        .collect()
});

/// Social networks recognised in page content, in output column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SocialPlatform {
    Facebook,
    TwitterX,
    Instagram,
    Linkedin,
}

impl SocialPlatform {
    pub fn all() -> [Self; 4] {
        [Self::Facebook, Self::TwitterX, Self::Instagram, Self::Linkedin]
    }

    /// Output column name
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::TwitterX => "twitter_x",
            Self::Instagram => "instagram",
            Self::Linkedin => "linkedin",
        }
    }

    fn host_pattern(&self) -> &'static str {
        match self {
            Self::Facebook => r"facebook\.com|fb\.com|fb\.me",
            Self::TwitterX => r"twitter\.com|x\.com|t\.co",
            Self::Instagram => r"instagram\.com|instagr\.am",
            Self::Linkedin => r"linkedin\.com|lnkd\.in",
        }
    }
}

impl fmt::Display for SocialPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Profile links per platform; every platform is always present
pub type SocialLinks = BTreeMap<SocialPlatform, BTreeSet<String>>;

/// A social map with an empty set for every platform
pub fn empty_social_links() -> SocialLinks {
    SocialPlatform::all()
        .into_iter()
        .map(|platform| (platform, BTreeSet::new()))
        .collect()
}

/// Contact data found on one or more pages
#[derive(Debug, Clone, PartialEq)]
pub struct ContactInfo {
    pub emails: BTreeSet<String>,
    pub social: SocialLinks,
}

impl Default for ContactInfo {
    fn default() -> Self {
        Self {
            emails: BTreeSet::new(),
            social: empty_social_links(),
        }
    }
}

impl ContactInfo {
    /// Unions another page's findings into this one
    pub fn merge(&mut self, other: ContactInfo) {
        self.emails.extend(other.emails);
        for (platform, links) in other.social {
            self.social.entry(platform).or_default().extend(links);
        }
    }
}

/// Finds plausible contact emails in raw page text
///
/// Combines a conservative address pattern with addresses quoted inside
/// markup or scripts, then drops asset names and hex tokens.
pub fn extract_emails(text: &str) -> BTreeSet<String> {
    let plain = EMAIL_REGEX.find_iter(text).map(|m| m.as_str());
    let quoted = QUOTED_EMAIL_REGEX
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str());

    plain
        .chain(quoted)
        .filter(|email| is_plausible_email(email))
        .map(str::to_string)
        .collect()
}

/// Rejects asset-like suffixes and opaque hexadecimal local parts
pub fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }

    let tld = domain.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    if INVALID_EMAIL_TLDS.contains(&tld.as_str()) {
        return false;
    }

    !is_hex_token(local)
}

fn is_hex_token(local: &str) -> bool {
    local.len() >= HEX_TOKEN_MIN_LEN && local.chars().all(|c| c.is_ascii_hexdigit())
}

/// Finds social profile URLs per platform in raw page text
pub fn extract_social_links(text: &str) -> SocialLinks {
    let mut links = empty_social_links();
    for (platform, regex) in SOCIAL_REGEXES.iter() {
        let found = regex.find_iter(text).map(|m| m.as_str().to_string());
        links.entry(*platform).or_default().extend(found);
    }
    links
}

/// Extracts all contact data from one page body plus its `mailto:` targets
pub fn extract_contacts(body: &str, mailto_addresses: &[String]) -> ContactInfo {
    let mut emails = extract_emails(body);
    emails.extend(
        mailto_addresses
            .iter()
            .filter(|email| is_plausible_email(email))
            .cloned(),
    );

    ContactInfo {
        emails,
        social: extract_social_links(body),
    }
}
