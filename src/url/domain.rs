use url::{Host, Url};

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use hive_leads::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Splits a domain name into its subdomain and registrable part
///
/// The registrable part is one label above the public suffix, as listed in the
/// Public Suffix List. Returns `None` for IP addresses and for hosts that are
/// themselves a public suffix.
///
/// # Examples
///
/// ```
/// use hive_leads::url::split_registrable;
///
/// assert_eq!(split_registrable("shop.example.com"), Some((Some("shop".to_string()), "example.com".to_string())));
/// assert_eq!(split_registrable("example.co.uk"), Some((None, "example.co.uk".to_string())));
/// ```
pub fn split_registrable(host: &str) -> Option<(Option<String>, String)> {
    let host = host.trim_end_matches('.').to_lowercase();
    if !matches!(Host::parse(&host), Ok(Host::Domain(_))) {
        return None;
    }
    if host.split('.').any(str::is_empty) {
        return None;
    }

    let registrable = psl::domain_str(&host)?.to_string();
    let subdomain = host
        .strip_suffix(registrable.as_str())
        .and_then(|prefix| prefix.strip_suffix('.'))
        .filter(|prefix| !prefix.is_empty())
        .map(str::to_string);

    Some((subdomain, registrable))
}
