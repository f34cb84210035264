use crate::url::domain::split_registrable;
use crate::UrlError;
use url::Url;

/// Normalizes a business website URL before crawling
///
/// # Normalization Steps
///
/// 1. Trim whitespace; assume `http://` when no scheme is given
/// 2. Parse the URL; reject if malformed or not HTTP(S)
/// 3. Lowercase the host
/// 4. Replace any non-`www` subdomain with `www.` so `shop.example.com` and
///    `blog.example.com` are crawled as the same site
/// 5. Remove the fragment
///
/// IP hosts and ports are left untouched.
///
/// # Examples
///
/// ```
/// use hive_leads::url::normalize_website;
///
/// let url = normalize_website("shop.Example.com/contact").unwrap();
/// assert_eq!(url.as_str(), "http://www.example.com/contact");
/// ```
pub fn normalize_website(raw: &str) -> Result<Url, UrlError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UrlError::Parse("empty URL".to_string()));
    }

    let with_scheme = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else if raw.contains("://") {
        return Err(UrlError::InvalidScheme(raw.to_string()));
    } else {
        format!("http://{}", raw)
    };

    let mut url = Url::parse(&with_scheme).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = url.host_str().ok_or(UrlError::MissingDomain)?.to_lowercase();

    let host = match split_registrable(&host) {
        Some((Some(subdomain), registrable)) if subdomain != "www" => {
            format!("www.{}", registrable)
        }
        _ => host,
    };

    url.set_host(Some(&host))
        .map_err(|e| UrlError::Malformed(format!("Failed to set host: {}", e)))?;
    url.set_fragment(None);

    Ok(url)
}

/// The site root (`scheme://host[:port]/`) of a URL
pub fn root_url(url: &Url) -> Url {
    let mut root = url.clone();
    root.set_path("/");
    root.set_query(None);
    root.set_fragment(None);
    root
}
