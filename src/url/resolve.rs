use url::Url;

/// Resolves an href found on `base_url` to an absolute URL string
///
/// Returns None if the link cannot lead anywhere downloadable:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel: and data: schemes
/// - hrefs that do not resolve to an HTTP(S) URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use koradi_archiver::url::resolve_link;
///
/// let base = Url::parse("https://koradi.org/en/downloads/").unwrap();
/// assert_eq!(
///     resolve_link("/en/authors/a/", &base),
///     Some("https://koradi.org/en/authors/a/".to_string())
/// );
/// assert_eq!(
///     resolve_link("talk1.zip", &base),
///     Some("https://koradi.org/en/downloads/talk1.zip".to_string())
/// );
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url.to_string())
        }
        _ => None,
    }
}
