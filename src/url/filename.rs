use url::Url;

/// Derives the local file name for a download link
///
/// The name is the final path segment of the URL, taken verbatim. Query
/// strings and fragments are ignored.
///
/// Returns None when the link has no usable final segment (for example a
/// URL ending in `/`).
///
/// # Examples
///
/// ```
/// use koradi_archiver::url::file_name_from_url;
///
/// assert_eq!(
///     file_name_from_url("https://koradi.org/en/authors/a/talk1.zip"),
///     Some("talk1.zip".to_string())
/// );
/// assert_eq!(file_name_from_url("https://koradi.org/en/authors/a/"), None);
/// ```
pub fn file_name_from_url(link: &str) -> Option<String> {
    let name = match Url::parse(link) {
        Ok(url) => url.path_segments()?.last()?.to_string(),
        Err(_) => {
            let path = link.split(['?', '#']).next().unwrap_or(link);
            path.rsplit('/').next().unwrap_or(path).to_string()
        }
    };

    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name)
    }
}
