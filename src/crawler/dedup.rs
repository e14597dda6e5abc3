use std::collections::HashSet;

/// Keeps only the first occurrence of each link, preserving order
///
/// Comparison is exact string equality; no URL normalization is applied.
///
/// # Example
///
/// ```
/// use koradi_archiver::crawler::dedup;
///
/// let links = vec!["b.zip", "a.zip", "b.zip"].into_iter().map(String::from);
/// assert_eq!(dedup(links), vec!["b.zip", "a.zip"]);
/// ```
pub fn dedup<I>(links: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter(|link| seen.insert(link.clone()))
        .collect()
}
