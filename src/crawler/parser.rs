//! Anchor extraction from listing pages
//!
//! Only `<a href>` values are considered. Values are returned exactly as they
//! appear in the markup, in document order, and filtered by a predicate.

use scraper::{Html, Selector};

/// Which kind of link a listing page is being searched for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkPredicate {
    /// Author sections: hrefs ending in `/`
    Author,

    /// Downloadable archives: hrefs ending in `.zip`, or the legacy `-zip`
    /// form still used by some older uploads
    Archive,
}

impl LinkPredicate {
    pub fn matches(&self, href: &str) -> bool {
        match self {
            Self::Author => href.ends_with('/'),
            Self::Archive => href.ends_with(".zip") || href.ends_with("-zip"),
        }
    }
}

/// Extracts every anchor href accepted by `predicate`, in document order
///
/// An empty result is valid. Malformed tag soup is recovered by the HTML
/// parser rather than rejected.
///
/// # Example
///
/// ```
/// use koradi_archiver::crawler::{extract_hrefs, LinkPredicate};
///
/// let html = r#"<a href="/en/authors/a/">A</a><a href="talk1.zip">Talk</a>"#;
/// let archives = extract_hrefs(html, |href| LinkPredicate::Archive.matches(href));
/// assert_eq!(archives, vec!["talk1.zip"]);
/// ```
pub fn extract_hrefs<P>(html: &str, predicate: P) -> Vec<String>
where
    P: Fn(&str) -> bool,
{
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if predicate(href) {
                    links.push(href.to_string());
                }
            }
        }
    }

    links
}
