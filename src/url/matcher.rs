use crate::language::Language;

/// Checks whether a discovered link lives under a language's section
///
/// Listing pages occasionally link to other languages' authors; only links
/// whose text contains `/<code>/` are kept for that language.
///
/// # Examples
///
/// ```
/// use koradi_archiver::language::Language;
/// use koradi_archiver::url::belongs_to_language;
///
/// let en = Language::new("en", "https://koradi.org/en/downloads/");
/// assert!(belongs_to_language("https://koradi.org/en/authors/a/", &en));
/// assert!(!belongs_to_language("https://koradi.org/es/autores/a/", &en));
/// ```
pub fn belongs_to_language(link: &str, language: &Language) -> bool {
    link.contains(&language.path_marker())
}
