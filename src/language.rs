//! Language sections of the mirrored site
//!
//! Each language has its own download listing on the remote site and its own
//! directory locally. The position of a language in the list returned by
//! [`Language::defaults`] is its progress index.

use std::fmt;

/// Compiled-in `(code, seed URL)` pairs
const SEEDS: [(&str, &str); 6] = [
    ("en", "https://koradi.org/en/downloads/"),
    ("es", "https://koradi.org/es/descargas/"),
    ("fr", "https://koradi.org/fr/telechargements/"),
    ("po", "https://koradi.org/po/downloads/"),
    ("it", "https://koradi.org/it/download/"),
    ("de", "https://koradi.org/de/herunterladen/"),
];

/// A language section: its code and the listing page that seeds the crawl
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Language {
    /// Two-letter code, also used as the local directory name
    pub code: String,

    /// Listing page that links to every author of this language
    pub seed_url: String,
}

impl Language {
    pub fn new(code: impl Into<String>, seed_url: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            seed_url: seed_url.into(),
        }
    }

    /// The six languages published by the site, in progress-index order
    pub fn defaults() -> Vec<Language> {
        SEEDS
            .iter()
            .map(|(code, seed)| Language::new(*code, *seed))
            .collect()
    }

    /// Path fragment that every link belonging to this language must contain
    pub fn path_marker(&self) -> String {
        format!("/{}/", self.code)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}
