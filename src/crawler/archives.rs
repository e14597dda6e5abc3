//! Archive crawler: walks every author page of one language

use crate::crawler::extractor::LinkExtractor;
use crate::crawler::parser::LinkPredicate;
use crate::events::EventSender;
use crate::language::Language;
use crate::state::ErrorRecord;
use crate::url::belongs_to_language;
use tokio_util::sync::CancellationToken;

/// Archive links found for one language, before deduplication
#[derive(Debug, Default)]
pub struct ArchiveCrawl {
    /// In author-iteration order
    pub links: Vec<String>,
    pub errors: Vec<ErrorRecord>,
    pub authors_visited: usize,
    pub authors_skipped: usize,
}

/// Collects archive links from each author page of `language`
///
/// Author links outside the language's `/<code>/` section are skipped.
/// A failed author page is recorded and the crawl moves on to the next.
pub async fn crawl_archives(
    extractor: &LinkExtractor,
    language: &Language,
    author_links: &[String],
    events: &EventSender,
    cancel: &CancellationToken,
) -> ArchiveCrawl {
    let mut crawl = ArchiveCrawl::default();

    for author in author_links {
        if cancel.is_cancelled() {
            crawl.errors.push(ErrorRecord::new(
                language.code.as_str(),
                "Archive crawl cancelled before all author pages were visited",
            ));
            break;
        }

        if !belongs_to_language(author, language) {
            crawl.authors_skipped += 1;
            tracing::debug!(
                "Skipping link {}. It does not match language {}",
                author,
                language.code
            );
            continue;
        }

        crawl.authors_visited += 1;
        match extractor
            .extract_resolved(author, LinkPredicate::Archive, cancel)
            .await
        {
            Ok(links) => {
                tracing::debug!("{} archive links on {}", links.len(), author);
                crawl.links.extend(links);
            }
            Err(e) => {
                events
                    .warn(author.as_str(), format!("Author page skipped: {}", e))
                    .await;
                crawl.errors.push(ErrorRecord::from_error(author.as_str(), &e));
            }
        }
    }

    crawl
}
