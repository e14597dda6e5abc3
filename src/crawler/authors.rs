//! Author crawler: the first phase of the pipeline

use crate::crawler::extractor::LinkExtractor;
use crate::crawler::parser::LinkPredicate;
use crate::language::Language;
use crate::ArchiverError;
use tokio_util::sync::CancellationToken;

/// Lists the author sections linked from a language's seed page
///
/// Links are resolved against the seed URL. A failed fetch is returned as
/// an error; the caller drops the language from the retrieval phase.
pub async fn crawl_authors(
    extractor: &LinkExtractor,
    language: &Language,
    cancel: &CancellationToken,
) -> Result<Vec<String>, ArchiverError> {
    let links = extractor
        .extract_resolved(&language.seed_url, LinkPredicate::Author, cancel)
        .await?;

    tracing::debug!(
        "Found {} author links for {} at {}",
        links.len(),
        language.code,
        language.seed_url
    );

    Ok(links)
}
