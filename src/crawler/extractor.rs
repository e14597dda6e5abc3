//! Link extractor: one fetch, one filtered list of hrefs

use crate::crawler::fetcher::{cancellable, fetch_page};
use crate::crawler::parser::{extract_hrefs, LinkPredicate};
use crate::url::resolve_link;
use crate::ArchiverError;
use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Fetches listing pages and pulls matching anchors out of them
///
/// Each call makes exactly one request. There is no retry and no cache.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    client: Client,
    timeout: Duration,
}

impl LinkExtractor {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Returns the raw href values on `url` accepted by `predicate`
    pub async fn extract(
        &self,
        url: &str,
        predicate: LinkPredicate,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, ArchiverError> {
        let body = cancellable(cancel, url, fetch_page(&self.client, url, self.timeout)).await?;
        Ok(extract_hrefs(&body, |href| predicate.matches(href)))
    }

    /// Like [`extract`](Self::extract), but resolves every href against the
    /// page it was found on
    ///
    /// Hrefs that cannot be resolved to an HTTP(S) URL are dropped.
    pub async fn extract_resolved(
        &self,
        url: &str,
        predicate: LinkPredicate,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, ArchiverError> {
        let base = Url::parse(url)?;
        let hrefs = self.extract(url, predicate, cancel).await?;

        Ok(hrefs
            .into_iter()
            .filter_map(|href| {
                let resolved = resolve_link(&href, &base);
                if resolved.is_none() {
                    tracing::debug!("Dropping unresolvable link {:?} found on {}", href, url);
                }
                resolved
            })
            .collect())
    }
}
