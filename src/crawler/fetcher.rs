//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the archiver, including:
//! - Building the shared HTTP client from configuration
//! - GET requests for listing pages, bounded by a per-request deadline
//! - Opening archive downloads for streaming
//! - Error classification into fetch errors
//! - Racing in-flight work against cancellation

use crate::config::HttpConfig;
use crate::ArchiverError;
use reqwest::{Client, Response};
use std::borrow::Cow;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Builds an HTTP client with proper configuration
///
/// The client carries only a connect timeout. Listing pages get a whole-
/// request deadline in [`fetch_page`]; archive transfers are bounded per
/// chunk by the downloader instead, so large files are not cut off.
///
/// # Example
///
/// ```no_run
/// use koradi_archiver::config::HttpConfig;
/// use koradi_archiver::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(config.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a listing page and returns its body as text
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected; only the
/// anchors matter and their targets are ASCII in practice.
///
/// # Errors
///
/// * `ArchiverError::Fetch` - network failure, timeout, or non-success status
/// * `ArchiverError::Parse` - the body stream could not be decoded
pub async fn fetch_page(client: &Client, url: &str, timeout: Duration) -> Result<String, ArchiverError> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| fetch_error(url, &e))?;

    let response = ensure_success(url, response)?;

    let bytes = response.bytes().await.map_err(|e| body_error(url, &e))?;

    let text = String::from_utf8_lossy(&bytes);
    if matches!(text, Cow::Owned(_)) {
        tracing::debug!("{} contains invalid UTF-8, decoded lossily", url);
    }
    Ok(text.into_owned())
}

/// Sends the GET request for an archive and returns the response, ready to
/// be streamed
///
/// `header_timeout` bounds the wait for the status line and headers; the
/// body is bounded separately by the caller.
pub async fn open_download(
    client: &Client,
    url: &str,
    header_timeout: Duration,
) -> Result<Response, ArchiverError> {
    let response = match tokio::time::timeout(header_timeout, client.get(url).send()).await {
        Ok(sent) => sent.map_err(|e| fetch_error(url, &e))?,
        Err(_) => {
            return Err(ArchiverError::Fetch {
                url: url.to_string(),
                message: format!(
                    "No response received within {}s",
                    header_timeout.as_secs()
                ),
            });
        }
    };

    ensure_success(url, response)
}

/// Classifies a failure while reading a listing body
fn body_error(url: &str, error: &reqwest::Error) -> ArchiverError {
    if error.is_decode() {
        ArchiverError::Parse {
            url: url.to_string(),
            message: format!("markup stream could not be decoded: {}", error),
        }
    } else {
        fetch_error(url, error)
    }
}

fn ensure_success(url: &str, response: Response) -> Result<Response, ArchiverError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ArchiverError::Fetch {
            url: url.to_string(),
            message: format!("HTTP {}", status.as_u16()),
        })
    }
}

/// Classifies a reqwest error into a fetch error for `url`
pub fn fetch_error(url: &str, error: &reqwest::Error) -> ArchiverError {
    let message = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        error.to_string()
    };

    ArchiverError::Fetch {
        url: url.to_string(),
        message,
    }
}

/// Runs `work` unless `cancel` fires first
///
/// Cancellation wins ties so a cancelled run stops at its next suspension
/// point.
pub async fn cancellable<T, F>(
    cancel: &CancellationToken,
    context: &str,
    work: F,
) -> Result<T, ArchiverError>
where
    F: Future<Output = Result<T, ArchiverError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ArchiverError::Cancelled {
            context: context.to_string(),
        }),
        result = work => result,
    }
}
