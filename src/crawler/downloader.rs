//! Archive downloader
//!
//! Turns one archive link into one file under the language directory:
//! - Existing files are skipped without touching the network
//! - New files are streamed to disk chunk by chunk
//! - A stalled transfer is abandoned after the configured read timeout
//! - A failed transfer removes its partial file unless configured otherwise

use crate::crawler::fetcher::{cancellable, fetch_error, open_download};
use crate::state::{DownloadOutcome, ErrorRecord};
use crate::url::file_name_from_url;
use crate::ArchiverError;
use reqwest::{Client, Response};
use std::path::Path;
use std::time::Duration;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

/// Result of one download attempt
#[derive(Debug)]
pub enum Attempt {
    /// The attempt finished (skipped, downloaded, or failed) and the next
    /// link can be processed
    Completed(DownloadOutcome),

    /// The language directory itself is gone; nothing more can be written
    /// for this language
    LanguageUnavailable(DownloadOutcome),
}

impl Attempt {
    pub fn outcome(&self) -> &DownloadOutcome {
        match self {
            Self::Completed(outcome) | Self::LanguageUnavailable(outcome) => outcome,
        }
    }

    pub fn into_outcome(self) -> DownloadOutcome {
        match self {
            Self::Completed(outcome) | Self::LanguageUnavailable(outcome) => outcome,
        }
    }
}

/// Streams archives into a language directory
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
    read_timeout: Duration,
    keep_partial_files: bool,
}

impl Downloader {
    pub fn new(client: Client, read_timeout: Duration, keep_partial_files: bool) -> Self {
        Self {
            client,
            read_timeout,
            keep_partial_files,
        }
    }

    /// Handles one archive link
    ///
    /// The local path is `<language_dir>/<last path segment of link>`.
    pub async fn download(
        &self,
        link: &str,
        language_dir: &Path,
        cancel: &CancellationToken,
    ) -> Attempt {
        let file_name = match file_name_from_url(link) {
            Some(name) => name,
            None => {
                return Attempt::Completed(DownloadOutcome::failed(
                    link,
                    language_dir,
                    ErrorRecord::new(link, "Link has no file name to save under"),
                ));
            }
        };
        let local_path = language_dir.join(&file_name);

        // Ensure the containing directory exists before writing
        let parent = local_path.parent().unwrap_or(language_dir);
        if let Err(e) = fs::create_dir_all(parent).await {
            let error = ArchiverError::filesystem(parent, e);
            let outcome =
                DownloadOutcome::failed(link, &local_path, ErrorRecord::from_error(link, &error));
            return if directory_available(language_dir).await {
                Attempt::Completed(outcome)
            } else {
                Attempt::LanguageUnavailable(outcome)
            };
        }

        match fs::try_exists(&local_path).await {
            Ok(true) => {
                tracing::debug!("{} already present, skipping", local_path.display());
                return Attempt::Completed(DownloadOutcome::skipped(link, local_path));
            }
            Ok(false) => {}
            Err(e) => {
                let error = ArchiverError::filesystem(&local_path, e);
                return Attempt::Completed(DownloadOutcome::failed(
                    link,
                    &local_path,
                    ErrorRecord::from_error(link, &error),
                ));
            }
        }

        match self.transfer(link, &local_path, cancel).await {
            Ok(bytes) => {
                tracing::debug!("Wrote {} bytes to {}", bytes, local_path.display());
                Attempt::Completed(DownloadOutcome::downloaded(link, local_path))
            }
            Err(e) => {
                let record = ErrorRecord::from_error(link, &e);
                Attempt::Completed(DownloadOutcome::failed(link, local_path, record))
            }
        }
    }

    /// Fetches `link` and writes its body to `path`, returning the byte count
    async fn transfer(
        &self,
        link: &str,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<u64, ArchiverError> {
        let response = cancellable(
            cancel,
            link,
            open_download(&self.client, link, self.read_timeout),
        )
        .await?;

        let mut file = File::create(path)
            .await
            .map_err(|e| ArchiverError::filesystem(path, e))?;

        match self.stream_body(response, &mut file, link, path, cancel).await {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                // Settle buffered writes before the file is kept or removed
                let _ = file.flush().await;
                drop(file);
                self.discard_partial(path).await;
                Err(e)
            }
        }
    }

    async fn stream_body(
        &self,
        mut response: Response,
        file: &mut File,
        link: &str,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<u64, ArchiverError> {
        let mut written = 0u64;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(ArchiverError::Cancelled {
                        context: link.to_string(),
                    });
                }
                chunk = tokio::time::timeout(self.read_timeout, response.chunk()) => chunk,
            };

            let chunk = match next {
                Err(_) => {
                    return Err(ArchiverError::Fetch {
                        url: link.to_string(),
                        message: format!(
                            "No data received for {}s, transfer abandoned",
                            self.read_timeout.as_secs()
                        ),
                    });
                }
                Ok(Err(e)) => return Err(fetch_error(link, &e)),
                Ok(Ok(None)) => break,
                Ok(Ok(Some(chunk))) => chunk,
            };

            file.write_all(&chunk)
                .await
                .map_err(|e| ArchiverError::filesystem(path, e))?;
            written += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| ArchiverError::filesystem(path, e))?;

        Ok(written)
    }

    async fn discard_partial(&self, path: &Path) {
        if self.keep_partial_files {
            tracing::warn!("Keeping partial file {}", path.display());
            return;
        }

        match fs::remove_file(path).await {
            Ok(()) => tracing::debug!("Removed partial file {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Could not remove partial file {}: {}", path.display(), e),
        }
    }
}

async fn directory_available(dir: &Path) -> bool {
    fs::metadata(dir)
        .await
        .map(|metadata| metadata.is_dir())
        .unwrap_or(false)
}
