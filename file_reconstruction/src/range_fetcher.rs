use std::io::Write;

use futures::TryStreamExt;
use progress_tracking::download_tracking::DownloadTaskUpdater;
use reqwest::header::RANGE;
use reqwest::{Client, StatusCode};
use tokio::io::AsyncReadExt;
use tokio_util::io::StreamReader;
use tracing::{debug, warn};
use url::Url;
use zsync_config::{ClientConfig, ReconstructionConfig};

use crate::error::{FileReconstructionError, Result};
use crate::plan::DownloadRange;

/// Builds the HTTP client used for range requests.
pub fn build_http_client(config: impl AsRef<ClientConfig>) -> Result<Client> {
    let config = config.as_ref();
    Client::builder()
        .connect_timeout(config.connect_timeout)
        .read_timeout(config.read_timeout)
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| FileReconstructionError::ConfigurationError(format!("could not build HTTP client: {e}")))
}

/// Fetches inclusive byte ranges of one remote file, one GET request per range.
#[derive(Debug, Clone)]
pub struct RangeFetcher {
    client: Client,
    url: Url,
    chunk_size: usize,
}

impl RangeFetcher {
    pub fn new(client: Client, url: Url, chunk_size: usize) -> Self {
        Self {
            client,
            url,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn from_config(client: Client, url: Url, config: impl AsRef<ReconstructionConfig>) -> Self {
        Self::new(client, url, config.as_ref().download_chunk_size.as_usize())
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Requests `range` and writes exactly `range.len()` bytes of the response body to `output` at
    /// its current position. Progress is reported after every chunk written.
    ///
    /// A server that ignores the `Range` header and answers 200 with the whole file is tolerated:
    /// the bytes before `range.start` are skipped. A body longer than the range is truncated; one
    /// that ends early fails the fetch.
    pub async fn fetch_range(
        &self,
        range: DownloadRange,
        target_length: u64,
        output: &mut impl Write,
        progress: Option<&DownloadTaskUpdater>,
    ) -> Result<u64> {
        let failed = |status: Option<StatusCode>, reason: String| FileReconstructionError::DownloadFailed {
            start: range.start,
            end: range.end,
            length: target_length,
            status: status.map(|s| s.as_u16()),
            reason,
        };

        debug!(url = %self.url, range = %range.header_value(), "Requesting range");

        let response = self
            .client
            .get(self.url.clone())
            .header(RANGE, range.header_value())
            .send()
            .await
            .map_err(|e| failed(None, format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failed(Some(status), format!("HTTP status {status}")));
        }

        let skip = if status == StatusCode::PARTIAL_CONTENT {
            0
        } else {
            warn!(url = %self.url, %status, range = %range.header_value(), "Server ignored the Range header");
            range.start
        };

        let stream = response.bytes_stream().map_err(std::io::Error::other);
        let mut reader = Box::pin(StreamReader::new(stream));

        if skip > 0 {
            let skipped = tokio::io::copy(&mut (&mut reader).take(skip), &mut tokio::io::sink())
                .await
                .map_err(|e| failed(Some(status), format!("error reading response body: {e}")))?;
            if skipped < skip {
                return Err(failed(
                    Some(status),
                    format!("response ended after {skipped} bytes, before the start of the range"),
                ));
            }
        }

        let expected = range.len();
        let mut received: u64 = 0;
        let mut buffer = vec![0u8; self.chunk_size];

        while received < expected {
            let want = (expected - received).min(buffer.len() as u64) as usize;
            let n = reader
                .read(&mut buffer[..want])
                .await
                .map_err(|e| failed(Some(status), format!("error reading response body: {e}")))?;

            if n == 0 {
                return Err(failed(
                    Some(status),
                    format!("response ended after {received} of {expected} bytes"),
                ));
            }

            output.write_all(&buffer[..n])?;
            received += n as u64;

            if let Some(progress) = progress {
                progress.update(n as u64).await;
            }
        }

        debug!(range = %range.header_value(), bytes = received, "Range complete");
        Ok(received)
    }
}
