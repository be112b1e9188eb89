use std::io::Write;
use std::path::{Path, PathBuf};

use futures::StreamExt;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use url::Url;

use crate::errors::{Result, ZsyncClientError};

/// A metadata descriptor available as a local file, together with the URL it came from.
///
/// Remote descriptors are downloaded into a temporary file that lives as long as this value.
#[derive(Debug)]
pub struct FetchedMetadata {
    path: PathBuf,
    url: Url,
    temp_file: Option<NamedTempFile>,
}

impl FetchedMetadata {
    /// Local path of the descriptor, suitable for handing to a range planner.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The URL relative download URLs are resolved against.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn is_remote(&self) -> bool {
        self.temp_file.is_some()
    }
}

/// Makes the descriptor at `location` available locally.
///
/// `location` may be an `http(s)://` URL, which is downloaded, a `file://` URL or a plain path.
pub async fn fetch_metadata(location: &str, client: &reqwest::Client) -> Result<FetchedMetadata> {
    let failed = |reason: String| ZsyncClientError::MetadataFetch {
        location: location.to_owned(),
        reason,
    };

    match Url::parse(location) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => download_metadata(url, client, failed).await,
        Ok(url) if url.scheme() == "file" => {
            let path = url
                .to_file_path()
                .map_err(|_| failed("not a usable local file URL".to_owned()))?;
            local_metadata(path, failed)
        },
        Ok(url) if url.scheme().len() > 1 => Err(failed(format!("unsupported URL scheme {:?}", url.scheme()))),
        // Anything else, including Windows drive letters parsed as a scheme, is a path.
        _ => local_metadata(PathBuf::from(location), failed),
    }
}

fn local_metadata(path: PathBuf, failed: impl Fn(String) -> ZsyncClientError) -> Result<FetchedMetadata> {
    let path = std::path::absolute(&path)?;
    if !path.is_file() {
        return Err(failed("no such file".to_owned()));
    }

    let url = Url::from_file_path(&path).map_err(|_| failed("path cannot be expressed as a URL".to_owned()))?;
    debug!(path = %path.display(), "Using local metadata file");

    Ok(FetchedMetadata {
        path,
        url,
        temp_file: None,
    })
}

async fn download_metadata(
    url: Url,
    client: &reqwest::Client,
    failed: impl Fn(String) -> ZsyncClientError,
) -> Result<FetchedMetadata> {
    info!(%url, "Fetching metadata");

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| failed(format!("request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(failed(format!("HTTP status {status}")));
    }

    // Redirects are followed; relative download URLs are resolved against where we ended up.
    let final_url = response.url().clone();

    let mut download = NamedTempFile::new()?;
    let mut received = 0u64;
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| failed(format!("error reading response body: {e}")))?;
        download.write_all(&chunk)?;
        received += chunk.len() as u64;
    }
    download.flush()?;

    debug!(url = %final_url, bytes = received, path = %download.path().display(), "Metadata downloaded");

    Ok(FetchedMetadata {
        path: download.path().to_path_buf(),
        url: final_url,
        temp_file: Some(download),
    })
}
