use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use error_printer::ErrorPrinter;
use progress_tracking::download_tracking::DownloadTaskUpdater;
use tracing::{debug, info, warn};
use url::Url;
use zsync_config::{ClientConfig, IntegrityPolicy, ReconstructionConfig};

use crate::data_writer::{DataOutput, OutputWriter};
use crate::error::{FileReconstructionError, Result};
use crate::plan::{ReconstructionPlan, ReuseRange};
use crate::range_fetcher::{RangeFetcher, build_http_client};

/// What a successful reconstruction did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructionSummary {
    /// Where the reconstructed file now lives.
    pub output_path: PathBuf,
    pub bytes_reused: u64,
    pub bytes_downloaded: u64,
    pub download_requests: u64,
    /// True if the output was checked against an expected SHA-1 and matched.
    pub verified: bool,
}

/// Rebuilds a remote file from ranges of a local seed file plus byte ranges fetched over HTTP,
/// following a `ReconstructionPlan`.
///
/// Everything happens sequentially: the plan is validated, the reuse ranges are copied out of the
/// seed, then each download range is requested and written in plan order. The first failure
/// aborts the run. When rebuilding the seed in place, the seed is only replaced once every range
/// has been applied.
pub struct FileReconstructor {
    target_length: u64,
    seed_path: PathBuf,
    url: Url,
    plan: ReconstructionPlan,
    output: DataOutput,
    config: Arc<ReconstructionConfig>,
    client_config: Arc<ClientConfig>,
    http_client: Option<reqwest::Client>,
    progress_updater: Option<Arc<DownloadTaskUpdater>>,
    expected_sha1: Option<String>,
    mtime: Option<SystemTime>,
}

impl FileReconstructor {
    pub fn new(
        target_length: u64,
        seed_path: impl AsRef<Path>,
        url: Url,
        plan: ReconstructionPlan,
        output: DataOutput,
    ) -> Self {
        Self {
            target_length,
            seed_path: seed_path.as_ref().to_path_buf(),
            url,
            plan,
            output,
            config: Arc::new(ReconstructionConfig::default()),
            client_config: Arc::new(ClientConfig::default()),
            http_client: None,
            progress_updater: {
                #[cfg(debug_assertions)]
                {
                    // Keeps the byte accounting honest in debug builds; release builds skip it.
                    Some(DownloadTaskUpdater::correctness_verification_tracker())
                }
                #[cfg(not(debug_assertions))]
                {
                    None
                }
            },
            expected_sha1: None,
            mtime: None,
        }
    }

    pub fn with_config(self, config: impl AsRef<ReconstructionConfig>) -> Self {
        Self {
            config: Arc::new(config.as_ref().clone()),
            ..self
        }
    }

    pub fn with_client_config(self, client_config: impl AsRef<ClientConfig>) -> Self {
        Self {
            client_config: Arc::new(client_config.as_ref().clone()),
            ..self
        }
    }

    /// Use an existing HTTP client instead of building one from the client config.
    pub fn with_http_client(self, http_client: reqwest::Client) -> Self {
        Self {
            http_client: Some(http_client),
            ..self
        }
    }

    pub fn with_progress_updater(self, progress_updater: Arc<DownloadTaskUpdater>) -> Self {
        Self {
            progress_updater: Some(progress_updater),
            ..self
        }
    }

    /// Check the output against this lowercase hex SHA-1 before finishing. What happens on a
    /// mismatch depends on the configured integrity policy.
    pub fn with_expected_sha1(self, sha1: impl Into<String>) -> Self {
        Self {
            expected_sha1: Some(sha1.into()),
            ..self
        }
    }

    /// Modification time to give the output, if `preserve_mtime` is enabled.
    pub fn with_mtime(self, mtime: Option<SystemTime>) -> Self {
        Self { mtime, ..self }
    }

    /// Runs the reconstruction.
    pub async fn run(self) -> Result<ReconstructionSummary> {
        let Self {
            target_length,
            seed_path,
            url,
            plan,
            output,
            config,
            client_config,
            http_client,
            progress_updater,
            expected_sha1,
            mtime,
        } = self;

        info!(
            target_length,
            seed = %seed_path.display(),
            %url,
            in_place = output.is_in_place(),
            reuse_ranges = plan.reuse.len(),
            download_ranges = plan.download.len(),
            "Starting file reconstruction"
        );

        plan.validate(target_length)?;

        let fetcher = if plan.download.is_empty() {
            None
        } else {
            let client = match http_client {
                Some(client) => client,
                None => build_http_client(&*client_config)?,
            };
            Some(RangeFetcher::from_config(client, url, &*config))
        };

        let writer = OutputWriter::open(&output, &seed_path, target_length, config.staging_memory_limit.as_usize())?;

        let reuse = plan.reuse.clone();
        let seed = seed_path.clone();
        let (mut writer, reused) =
            with_writer_blocking(writer, move |w| copy_reuse_ranges(&reuse, &seed, w)).await?;

        let applied = match reused {
            Ok(bytes_reused) => fetch_downloads(&plan, fetcher.as_ref(), progress_updater.as_deref(), &mut writer)
                .await
                .map(|(downloaded, requests)| (bytes_reused, downloaded, requests)),
            Err(e) => Err(e),
        };

        let (bytes_reused, bytes_downloaded, download_requests) = match applied {
            Ok(counts) => counts,
            Err(e) => {
                // A partial distinct output is removed; a staged rebuild never reached the seed.
                let _ = writer.discard().debug_error("Failed to clean up output after error");
                return Err(e);
            },
        };

        let expected = expected_sha1.clone();
        let policy = config.integrity_policy;
        let mtime = mtime.filter(|_| config.preserve_mtime);
        let output_path =
            tokio::task::spawn_blocking(move || finish_output(writer, expected.as_deref(), policy, mtime))
                .await
                .map_err(std::io::Error::other)??;

        let summary = ReconstructionSummary {
            output_path,
            bytes_reused,
            bytes_downloaded,
            download_requests,
            verified: expected_sha1.is_some(),
        };

        info!(
            output = %summary.output_path.display(),
            bytes_reused = summary.bytes_reused,
            bytes_downloaded = summary.bytes_downloaded,
            download_requests = summary.download_requests,
            verified = summary.verified,
            "File reconstruction completed successfully"
        );

        Ok(summary)
    }
}

/// Runs blocking file work on the blocking pool, handing `writer` back along with the result.
async fn with_writer_blocking<T: Send + 'static>(
    mut writer: OutputWriter,
    work: impl FnOnce(&mut OutputWriter) -> Result<T> + Send + 'static,
) -> Result<(OutputWriter, Result<T>)> {
    let done = tokio::task::spawn_blocking(move || {
        let result = work(&mut writer);
        (writer, result)
    })
    .await
    .map_err(std::io::Error::other)?;
    Ok(done)
}

/// Fetches the download ranges into `writer` in plan order.
/// Returns the bytes downloaded and the number of requests made.
async fn fetch_downloads(
    plan: &ReconstructionPlan,
    fetcher: Option<&RangeFetcher>,
    progress_updater: Option<&DownloadTaskUpdater>,
    writer: &mut OutputWriter,
) -> Result<(u64, u64)> {
    let Some(fetcher) = fetcher else {
        debug!("Nothing to download");
        return Ok((0, 0));
    };

    let total_download = plan.total_download_bytes();
    if let Some(updater) = progress_updater {
        updater.set_total(total_download);
    }

    let target_length = writer.length();
    let mut bytes_downloaded = 0;
    let mut download_requests = 0;

    for range in &plan.download {
        writer.seek_to(range.start)?;
        download_requests += 1;
        bytes_downloaded += fetcher.fetch_range(*range, target_length, writer, progress_updater).await?;
    }

    #[cfg(debug_assertions)]
    {
        if let Some(updater) = progress_updater {
            updater.assert_complete();
        }
    }

    debug!(bytes_downloaded, download_requests, total_download, "All download ranges written");
    Ok((bytes_downloaded, download_requests))
}

fn copy_reuse_ranges(reuse: &[ReuseRange], seed_path: &Path, writer: &mut OutputWriter) -> Result<u64> {
    if reuse.is_empty() {
        return Ok(0);
    }

    let mut seed = File::open(seed_path)?;
    let mut bytes_reused = 0;

    for range in reuse {
        seed.seek(SeekFrom::Start(range.source_offset))?;
        writer.seek_to(range.destination_offset)?;

        let copied = std::io::copy(&mut (&mut seed).take(range.length), writer)?;
        if copied < range.length {
            return Err(FileReconstructionError::MalformedPlan(format!(
                "reuse range {range:?} reads past the end of the seed {}",
                seed_path.display()
            )));
        }
        bytes_reused += copied;
    }

    debug!(bytes_reused, ranges = reuse.len(), "Copied reuse ranges from seed");
    Ok(bytes_reused)
}

/// Checks the finished output against `expected`, then commits or discards it according to
/// `policy`. `mtime` is applied to a committed output that verified.
fn finish_output(
    mut writer: OutputWriter,
    expected: Option<&str>,
    policy: IntegrityPolicy,
    mtime: Option<SystemTime>,
) -> Result<PathBuf> {
    if let Some(expected) = expected {
        let actual = writer.sha1_hex()?;
        if actual != expected {
            let err = FileReconstructionError::IntegrityMismatch {
                expected: expected.to_owned(),
                actual,
            };
            match policy {
                IntegrityPolicy::Strict => {
                    warn!(path = %writer.path().display(), "Discarding output that failed verification");
                    let _ = writer.discard().warn_error("Failed to remove output that failed verification");
                },
                IntegrityPolicy::Advisory => {
                    let path = writer.commit()?;
                    warn!(path = %path.display(), "Keeping output that failed verification");
                },
            }
            return Err(err);
        }
    }

    let output_path = writer.commit()?;

    if let Some(mtime) = mtime {
        let _ = set_modified(&output_path, mtime).warn_error("Failed to set modification time on output");
    }

    Ok(output_path)
}

fn set_modified(path: &Path, mtime: SystemTime) -> std::io::Result<()> {
    File::options().write(true).open(path)?.set_modified(mtime)
}
