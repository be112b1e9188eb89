use std::path::{Path, PathBuf};
use std::sync::Arc;

use error_printer::{ErrorPrinter, OptionPrinter};
use file_reconstruction::{
    CommandRangePlanner, DataOutput, FileReconstructionError, FileReconstructor, RangePlanner, ReconstructionSummary,
    build_http_client, sha1_hex_file,
};
use progress_tracking::TrackingProgressUpdater;
use progress_tracking::download_tracking::DownloadTaskUpdater;
use tracing::{info, warn};
use url::Url;
use zsync_config::{IntegrityPolicy, ZsyncConfig};
use zsync_metadata::{MetadataDescriptor, resolve_download_url};

use crate::errors::Result;
use crate::metadata_fetch::fetch_metadata;

/// The result of a successful, verified sync.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub target_length: u64,
    pub download_url: Url,
    pub sha1: String,
    pub summary: ReconstructionSummary,
}

impl SyncOutcome {
    pub fn output_path(&self) -> &Path {
        &self.summary.output_path
    }
}

/// One end-to-end update of a local file from a metadata descriptor: fetch and parse the
/// descriptor, resolve the download URL, ask the planner for a plan, reconstruct, then verify.
pub struct SyncTask {
    metadata_location: String,
    seed_path: PathBuf,
    output_path: Option<PathBuf>,
    config: ZsyncConfig,
    planner: Arc<dyn RangePlanner>,
    progress_updater: Option<Arc<dyn TrackingProgressUpdater>>,
}

impl SyncTask {
    /// Updates `seed_path` in place from the descriptor at `metadata_location`, using the planner
    /// command from `config`.
    pub fn new(metadata_location: impl Into<String>, seed_path: impl AsRef<Path>, config: ZsyncConfig) -> Self {
        let planner = Arc::new(CommandRangePlanner::from_config(&config.planner));
        Self {
            metadata_location: metadata_location.into(),
            seed_path: seed_path.as_ref().to_path_buf(),
            output_path: None,
            config,
            planner,
            progress_updater: None,
        }
    }

    /// Write the result to `output_path` instead of replacing the seed.
    pub fn with_output_path(self, output_path: impl AsRef<Path>) -> Self {
        Self {
            output_path: Some(output_path.as_ref().to_path_buf()),
            ..self
        }
    }

    pub fn with_planner(self, planner: Arc<dyn RangePlanner>) -> Self {
        Self { planner, ..self }
    }

    pub fn with_progress_updater(self, progress_updater: Arc<dyn TrackingProgressUpdater>) -> Self {
        Self {
            progress_updater: Some(progress_updater),
            ..self
        }
    }

    /// Runs the sync. A digest mismatch is returned as an error; under the advisory policy the
    /// mismatching file has been written all the same.
    pub async fn run(self) -> Result<SyncOutcome> {
        let Self {
            metadata_location,
            seed_path,
            output_path,
            config,
            planner,
            progress_updater,
        } = self;

        let http_client = build_http_client(&config.client)?;

        let metadata = fetch_metadata(&metadata_location, &http_client).await?;
        let descriptor = MetadataDescriptor::from_path(metadata.path())?;

        let target_length = descriptor.length()?;
        let sha1 = descriptor.sha1()?.to_owned();
        let download_url = resolve_download_url(metadata.url().as_str(), descriptor.url()?)?;
        let mtime = descriptor
            .mtime()
            .warn_error("Ignoring unparsable MTime in metadata")
            .ok()
            .flatten();

        info!(
            metadata = %metadata.url(),
            target_length,
            %download_url,
            seed = %seed_path.display(),
            "Synchronizing file"
        );

        let plan = planner.plan(metadata.path(), &seed_path).await?;

        let output = DataOutput::for_seed(&seed_path, output_path.as_deref());

        let item_name = descriptor
            .filename()
            .info_none("Metadata has no Filename header; naming the download after its URL")
            .map(str::to_owned)
            .or_else(|| download_url.path_segments().and_then(|s| s.last()).map(str::to_owned))
            .unwrap_or_else(|| metadata_location.clone());

        let mut reconstructor = FileReconstructor::new(target_length, &seed_path, download_url.clone(), plan, output)
            .with_config(&config.reconstruction)
            .with_http_client(http_client)
            .with_mtime(mtime);

        if let Some(inner) = progress_updater {
            reconstructor = reconstructor.with_progress_updater(DownloadTaskUpdater::new(item_name, inner));
        }

        // Under the strict policy the reconstruction checks the digest itself, before anything
        // replaces the seed.
        if config.reconstruction.integrity_policy == IntegrityPolicy::Strict {
            reconstructor = reconstructor.with_expected_sha1(&sha1);
        }

        let summary = reconstructor.run().await?;

        if !summary.verified {
            let actual = sha1_hex_file(&summary.output_path)?;
            if actual != sha1 {
                warn!(
                    output = %summary.output_path.display(),
                    expected = %sha1,
                    actual = %actual,
                    "Output kept despite SHA-1 mismatch"
                );
                return Err(FileReconstructionError::IntegrityMismatch { expected: sha1, actual }.into());
            }
        }

        info!(output = %summary.output_path.display(), sha1 = %sha1, "File verified");

        Ok(SyncOutcome {
            target_length,
            download_url,
            sha1,
            summary,
        })
    }
}
