use std::path::PathBuf;

use clap::Parser;
use progress_tracking::LoggingProgressUpdater;
use zsync_config::{IntegrityPolicy, ZsyncConfig};

use crate::console_progress::ConsoleProgressUpdater;
use crate::constants::{CURRENT_VERSION, ZSYNC_DOWNLOAD_PROGRAM};
use crate::errors::Result;
use crate::sync_task::{SyncOutcome, SyncTask};

/// Bring a local file up to date with a remote one, downloading only the parts that differ.
///
/// The metadata descriptor (a .zsync file) names the remote file, its length and its SHA-1. A range
/// planner compares it against SEED_FILE and decides which bytes can be reused; the rest is fetched
/// with HTTP range requests. Without OUTPUT_FILE the seed is replaced in place once the new file is
/// complete.
///
/// Settings can also be given through ZSYNC_* environment variables, e.g.
/// ZSYNC_PLANNER_COMMAND or ZSYNC_RECONSTRUCTION_INTEGRITY_POLICY.
#[derive(Parser, Debug)]
#[clap(name = ZSYNC_DOWNLOAD_PROGRAM, version = CURRENT_VERSION, verbatim_doc_comment)]
pub struct ZsyncDownloadApp {
    /// URL or local path of the metadata descriptor.
    pub metadata_url: String,

    /// The existing, possibly stale, copy of the file.
    pub seed_file: PathBuf,

    /// Where to write the result. Defaults to replacing SEED_FILE.
    pub output_file: Option<PathBuf>,

    /// Discard the result instead of keeping it if its SHA-1 does not match.
    #[clap(long)]
    pub strict: bool,

    /// Range planner executable, run as `<PLANNER> <descriptor> <seed>`.
    #[clap(long)]
    pub planner: Option<String>,

    /// Do not print download progress; it is only logged, in steps of 10%.
    #[clap(long)]
    pub no_progress: bool,
}

impl ZsyncDownloadApp {
    /// Parses the process arguments. Usage errors exit with status 1; `--help` and `--version`
    /// exit with status 0.
    pub fn parse_or_exit() -> Self {
        Self::try_parse().unwrap_or_else(|e| {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 1 } else { 0 })
        })
    }

    /// The environment configuration with the command line applied on top.
    pub fn config(&self) -> ZsyncConfig {
        let mut config = ZsyncConfig::new();
        if self.strict {
            config.reconstruction.integrity_policy = IntegrityPolicy::Strict;
        }
        if let Some(planner) = &self.planner {
            config.planner.command = planner.clone();
        }
        config
    }

    pub fn into_task(self, config: ZsyncConfig) -> SyncTask {
        let mut task = SyncTask::new(self.metadata_url, &self.seed_file, config);

        if let Some(output_file) = self.output_file {
            task = task.with_output_path(output_file);
        }
        if self.no_progress {
            task = task.with_progress_updater(LoggingProgressUpdater::new(10));
        } else {
            task = task.with_progress_updater(ConsoleProgressUpdater::stderr());
        }
        task
    }

    pub async fn run(self, config: ZsyncConfig) -> Result<SyncOutcome> {
        self.into_task(config).run().await
    }
}
