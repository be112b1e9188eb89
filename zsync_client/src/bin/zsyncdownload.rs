use std::process::ExitCode;

use anyhow::{Context, Result};
use zsync_client::CURRENT_VERSION;
use zsync_client::app::ZsyncDownloadApp;
use zsync_logging::{LoggingConfig, init_logging};

fn main() -> ExitCode {
    let app = ZsyncDownloadApp::parse_or_exit();

    match run(app) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

fn run(app: ZsyncDownloadApp) -> Result<()> {
    let config = app.config();
    init_logging(LoggingConfig::from_config(CURRENT_VERSION, &config.log));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    let metadata_url = app.metadata_url.clone();
    let outcome = runtime
        .block_on(app.run(config))
        .with_context(|| format!("failed to synchronize from {metadata_url}"))?;

    let summary = &outcome.summary;
    eprintln!(
        "{}: {} bytes, {} reused, {} downloaded in {} requests, SHA-1 {} verified",
        outcome.output_path().display(),
        outcome.target_length,
        summary.bytes_reused,
        summary.bytes_downloaded,
        summary.download_requests,
        outcome.sha1
    );

    Ok(())
}
