pub mod download_tracking;
mod logging_tracker;
mod no_op_tracker;
mod progress_info;

pub use logging_tracker::LoggingProgressUpdater;
pub use no_op_tracker::NoOpProgressUpdater;
pub use progress_info::ProgressUpdate;

/// Receives progress reports. Implementations must be cheap; they are called after every chunk
/// written during a download.
#[async_trait::async_trait]
pub trait TrackingProgressUpdater: std::fmt::Debug + Send + Sync {
    async fn register_updates(&self, update: ProgressUpdate);
}
