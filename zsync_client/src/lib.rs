pub mod app;
mod console_progress;
mod constants;
mod errors;
mod metadata_fetch;
mod sync_task;

pub use console_progress::ConsoleProgressUpdater;
pub use constants::CURRENT_VERSION;
pub use errors::{Result, ZsyncClientError};
pub use metadata_fetch::{FetchedMetadata, fetch_metadata};
pub use sync_task::{SyncOutcome, SyncTask};
