use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::info;

use crate::{ProgressUpdate, TrackingProgressUpdater};

/// Logs download progress through `tracing` each time another `step_percent` of the item completes.
#[derive(Debug)]
pub struct LoggingProgressUpdater {
    step_percent: u64,
    last_step: AtomicU64,
}

impl LoggingProgressUpdater {
    pub fn new(step_percent: u64) -> Arc<Self> {
        Arc::new(Self {
            step_percent: step_percent.clamp(1, 100),
            last_step: AtomicU64::new(0),
        })
    }
}

#[async_trait]
impl TrackingProgressUpdater for LoggingProgressUpdater {
    async fn register_updates(&self, update: ProgressUpdate) {
        let step = update.percent() as u64 / self.step_percent;
        if self.last_step.fetch_max(step, Ordering::Relaxed) < step {
            info!(
                item = %update.item_name,
                bytes_completed = update.bytes_completed,
                total_bytes = update.total_bytes,
                "download {:.1}% complete",
                update.percent()
            );
        }
    }
}
