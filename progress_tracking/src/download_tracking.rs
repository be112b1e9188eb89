use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use more_asserts::debug_assert_le;

use crate::{NoOpProgressUpdater, ProgressUpdate, TrackingProgressUpdater};

/// Per-download bookkeeping: holds the expected transfer volume and the bytes received so far, and
/// forwards a `ProgressUpdate` to the inner updater after every increment.
#[derive(Debug)]
pub struct DownloadTaskUpdater {
    item_name: Arc<str>,
    total_bytes: AtomicU64,
    bytes_completed: AtomicU64,
    inner: Arc<dyn TrackingProgressUpdater>,
}

impl DownloadTaskUpdater {
    pub fn new(item_name: impl Into<Arc<str>>, inner: Arc<dyn TrackingProgressUpdater>) -> Arc<Self> {
        Arc::new(Self {
            item_name: item_name.into(),
            total_bytes: 0.into(),
            bytes_completed: 0.into(),
            inner,
        })
    }

    /// An updater that reports nowhere; still keeps the counters so completion can be asserted.
    pub fn correctness_verification_tracker() -> Arc<Self> {
        Self::new("", NoOpProgressUpdater::new())
    }

    pub fn set_total(&self, total_bytes: u64) {
        self.total_bytes.store(total_bytes, Ordering::Relaxed);
    }

    pub async fn update(&self, increment: u64) {
        let completed = self.bytes_completed.fetch_add(increment, Ordering::Relaxed) + increment;
        let total_bytes = self.total_bytes.load(Ordering::Relaxed);
        debug_assert_le!(completed, total_bytes);

        self.inner
            .register_updates(ProgressUpdate {
                item_name: self.item_name.clone(),
                total_bytes,
                bytes_completed: completed,
                bytes_completion_increment: increment,
            })
            .await;
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes.load(Ordering::Relaxed)
    }

    pub fn bytes_completed(&self) -> u64 {
        self.bytes_completed.load(Ordering::Relaxed)
    }

    pub fn assert_complete(&self) {
        assert_eq!(self.bytes_completed(), self.total_bytes());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Debug, Default)]
    struct Recorder(Mutex<Vec<ProgressUpdate>>);

    #[async_trait]
    impl TrackingProgressUpdater for Recorder {
        async fn register_updates(&self, update: ProgressUpdate) {
            self.0.lock().unwrap().push(update);
        }
    }

    #[tokio::test]
    async fn test_updates_are_cumulative() {
        let recorder = Arc::new(Recorder::default());
        let updater = DownloadTaskUpdater::new("file.bin", recorder.clone());
        updater.set_total(10);

        updater.update(4).await;
        updater.update(6).await;
        updater.assert_complete();

        let updates = recorder.0.lock().unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].bytes_completed, 4);
        assert_eq!(updates[0].fraction(), 0.4);
        assert_eq!(updates[1].bytes_completed, 10);
        assert_eq!(updates[1].bytes_completion_increment, 6);
        assert_eq!(&*updates[1].item_name, "file.bin");
    }

    #[tokio::test]
    async fn test_verification_tracker_counts() {
        let updater = DownloadTaskUpdater::correctness_verification_tracker();
        updater.set_total(3);
        updater.update(3).await;
        assert_eq!(updater.bytes_completed(), 3);
        updater.assert_complete();
    }
}
