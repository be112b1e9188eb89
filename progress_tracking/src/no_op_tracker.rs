use std::sync::Arc;

use async_trait::async_trait;

use crate::{ProgressUpdate, TrackingProgressUpdater};

#[derive(Debug, Default)]
pub struct NoOpProgressUpdater;

impl NoOpProgressUpdater {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {})
    }
}

#[async_trait]
impl TrackingProgressUpdater for NoOpProgressUpdater {
    async fn register_updates(&self, _update: ProgressUpdate) {}
}
