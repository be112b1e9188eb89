use std::sync::Arc;

/// A snapshot of transfer progress for one item, plus the increment that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressUpdate {
    pub item_name: Arc<str>,

    /// Total bytes expected to be transferred for this item.
    pub total_bytes: u64,

    /// Bytes transferred so far, including this update's increment.
    pub bytes_completed: u64,
    pub bytes_completion_increment: u64,
}

impl ProgressUpdate {
    /// Fraction complete in `[0, 1]`. An item with nothing to transfer counts as complete.
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            return 1.;
        }
        (self.bytes_completed as f64 / self.total_bytes as f64).min(1.)
    }

    pub fn percent(&self) -> f64 {
        self.fraction() * 100.
    }

    pub fn is_complete(&self) -> bool {
        self.bytes_completed >= self.total_bytes
    }
}
