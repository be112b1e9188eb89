use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use progress_tracking::{ProgressUpdate, TrackingProgressUpdater};

/// Prints a single updating progress line to a terminal stream, at most once per tenth of a percent.
pub struct ConsoleProgressUpdater {
    out: Mutex<Box<dyn Write + Send>>,
    last_permille: AtomicU64,
}

impl std::fmt::Debug for ConsoleProgressUpdater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleProgressUpdater")
            .field("last_permille", &self.last_permille)
            .finish()
    }
}

impl ConsoleProgressUpdater {
    pub fn stderr() -> Arc<Self> {
        Self::new(Box::new(std::io::stderr()))
    }

    pub fn new(out: Box<dyn Write + Send>) -> Arc<Self> {
        Arc::new(Self {
            out: Mutex::new(out),
            last_permille: AtomicU64::new(u64::MAX),
        })
    }
}

#[async_trait]
impl TrackingProgressUpdater for ConsoleProgressUpdater {
    async fn register_updates(&self, update: ProgressUpdate) {
        let permille = (update.fraction() * 1000.) as u64;
        if self.last_permille.swap(permille, Ordering::Relaxed) == permille {
            return;
        }

        let Ok(mut out) = self.out.lock() else {
            return;
        };

        let _ = write!(
            out,
            "\r{}: {:5.1}% ({}/{} bytes)",
            update.item_name,
            permille as f64 / 10.,
            update.bytes_completed,
            update.total_bytes
        );
        if update.is_complete() {
            let _ = writeln!(out);
        }
        let _ = out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn update(completed: u64, total: u64) -> ProgressUpdate {
        ProgressUpdate {
            item_name: Arc::from("part.bin"),
            total_bytes: total,
            bytes_completed: completed,
            bytes_completion_increment: 1,
        }
    }

    #[tokio::test]
    async fn test_prints_each_new_tenth_of_a_percent() {
        let buffer = SharedBuffer::default();
        let updater = ConsoleProgressUpdater::new(Box::new(buffer.clone()));

        updater.register_updates(update(1, 20000)).await;
        updater.register_updates(update(2, 20000)).await;
        updater.register_updates(update(20000, 20000)).await;

        let printed = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert_eq!(printed, "\rpart.bin:   0.0% (1/20000 bytes)\rpart.bin: 100.0% (20000/20000 bytes)\n");
    }
}
