use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Repeating once-per-second timer handle, owned by the session engine.
///
/// The counter increments while the ticker runs and freezes on `stop`.
/// Stopping is idempotent, and dropping an unstopped ticker aborts its task,
/// so an abandoned session can never leak a running timer into the next one.
#[derive(Debug)]
pub struct Ticker {
    elapsed: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
    stopped: bool,
}

impl Ticker {
    /// Start a real ticker backed by a tokio interval task.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn() -> Self {
        let elapsed = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&elapsed);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // The first tick resolves immediately; consume it so the counter
            // starts moving a full second after start.
            interval.tick().await;
            loop {
                interval.tick().await;
                counter.fetch_add(1, Ordering::Relaxed);
            }
        });
        Self {
            elapsed,
            task: Some(task),
            stopped: false,
        }
    }

    /// A ticker without a background task, driven by `advance`. For
    /// deterministic tests.
    #[must_use]
    pub fn manual() -> Self {
        Self {
            elapsed: Arc::new(AtomicU64::new(0)),
            task: None,
            stopped: false,
        }
    }

    /// Move a manual ticker forward. No effect after `stop`.
    pub fn advance(&mut self, seconds: u64) {
        if !self.stopped {
            self.elapsed.fetch_add(seconds, Ordering::Relaxed);
        }
    }

    /// Whole seconds elapsed so far (frozen once stopped).
    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Stop the ticker and freeze the count, returning the final value.
    pub fn stop(&mut self) -> u64 {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.stopped = true;
        self.elapsed_seconds()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_ticker_counts_and_freezes() {
        let mut ticker = Ticker::manual();
        assert_eq!(ticker.elapsed_seconds(), 0);

        ticker.advance(3);
        ticker.advance(4);
        assert_eq!(ticker.elapsed_seconds(), 7);

        assert_eq!(ticker.stop(), 7);
        ticker.advance(5);
        assert_eq!(ticker.elapsed_seconds(), 7);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut ticker = Ticker::manual();
        ticker.advance(2);
        assert_eq!(ticker.stop(), 2);
        assert_eq!(ticker.stop(), 2);
        assert!(ticker.is_stopped());
    }

    #[tokio::test]
    async fn spawned_ticker_stops_cleanly() {
        let mut ticker = Ticker::spawn();
        let frozen = ticker.stop();
        // Stopped right away, so nothing has ticked and nothing will.
        assert_eq!(frozen, 0);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(ticker.elapsed_seconds(), 0);
    }
}
