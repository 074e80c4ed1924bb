//! Cooperative cancellation for the blocking aggregation loop.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

#[derive(Clone, Default)]
pub struct Shutdown {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self) -> MutexGuard<'_, bool> {
        // A poisoned flag is still a valid bool.
        self.inner.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn cancel(&self) {
        *self.flag() = true;
        self.inner.1.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.flag()
    }

    /// Sleep for up to `timeout`, waking early on cancellation.
    /// Returns true if cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut cancelled = self.flag();

        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            cancelled = self
                .inner
                .1
                .wait_timeout(cancelled, deadline - now)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|e| e.into_inner().0);
        }

        *cancelled
    }

    /// Cancel this token when the process receives Ctrl-C.
    pub fn cancel_on_interrupt(&self) {
        let shutdown = self.clone();
        thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    warn!("Ctrl-C handler unavailable: {}", e);
                    return;
                }
            };

            runtime.block_on(async {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        info!("interrupt received, stopping after the current tick");
                        shutdown.cancel();
                    }
                    Err(e) => warn!("failed to listen for Ctrl-C: {}", e),
                }
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_times_out_when_not_cancelled() {
        let shutdown = Shutdown::new();
        let started = Instant::now();

        assert!(!shutdown.wait_timeout(Duration::from_millis(20)));
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_cancelled_token_returns_immediately() {
        let shutdown = Shutdown::new();
        shutdown.cancel();

        let started = Instant::now();
        assert!(shutdown.wait_timeout(Duration::from_secs(60)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_cancel_from_other_thread_wakes_waiter() {
        let shutdown = Shutdown::new();
        let remote = shutdown.clone();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });

        assert!(shutdown.wait_timeout(Duration::from_secs(60)));
        assert!(shutdown.is_cancelled());
        handle.join().unwrap();
    }
}
