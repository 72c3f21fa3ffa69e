//! Keyed trailing-edge debouncer.
//!
//! Every call to [`Debouncer::schedule`] replaces whatever is pending under the
//! same key and restarts the delay. Only the last action of a burst runs, once,
//! after the delay has elapsed without another call for that key.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Debounces actions by key.
///
/// Cheap to clone; clones share the same timer table. Safe to call from any
/// thread, including the notify backend's callback thread, because timers are
/// spawned on the runtime handle captured at construction.
#[derive(Clone)]
pub struct Debouncer {
    inner: Arc<Inner>,
}

struct Inner {
    delay: Duration,
    timers: Mutex<Timers>,
    runtime: Handle,
    cancel: CancellationToken,
}

#[derive(Default)]
struct Timers {
    next_generation: u64,
    pending: HashMap<String, Pending>,
}

struct Pending {
    generation: u64,
    task: JoinHandle<()>,
}

impl Debouncer {
    /// Create a debouncer firing `delay` after the last call for a key.
    ///
    /// Pending actions are dropped without running once `cancel` fires.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(delay: Duration, cancel: CancellationToken) -> Self {
        Self::with_handle(delay, cancel, Handle::current())
    }

    /// Create a debouncer that spawns its timers on `runtime`.
    pub fn with_handle(delay: Duration, cancel: CancellationToken, runtime: Handle) -> Self {
        Self {
            inner: Arc::new(Inner {
                delay,
                timers: Mutex::new(Timers::default()),
                runtime,
                cancel,
            }),
        }
    }

    /// The quiet period an action waits for before running.
    pub fn delay(&self) -> Duration {
        self.inner.delay
    }

    /// Schedule `action` under `key`, cancelling any action still pending
    /// under the same key.
    pub fn schedule<F>(&self, key: impl Into<String>, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.inner.cancel.is_cancelled() {
            return;
        }

        let key = key.into();
        let mut timers = self.inner.timers.lock();
        timers.next_generation += 1;
        let generation = timers.next_generation;

        let inner = Arc::clone(&self.inner);
        let task_key = key.clone();
        let task = self.inner.runtime.spawn(async move {
            tokio::select! {
                _ = inner.cancel.cancelled() => return,
                _ = tokio::time::sleep(inner.delay) => {}
            }

            // A newer call may have replaced us between the sleep finishing
            // and the abort landing; only the current generation may fire.
            {
                let mut timers = inner.timers.lock();
                match timers.pending.get(&task_key) {
                    Some(current) if current.generation == generation => {
                        timers.pending.remove(&task_key);
                    }
                    _ => return,
                }
            }

            action();
        });

        if let Some(previous) = timers.pending.insert(key, Pending { generation, task }) {
            previous.task.abort();
        }
    }

    /// Number of keys with an action waiting to fire.
    pub fn pending(&self) -> usize {
        self.inner.timers.lock().pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{sleep, Instant};

    const DELAY: Duration = Duration::from_millis(100);

    #[tokio::test(start_paused = true)]
    async fn test_burst_runs_only_last_action_once() {
        let debouncer = Debouncer::new(DELAY, CancellationToken::new());
        let fired = Arc::new(Mutex::new(Vec::new()));

        for i in 0..5 {
            let fired = Arc::clone(&fired);
            debouncer.schedule("reload", move || fired.lock().push(i));
            sleep(Duration::from_millis(50)).await;
        }

        // Last call was 50ms ago; still inside the window.
        sleep(Duration::from_millis(49)).await;
        assert!(fired.lock().is_empty());

        sleep(Duration::from_millis(2)).await;
        assert_eq!(*fired.lock(), vec![4]);

        sleep(DELAY * 3).await;
        assert_eq!(*fired.lock(), vec![4]);
        assert_eq!(debouncer.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_no_earlier_than_delay() {
        let debouncer = Debouncer::new(DELAY, CancellationToken::new());
        let fired_at = Arc::new(Mutex::new(None));

        let scheduled_at = Instant::now();
        let slot = Arc::clone(&fired_at);
        debouncer.schedule("k", move || *slot.lock() = Some(Instant::now()));

        sleep(DELAY * 2).await;
        let fired_at = (*fired_at.lock()).expect("action should have run");
        assert!(fired_at.duration_since(scheduled_at) >= DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_keys_are_independent() {
        let debouncer = Debouncer::new(DELAY, CancellationToken::new());
        let count = Arc::new(AtomicUsize::new(0));

        for key in ["a", "b", "c"] {
            let count = Arc::clone(&count);
            debouncer.schedule(key, move || {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(debouncer.pending(), 3);

        sleep(DELAY + Duration::from_millis(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_calls_each_fire() {
        let debouncer = Debouncer::new(DELAY, CancellationToken::new());
        let count = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let count = Arc::clone(&count);
            debouncer.schedule("reload", move || {
                count.fetch_add(1, Ordering::SeqCst);
            });
            sleep(DELAY * 2).await;
        }

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_drops_pending_action() {
        let cancel = CancellationToken::new();
        let debouncer = Debouncer::new(DELAY, cancel.clone());
        let count = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&count);
        debouncer.schedule("reload", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        cancel.cancel();

        sleep(DELAY * 2).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        // Scheduling after cancellation is a no-op.
        let counter = Arc::clone(&count);
        debouncer.schedule("reload", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        sleep(DELAY * 2).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_schedule_from_foreign_thread() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_time()
            .build()
            .unwrap();
        let debouncer = Debouncer::with_handle(
            Duration::from_millis(10),
            CancellationToken::new(),
            runtime.handle().clone(),
        );
        let (tx, rx) = std::sync::mpsc::channel();

        let worker = debouncer.clone();
        std::thread::spawn(move || {
            worker.schedule("reload", move || {
                let _ = tx.send(());
            });
        })
        .join()
        .unwrap();

        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }
}
