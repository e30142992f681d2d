//! Cancellable delayed tasks, one per cüz.
//!
//! After a successful name update the row shows "Güncellendi" for a short
//! window. Each window is a spawned task; scheduling a new one for the same
//! cüz aborts the previous task so the window restarts.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::cuz::PartKey;

#[derive(Debug, Default)]
pub struct UpdateTimers {
    handles: HashMap<PartKey, JoinHandle<()>>,
}

impl UpdateTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `task` after `delay`, replacing any task pending for `key`.
    pub fn schedule<F>(&mut self, key: PartKey, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.cancel(key) {
            log::debug!("restarting update window for {:?}", key);
        }
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
        self.handles.insert(key, handle);
    }

    /// Aborts the task for `key`. Returns true when one was still pending.
    pub fn cancel(&mut self, key: PartKey) -> bool {
        match self.handles.remove(&key) {
            Some(handle) => {
                let pending = !handle.is_finished();
                handle.abort();
                pending
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
    }
}

impl Drop for UpdateTimers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const KEY: PartKey = PartKey { hatim: 1, cuz: 7 };
    const UPDATED_WINDOW: Duration = Duration::from_secs(2);

    fn counting_task(counter: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        let counter = Arc::clone(counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_the_window() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut timers = UpdateTimers::new();
        timers.schedule(KEY, UPDATED_WINDOW, counting_task(&counter));

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        // nothing left to cancel once the task ran
        assert!(!timers.cancel(KEY));
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_restarts_the_window() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut timers = UpdateTimers::new();
        timers.schedule(KEY, UPDATED_WINDOW, counting_task(&counter));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        timers.schedule(KEY, UPDATED_WINDOW, counting_task(&counter));

        tokio::time::sleep(Duration::from_millis(1000)).await;
        tokio::task::yield_now().await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(1001)).await;
        tokio::task::yield_now().await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn keys_are_independent() {
        let counter = Arc::new(AtomicUsize::new(0));
        let other = PartKey { hatim: 2, cuz: 7 };
        let mut timers = UpdateTimers::new();
        timers.schedule(KEY, UPDATED_WINDOW, counting_task(&counter));
        timers.schedule(other, UPDATED_WINDOW, counting_task(&counter));

        tokio::time::sleep(Duration::from_millis(2001)).await;
        tokio::task::yield_now().await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_and_drop_abort_pending_tasks() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut timers = UpdateTimers::new();
        timers.schedule(KEY, UPDATED_WINDOW, counting_task(&counter));
        assert!(timers.cancel(KEY));
        assert!(!timers.cancel(KEY));

        let mut dropped = UpdateTimers::new();
        dropped.schedule(KEY, UPDATED_WINDOW, counting_task(&counter));
        drop(dropped);

        tokio::time::sleep(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
