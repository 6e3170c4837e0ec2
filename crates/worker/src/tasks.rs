//! Task extension: keep the worker alive until background work settles.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;

/// Handle for work that must finish after its event has already answered.
///
/// Tasks are spawned immediately; the host calls [`settle`](Self::settle)
/// before tearing the worker down. Failures inside a task are the task's own
/// business: it is expected to log and swallow them.
#[derive(Debug, Clone, Default)]
pub struct WaitUntil {
    pending: Arc<Mutex<Vec<(String, JoinHandle<()>)>>>,
}

impl WaitUntil {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `task` and hold the worker open until it completes.
    pub fn extend<F>(&self, label: impl Into<String>, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((label.into(), handle));
    }

    /// Number of registered tasks that have not finished yet.
    pub fn pending(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .count()
    }

    /// Await every registered task, including ones registered while
    /// settling. Returns how many tasks were awaited.
    pub async fn settle(&self) -> usize {
        let mut settled = 0;
        loop {
            let batch = std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner));
            if batch.is_empty() {
                return settled;
            }
            for (label, handle) in batch {
                if let Err(e) = handle.await {
                    tracing::warn!(task = %label, "background task did not complete: {}", e);
                }
                settled += 1;
            }
        }
    }
}
