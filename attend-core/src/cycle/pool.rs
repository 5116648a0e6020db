//! Out-of-band work whose results re-enter through normal admission.
//!
//! Jobs produce items. Results are only collected at the start of a cycle and
//! then admitted like any other input, so no job ever touches a bag directly.

use std::collections::VecDeque;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::constants::CYCLE_LATER_JOBS_COUNT_MAX;

type Job<V> = Box<dyn FnOnce() -> Vec<V> + Send>;

enum Backend<V> {
    /// Jobs run on the scheduler thread at the start of the next cycle
    Inline { jobs: VecDeque<Job<V>> },
    /// Jobs run on the tokio blocking pool
    Tokio {
        handle: Handle,
        tx: mpsc::UnboundedSender<Vec<V>>,
        rx: mpsc::UnboundedReceiver<Vec<V>>,
        in_flight: usize,
    },
}

/// Reports a job's result when dropped, so a task discarded unrun still
/// settles the in-flight count with an empty result.
struct Completion<V> {
    tx: mpsc::UnboundedSender<Vec<V>>,
    items: Vec<V>,
}

impl<V> Drop for Completion<V> {
    fn drop(&mut self) {
        // The receiver only disappears with the scheduler
        let _ = self.tx.send(std::mem::take(&mut self.items));
    }
}

/// Executes deferred jobs off the cycle's critical path.
pub struct WorkerPool<V> {
    backend: Backend<V>,
}

impl<V: Send + 'static> WorkerPool<V> {
    /// Run jobs on the scheduler thread at the start of the following cycle.
    ///
    /// Fully deterministic.
    #[must_use]
    pub fn inline() -> Self {
        Self {
            backend: Backend::Inline {
                jobs: VecDeque::new(),
            },
        }
    }

    /// Run jobs on the blocking pool of the given runtime.
    ///
    /// Results are admitted at the start of the first cycle after they arrive.
    #[must_use]
    pub fn tokio(handle: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            backend: Backend::Tokio {
                handle,
                tx,
                rx,
                in_flight: 0,
            },
        }
    }

    /// `"inline"` or `"tokio"`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self.backend {
            Backend::Inline { .. } => "inline",
            Backend::Tokio { .. } => "tokio",
        }
    }

    /// Jobs submitted whose results have not been collected yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        match &self.backend {
            Backend::Inline { jobs } => jobs.len(),
            Backend::Tokio { in_flight, .. } => *in_flight,
        }
    }

    /// Queue a job. Returns `false` (dropping the job) when the pool is full.
    pub(crate) fn submit(&mut self, job: Job<V>) -> bool {
        if self.pending() >= CYCLE_LATER_JOBS_COUNT_MAX {
            tracing::warn!(
                pending = self.pending(),
                max = CYCLE_LATER_JOBS_COUNT_MAX,
                "worker pool full, dropping job"
            );
            return false;
        }

        match &mut self.backend {
            Backend::Inline { jobs } => jobs.push_back(job),
            Backend::Tokio {
                handle,
                tx,
                in_flight,
                ..
            } => {
                let completion = Completion {
                    tx: tx.clone(),
                    items: Vec::new(),
                };
                *in_flight += 1;
                handle.spawn_blocking(move || {
                    let mut completion = completion;
                    completion.items = catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|_| {
                        tracing::error!("worker job panicked, result dropped");
                        Vec::new()
                    });
                });
            }
        }
        true
    }

    /// Results ready to be admitted.
    pub(crate) fn collect(&mut self) -> Vec<V> {
        let mut out = Vec::new();
        match &mut self.backend {
            Backend::Inline { jobs } => {
                for job in jobs.drain(..) {
                    out.extend(job());
                }
            }
            Backend::Tokio { rx, in_flight, .. } => {
                while let Ok(items) = rx.try_recv() {
                    *in_flight -= 1;
                    out.extend(items);
                }
            }
        }
        out
    }
}

impl<V: Send + 'static> Default for WorkerPool<V> {
    fn default() -> Self {
        Self::inline()
    }
}

impl<V> fmt::Debug for WorkerPool<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, pending) = match &self.backend {
            Backend::Inline { jobs } => ("inline", jobs.len()),
            Backend::Tokio { in_flight, .. } => ("tokio", *in_flight),
        };
        f.debug_struct("WorkerPool")
            .field("backend", &name)
            .field("pending", &pending)
            .finish()
    }
}
