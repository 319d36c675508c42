//! Rebuild coordination: the single-rebuild permit and background handles.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::Receiver;
use serde::Serialize;

use crate::error::{LoupeError, Result};

/// Outcome of a successful rebuild.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RebuildStats {
    /// Id of the published generation.
    pub generation_id: u64,
    /// Documents indexed.
    pub doc_count: usize,
    /// Records skipped as malformed or duplicate.
    pub skipped: usize,
    /// Distinct `(field, term)` pairs.
    pub term_count: usize,
    /// Build and publish time.
    pub elapsed: Duration,
}

/// Exclusive right to run a rebuild; released on drop.
#[derive(Debug)]
pub struct RebuildPermit {
    flag: Arc<AtomicBool>,
}

impl RebuildPermit {
    /// Take the permit, or fail with [`LoupeError::RebuildInProgress`].
    pub fn acquire(flag: &Arc<AtomicBool>) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| LoupeError::RebuildInProgress)?;
        Ok(RebuildPermit {
            flag: Arc::clone(flag),
        })
    }
}

impl Drop for RebuildPermit {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Handle to a rebuild running on a worker thread.
#[derive(Debug)]
pub struct RebuildHandle {
    receiver: Receiver<Result<RebuildStats>>,
    worker: Option<JoinHandle<()>>,
}

impl RebuildHandle {
    pub(crate) fn new(receiver: Receiver<Result<RebuildStats>>, worker: JoinHandle<()>) -> Self {
        RebuildHandle {
            receiver,
            worker: Some(worker),
        }
    }

    /// Block until the rebuild finishes.
    pub fn wait(mut self) -> Result<RebuildStats> {
        let outcome = self.receiver.recv();
        let joined = self.worker.take().map(JoinHandle::join);

        match (outcome, joined) {
            (Ok(result), _) => result,
            (Err(_), Some(Err(_))) => Err(LoupeError::internal("rebuild worker panicked")),
            (Err(_), _) => Err(LoupeError::internal(
                "rebuild worker exited without reporting",
            )),
        }
    }

    /// The outcome if the rebuild has finished, without blocking.
    ///
    /// The outcome is handed out once; later calls return `None`.
    pub fn try_wait(&self) -> Option<Result<RebuildStats>> {
        self.receiver.try_recv().ok()
    }

    /// Whether the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().is_none_or(JoinHandle::is_finished)
    }
}
