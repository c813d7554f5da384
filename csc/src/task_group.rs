//! Fan-out / fan-in for helper tasks.
//!
//! A [`TaskGroup`] joins a dynamic set of tasks.  The join count is the number
//! of live error-channel senders: every spawned task holds one until it
//! finishes, so the channel closes exactly when the last task is done.  The
//! first error sent wins; once it is observed the group raises its stop
//! signal and returns without awaiting the remaining tasks, which wind down
//! at their next [`GroupHandle::is_stopped`] check.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::cancel::Cancellation;
use crate::error::CscError;

/// Owner side: spawns the root task and waits for the outcome.
#[derive(Debug)]
pub struct TaskGroup {
    handle: GroupHandle,
    errors: mpsc::UnboundedReceiver<CscError>,
}

/// Task side: spawns siblings and observes the stop signal.
#[derive(Debug, Clone)]
pub struct GroupHandle {
    errors: mpsc::UnboundedSender<CscError>,
    stop: Cancellation,
    external: Cancellation,
}

impl TaskGroup {
    /// A new group that also stops when `external` fires.
    pub fn new(external: Cancellation) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            handle: GroupHandle {
                errors: tx,
                stop: Cancellation::new(),
                external,
            },
            errors: rx,
        }
    }

    pub fn handle(&self) -> GroupHandle {
        self.handle.clone()
    }

    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = Result<(), CscError>> + Send + 'static,
    {
        self.handle.spawn(task);
    }

    /// Wait until every task finished, the first error arrived, or the
    /// external signal fired, whichever happens first.
    ///
    /// Any [`GroupHandle`] still held by the caller keeps the group open, so
    /// drop them before waiting.
    pub async fn wait(self) -> Result<(), CscError> {
        let TaskGroup { handle, mut errors } = self;
        let GroupHandle {
            errors: own_sender,
            stop,
            external,
        } = handle;
        drop(own_sender);

        let outcome = tokio::select! {
            biased;
            first = errors.recv() => match first {
                Some(err) => Err(err),
                // All senders gone: every task has finished.  Tasks that
                // noticed the external signal exit quietly, so report it here.
                None if external.is_cancelled() => Err(CscError::Cancelled),
                None => Ok(()),
            },
            _ = external.cancelled() => Err(CscError::Cancelled),
        };

        if let Err(err) = &outcome {
            debug!(error = %err, "task group stopping");
            stop.cancel();
        }
        outcome
    }
}

impl GroupHandle {
    /// Spawn a task that counts towards the group's join.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = Result<(), CscError>> + Send + 'static,
    {
        let errors = self.errors.clone();
        tokio::spawn(async move {
            let err = match AssertUnwindSafe(task).catch_unwind().await {
                Ok(Ok(())) => return,
                Ok(Err(err)) => err,
                Err(_) => {
                    warn!("group task panicked");
                    CscError::TaskFailed("task panicked".into())
                }
            };
            // The receiver is gone once an earlier error has won.
            let _ = errors.send(err);
        });
    }

    /// True once the group failed or the invocation was cancelled.
    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled() || self.external.is_cancelled()
    }

    /// Resolves when [`GroupHandle::is_stopped`] becomes true.
    pub async fn stopped(&self) {
        tokio::select! {
            _ = self.stop.cancelled() => {}
            _ = self.external.cancelled() => {}
        }
    }
}
