//! Level-triggered cancellation signal shared by one invocation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::warn;

/// Fired once, observed by any number of clones.
///
/// Unlike `Notify`, a waiter that arrives after [`Cancellation::cancel`] still
/// sees the signal.
#[derive(Debug, Clone)]
pub struct Cancellation {
    tx: Arc<watch::Sender<bool>>,
}

impl Cancellation {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once [`Cancellation::cancel`] has been called on any clone.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this only returns once fired.
        let _ = rx.wait_for(|fired| *fired).await;
    }

    /// Fire after `deadline` unless the process ends first.
    pub fn cancel_after(&self, deadline: Duration) {
        let cancel = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            warn!(?deadline, "deadline exceeded, cancelling");
            cancel.cancel();
        });
    }

    /// Fire on Ctrl-C.
    pub fn cancel_on_interrupt(&self) {
        let cancel = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, cancelling");
                cancel.cancel();
            }
        });
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}
