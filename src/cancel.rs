use crate::{BackofficeError, Result};
use std::time::Duration;
use tokio::sync::watch;

/// Cooperative cancellation tied to the lifetime of a view.
///
/// - `cancel()` flips a boolean and wakes sleepers.
/// - `reset()` clears the flag so the owner can start polling again.
/// - Waits select on either the timer or cancellation.
#[derive(Clone, Debug)]
pub struct CancellationState {
    tx: watch::Sender<bool>,
}

impl Default for CancellationState {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    pub fn reset(&self) {
        let _ = self.tx.send(false);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Resolves once the flag behind `cancel_rx` turns true.
///
/// Never resolves if the sender is dropped without cancelling.
pub async fn cancelled(mut cancel_rx: watch::Receiver<bool>) {
    loop {
        if *cancel_rx.borrow() {
            return;
        }
        if cancel_rx.changed().await.is_err() {
            // Sender dropped; treat as non-cancelable.
            futures::future::pending::<()>().await;
        }
    }
}

pub async fn sleep_with_cancel(cancel_rx: watch::Receiver<bool>, duration: Duration) -> Result<()> {
    if *cancel_rx.borrow() {
        return Err(BackofficeError::Cancelled);
    }

    tokio::select! {
        _ = tokio::time::sleep(duration) => Ok(()),
        _ = cancelled(cancel_rx) => Err(BackofficeError::Cancelled),
    }
}
