//! Cancellable device operations
//!
//! Every request to the device runs behind an [`OperationHandle`]. The handle
//! stays with the owner of the operation (the update loop state), the matching
//! [`CancelToken`] travels with the spawned task. Cancelling the handle, or
//! dropping it, makes the task resolve to [`Outcome::Cancelled`] without
//! waiting for the network.
//!
//! [`run_cancellable`] resolves exactly once, so each handle produces at most
//! one observed outcome.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use armctl_core::DeviceError;

/// Process-wide operation id source, used for log correlation.
static NEXT_OPERATION_ID: AtomicU64 = AtomicU64::new(1);

/// Final result of a cancellable operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Completed(T),
    Failed(DeviceError),
    Cancelled,
}

impl<T> Outcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }

    /// `None` for cancelled operations.
    pub fn into_result(self) -> Option<Result<T, DeviceError>> {
        match self {
            Outcome::Completed(value) => Some(Ok(value)),
            Outcome::Failed(err) => Some(Err(err)),
            Outcome::Cancelled => None,
        }
    }
}

/// Owner side of an operation. Not cloneable: exactly one owner may cancel.
#[derive(Debug)]
pub struct OperationHandle {
    id: u64,
    cancel_tx: watch::Sender<bool>,
}

impl OperationHandle {
    /// Create a handle and the token to hand to the task that performs the work.
    pub fn new() -> (OperationHandle, CancelToken) {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let id = NEXT_OPERATION_ID.fetch_add(1, Ordering::Relaxed);
        (
            OperationHandle { id, cancel_tx },
            CancelToken { id, cancel_rx },
        )
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }
}

impl Drop for OperationHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Task side of an operation.
#[derive(Debug, Clone)]
pub struct CancelToken {
    id: u64,
    cancel_rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_rx.borrow() || self.cancel_rx.has_changed().is_err()
    }

    /// Resolves once the owning handle cancels or is dropped.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.cancel_rx.borrow_and_update() {
                return;
            }
            if self.cancel_rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Drive `work` until it finishes or the token is cancelled.
///
/// Cancellation wins ties: a token that is already cancelled never polls `work`.
pub async fn run_cancellable<T, F>(mut token: CancelToken, work: F) -> Outcome<T>
where
    F: Future<Output = Result<T, DeviceError>>,
{
    if token.is_cancelled() {
        return Outcome::Cancelled;
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => Outcome::Cancelled,
        result = work => match result {
            Ok(value) => Outcome::Completed(value),
            Err(err) => Outcome::Failed(err),
        },
    }
}
