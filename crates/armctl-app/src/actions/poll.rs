//! Recurring reconciliation poll.
//!
//! One task per poll session. It stops when its [`CancelToken`] fires (the
//! session was replaced or dropped), when the engine shuts down, or when the
//! message channel closes.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use armctl_device::{run_cancellable, CancelToken, DeviceClient};

use crate::message::Message;

/// Spawn the status poll for `session`.
///
/// The first request is issued one `interval` after start: the probe that
/// established the connection already served as the initial sync. At most
/// one status request is outstanding at a time; slow responses delay the
/// next tick instead of stacking requests.
pub fn spawn_status_poll(
    session: u64,
    client: DeviceClient,
    cancel: CancelToken,
    interval: Duration,
    timeout: Duration,
    msg_tx: mpsc::Sender<Message>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    tokio::spawn(async move {
        let mut stop = cancel.clone();
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval() fires immediately; skip that tick.
        ticker.tick().await;

        info!("Status poll {} started ({:?} interval)", session, interval);

        loop {
            tokio::select! {
                _ = stop.cancelled() => {
                    debug!("Status poll {} cancelled", session);
                    break;
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        debug!("Status poll {} stopping for shutdown", session);
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let outcome = run_cancellable(cancel.clone(), client.get_status(timeout)).await;
                    let Some(result) = outcome.into_result() else {
                        break;
                    };
                    if msg_tx.send(Message::StatusPolled { session, result }).await.is_err() {
                        // Channel closed: engine is gone
                        break;
                    }
                }
            }
        }

        debug!("Status poll {} exited", session);
    });
}
