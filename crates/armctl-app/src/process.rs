//! Message processing
//!
//! Runs a message (and any follow-up messages it produces) through the TEA
//! update function and dispatches the resulting actions.

use tokio::sync::{mpsc, watch};

use crate::actions::handle_action;
use crate::handler;
use crate::message::Message;
use crate::state::AppState;

/// Process a message through the TEA update function
pub fn process_message(
    state: &mut AppState,
    message: Message,
    msg_tx: &mpsc::Sender<Message>,
    shutdown_rx: &watch::Receiver<bool>,
) {
    let mut msg = Some(message);
    while let Some(m) = msg {
        let result = handler::update(state, m);

        if let Some(action) = result.action {
            handle_action(action, msg_tx.clone(), shutdown_rx.clone());
        }

        // Continue with follow-up message
        msg = result.message;
    }
}
