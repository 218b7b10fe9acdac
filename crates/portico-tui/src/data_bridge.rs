//! Data bridge: forwards controller connection state to the TUI.
//!
//! List data reaches the screens through their own query subscriptions;
//! this task only reports connection changes and tears the controller
//! down when the UI exits.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use portico_core::{ConnectionState, Controller};

use crate::action::Action;

fn state_action(state: ConnectionState) -> Option<Action> {
    match state {
        ConnectionState::Connected => Some(Action::Connected),
        ConnectionState::Disconnected => Some(Action::Disconnected("disconnected".into())),
        ConnectionState::Failed => Some(Action::Disconnected("connection failed".into())),
        ConnectionState::Connecting => None,
    }
}

/// Run until `cancel` fires, then disconnect the controller.
pub async fn spawn_data_bridge(
    controller: Controller,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut conn_state = controller.connection_state();

    let initial = *conn_state.borrow_and_update();
    if let Some(action) = state_action(initial) {
        let _ = action_tx.send(action);
    }

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            changed = conn_state.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *conn_state.borrow_and_update();
                debug!(?state, "connection state changed");
                if let Some(action) = state_action(state) {
                    let _ = action_tx.send(action);
                }
            }
        }
    }

    controller.disconnect().await;
    debug!("data bridge shut down");
}
