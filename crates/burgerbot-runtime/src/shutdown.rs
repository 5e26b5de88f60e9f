//! Cooperative cancellation over a `watch::Receiver<bool>`.

use tokio::sync::watch;

/// Resolve once the channel holds `true` or its sender has gone away.
pub async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            return;
        }
    }
}
