//! Cancellable one-shot timer backing the deferred wait indicator.

use std::time::Duration;

use tokio::sync::oneshot;

/// Arm a one-shot timer that fires once after `delay`.
///
/// The timer runs as a spawned task racing the delay against cancellation,
/// so a cancelled timer stops sleeping right away instead of lingering
/// until the delay elapses.
pub fn schedule_once(delay: Duration) -> ScheduledOnce {
    let (fired_tx, fired_rx) = oneshot::channel();
    let (cancel_tx, cancel_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {
                let _ = fired_tx.send(());
            }
            _ = cancel_rx => {}
        }
    });

    ScheduledOnce {
        fired: Some(fired_rx),
        cancel: Some(cancel_tx),
    }
}

/// Handle to a pending one-shot firing.
///
/// `fired` resolves at most once; after the firing was consumed, or after
/// `cancel`, it stays pending forever, which makes it safe to race inside
/// `select!` loops without re-arm bookkeeping.
pub struct ScheduledOnce {
    fired: Option<oneshot::Receiver<()>>,
    cancel: Option<oneshot::Sender<()>>,
}

impl ScheduledOnce {
    /// Wait for the firing.
    pub async fn fired(&mut self) {
        if let Some(receiver) = self.fired.take()
            && receiver.await.is_ok()
        {
            return;
        }
        // Already delivered or cancelled.
        std::future::pending().await
    }

    /// Call off the pending firing. Idempotent, harmless after the timer
    /// already fired.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }
}
