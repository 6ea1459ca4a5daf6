use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::queue::SubmissionQueue;

/// Flush the queue on every offline→online transition.
///
/// The receiver carries the device's connectivity state; the loop runs
/// until the token is cancelled or the sender side is dropped. A flush
/// already in progress makes the triggered call a no-op, so rapid
/// connectivity flaps cannot stack flushes.
pub fn watch_connectivity(
  queue: Arc<SubmissionQueue>,
  mut online: watch::Receiver<bool>,
  cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
  tokio::spawn(async move {
    let mut was_online = *online.borrow();

    loop {
      tokio::select! {
        _ = cancel.cancelled() => {
          info!("connectivity watcher cancelled");
          break;
        }
        changed = online.changed() => {
          if changed.is_err() {
            // Sender dropped, nothing left to watch.
            break;
          }
          let is_online = *online.borrow();
          if is_online && !was_online {
            info!("connectivity_restored");
            queue.flush().await;
          }
          was_online = is_online;
        }
      }
    }
  })
}
