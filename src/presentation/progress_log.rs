// Operator-facing progress reporting
use crate::application::progress::ProgressUpdate;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Log every progress update until the sending side is dropped.
/// Returns the last update seen.
pub fn spawn_progress_log(
    mut rx: mpsc::UnboundedReceiver<ProgressUpdate>,
) -> JoinHandle<Option<ProgressUpdate>> {
    tokio::spawn(async move {
        let mut last = None;
        while let Some(update) = rx.recv().await {
            tracing::info!(
                completed = update.completed,
                total = update.total,
                "Progress {}%",
                update.whole_percent()
            );
            if update.is_complete() {
                tracing::info!(total = update.total, "All tasks finished");
            }
            last = Some(update);
        }
        last
    })
}
