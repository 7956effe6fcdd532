// Progress aggregation across concurrently completing tasks
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    pub completed: usize,
    pub total: usize,
    /// Exact share of completed work in [0, 100].
    pub percent: f64,
}

impl ProgressUpdate {
    /// Whole percentage as shown to an operator. Rounds down, so only the
    /// final completion ever shows 100.
    pub fn whole_percent(&self) -> u8 {
        self.percent.floor().clamp(0.0, 100.0) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }
}

pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, update: ProgressUpdate);
}

/// Counts task completions for one batch and forwards each new value.
///
/// The per-task unit is fixed when the batch is built, so the last
/// completion always lands on exactly 100.
pub struct ProgressAggregator {
    completed: AtomicUsize,
    total: usize,
    unit: f64,
    observer: Arc<dyn ProgressObserver>,
}

impl ProgressAggregator {
    pub fn new(total: usize, observer: Arc<dyn ProgressObserver>) -> Self {
        let unit = if total == 0 { 0.0 } else { 100.0 / total as f64 };
        Self {
            completed: AtomicUsize::new(0),
            total,
            unit,
            observer,
        }
    }

    #[cfg(test)]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire).min(self.total)
    }

    /// Record one finished task (successful or not) and notify the observer.
    pub fn on_task_complete(&self) -> ProgressUpdate {
        let completed = (self.completed.fetch_add(1, Ordering::AcqRel) + 1).min(self.total);
        let update = self.update_for(completed);
        self.observer.on_progress(update);
        update
    }

    fn update_for(&self, completed: usize) -> ProgressUpdate {
        let percent = if completed >= self.total {
            100.0
        } else {
            self.unit * completed as f64
        };
        ProgressUpdate {
            completed,
            total: self.total,
            percent,
        }
    }
}

/// Forwards updates to an async consumer, e.g. a UI or a log task.
pub struct ChannelProgressObserver {
    tx: mpsc::UnboundedSender<ProgressUpdate>,
}

impl ChannelProgressObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressObserver for ChannelProgressObserver {
    fn on_progress(&self, update: ProgressUpdate) {
        // Receiver gone means nobody is watching anymore
        let _ = self.tx.send(update);
    }
}
