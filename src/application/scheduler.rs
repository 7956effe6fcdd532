// Task scheduler - concurrent fan-out of chart and extraction tasks
use crate::application::progress::{ProgressAggregator, ProgressObserver};
use crate::application::task::{RunRequest, Task, TaskOutput, TaskRunner, build_tasks};
use crate::domain::error::PipelineError;
use crate::domain::frame::SensorFrame;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Outputs of a run, in submission order.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub outputs: Vec<(String, TaskOutput)>,
}

#[derive(Clone)]
pub struct TaskScheduler {
    runner: Arc<dyn TaskRunner>,
    workers: usize,
}

impl TaskScheduler {
    pub fn new(runner: Arc<dyn TaskRunner>) -> Self {
        Self {
            runner,
            workers: Self::default_workers(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Half the available cores, never less than one.
    pub fn default_workers() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get() / 2)
            .unwrap_or(1)
            .max(1)
    }

    #[cfg(test)]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Build the task battery for a request and run it to completion.
    pub async fn run(
        &self,
        frame: Arc<SensorFrame>,
        request: &RunRequest,
        observer: Arc<dyn ProgressObserver>,
        cancel: CancellationToken,
    ) -> Result<RunSummary, PipelineError> {
        let tasks = build_tasks(request.mode, request.segregation);
        tracing::info!(
            mode = %request.mode,
            segregation = request.segregation.value(),
            tasks = tasks.len(),
            workers = self.workers,
            "Starting run"
        );
        self.run_tasks(frame, tasks, &request.caption, observer, cancel)
            .await
    }

    /// Run every task and wait for all of them.
    ///
    /// A failing task never stops its siblings. Once the whole batch has
    /// resolved, the first failure in submission order is returned.
    pub async fn run_tasks(
        &self,
        frame: Arc<SensorFrame>,
        tasks: Vec<Task>,
        caption: &str,
        observer: Arc<dyn ProgressObserver>,
        cancel: CancellationToken,
    ) -> Result<RunSummary, PipelineError> {
        let start_time = Instant::now();
        let progress = Arc::new(ProgressAggregator::new(tasks.len(), observer));
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let caption: Arc<str> = Arc::from(caption);

        let mut ids = Vec::with_capacity(tasks.len());
        let mut handles = Vec::with_capacity(tasks.len());
        for task in tasks {
            let id = task.id().to_string();
            ids.push(id.clone());

            let runner = self.runner.clone();
            let frame = frame.clone();
            let caption = caption.clone();
            let progress = progress.clone();
            let semaphore = semaphore.clone();
            let cancel = cancel.clone();

            handles.push(tokio::spawn(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) if cancel.is_cancelled() => {
                        Err(PipelineError::Cancelled { task: id.clone() })
                    }
                    Ok(_permit) => {
                        let task_start = Instant::now();
                        let joined = tokio::task::spawn_blocking(move || {
                            runner.run(&task, &frame, &caption)
                        })
                        .await;
                        let outcome = joined.unwrap_or_else(|e| {
                            Err(PipelineError::WorkerFailure {
                                task: id.clone(),
                                reason: e.to_string(),
                            })
                        });
                        tracing::debug!(
                            task = %id,
                            ok = outcome.is_ok(),
                            duration_ms = task_start.elapsed().as_millis() as u64,
                            "Task finished"
                        );
                        outcome
                    }
                    Err(_) => Err(PipelineError::WorkerFailure {
                        task: id.clone(),
                        reason: "worker pool closed".to_string(),
                    }),
                };

                let update = progress.on_task_complete();
                tracing::debug!(
                    completed = update.completed,
                    total = update.total,
                    percent = update.percent,
                    "Progress"
                );
                outcome
            }));
        }

        let joined = futures::future::join_all(handles).await;

        let mut outputs = Vec::with_capacity(joined.len());
        let mut failures = Vec::new();
        for (id, result) in ids.into_iter().zip(joined) {
            let outcome = result.unwrap_or_else(|e| {
                Err(PipelineError::WorkerFailure {
                    task: id.clone(),
                    reason: e.to_string(),
                })
            });
            match outcome {
                Ok(output) => outputs.push((id, output)),
                Err(err) => {
                    tracing::error!(task = %id, "Task failed: {}", err);
                    failures.push(err);
                }
            }
        }

        let duration_ms = start_time.elapsed().as_millis() as u64;
        match failures.into_iter().next() {
            Some(first) => {
                tracing::warn!(
                    succeeded = outputs.len(),
                    duration_ms,
                    "Run finished with failures"
                );
                Err(first)
            }
            None => {
                tracing::info!(tasks = outputs.len(), duration_ms, "Run finished");
                Ok(RunSummary { outputs })
            }
        }
    }
}
