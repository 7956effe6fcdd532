// Main entry point - Dependency injection and run setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::sync::Arc;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::application::progress::ChannelProgressObserver;
use crate::application::scheduler::TaskScheduler;
use crate::application::task::{ReportTaskRunner, TaskOutput};
use crate::infrastructure::config::load_settings;
use crate::infrastructure::csv_frame_source::CsvFrameSource;
use crate::infrastructure::outlier_writer::CsvOutlierSink;
use crate::infrastructure::report_writer::JsonReportSink;
use crate::infrastructure::table_renderer::TableChartRenderer;
use crate::presentation::cli::Args;
use crate::presentation::progress_log::spawn_progress_log;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let request = args.to_request()?;

    // Load configuration
    let settings = load_settings()?;
    settings.output.ensure_dirs()?;

    // Ingest once, share read-only across workers
    let frame = Arc::new(CsvFrameSource::new(settings.ingest.clone()).load(&args.input)?);

    // Create adapters (infrastructure layer)
    let runner = Arc::new(ReportTaskRunner::new(
        Arc::new(TableChartRenderer::new(settings.output.chart_dir.clone())),
        Arc::new(JsonReportSink::new(settings.output.report_dir.clone())),
        Arc::new(CsvOutlierSink::new(settings.output.outlier_dir.clone())),
    ));

    // Create scheduler (application layer)
    let mut scheduler = TaskScheduler::new(runner);
    if let Some(workers) = args.workers.or(settings.scheduler.workers) {
        scheduler = scheduler.with_workers(workers);
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling pending tasks");
            on_interrupt.cancel();
        }
    });

    let (observer, progress_rx) = ChannelProgressObserver::new();
    let progress_log = spawn_progress_log(progress_rx);

    let result = scheduler
        .run(frame, &request, Arc::new(observer), cancel)
        .await;
    // Observer dropped with the run, so the log task drains and exits
    let _ = progress_log.await;

    let summary = result?;
    let mut charts = 0usize;
    for (task, output) in &summary.outputs {
        match output {
            TaskOutput::Chart { artifact, report } => {
                charts += 1;
                tracing::debug!(
                    %task,
                    artifact = %artifact.display(),
                    report = %report.display(),
                    "Chart produced"
                );
            }
            TaskOutput::OutOfCriteria { files, flagged_rows } => {
                tracing::info!(
                    files = files.len(),
                    flagged_rows,
                    "Out-of-criteria extraction done"
                );
            }
        }
    }
    tracing::info!(
        charts,
        chart_dir = %settings.output.chart_dir.display(),
        report_dir = %settings.output.report_dir.display(),
        outlier_dir = %settings.output.outlier_dir.display(),
        "Run complete"
    );

    Ok(())
}
