// Task descriptors and their execution against the shared frame
use crate::application::sinks::{ChartRenderer, OutlierSink, ReportSink};
use crate::domain::catalog::catalog;
use crate::domain::chart::ChartSpec;
use crate::domain::error::PipelineError;
use crate::domain::frame::SensorFrame;
use crate::domain::mode::Mode;
use crate::domain::outlier::{OutlierExtractor, SegregationThreshold};
use std::path::PathBuf;
use std::sync::Arc;

pub const OUT_OF_CRITERIA_TASK: &str = "hors_criteres";

/// Operator inputs for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub mode: Mode,
    /// Test procedure reference and site, printed on every report page.
    pub caption: String,
    pub segregation: SegregationThreshold,
}

/// One unit of work, fully bound before it is submitted.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    Chart(ChartSpec),
    OutOfCriteria(OutlierExtractor),
}

impl Task {
    pub fn id(&self) -> &str {
        match self {
            Task::Chart(spec) => spec.output_name,
            Task::OutOfCriteria(_) => OUT_OF_CRITERIA_TASK,
        }
    }
}

/// Every chart in catalog order, then the out-of-criteria extraction.
pub fn build_tasks(mode: Mode, segregation: SegregationThreshold) -> Vec<Task> {
    catalog(mode, segregation)
        .into_iter()
        .map(Task::Chart)
        .chain(std::iter::once(Task::OutOfCriteria(OutlierExtractor::new(segregation))))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutput {
    Chart { artifact: PathBuf, report: PathBuf },
    OutOfCriteria { files: Vec<PathBuf>, flagged_rows: usize },
}

pub trait TaskRunner: Send + Sync {
    fn run(&self, task: &Task, frame: &SensorFrame, caption: &str)
        -> Result<TaskOutput, PipelineError>;
}

/// Runs tasks against the real collaborators.
#[derive(Clone)]
pub struct ReportTaskRunner {
    renderer: Arc<dyn ChartRenderer>,
    reports: Arc<dyn ReportSink>,
    outliers: Arc<dyn OutlierSink>,
}

impl ReportTaskRunner {
    pub fn new(
        renderer: Arc<dyn ChartRenderer>,
        reports: Arc<dyn ReportSink>,
        outliers: Arc<dyn OutlierSink>,
    ) -> Self {
        Self {
            renderer,
            reports,
            outliers,
        }
    }

    fn run_chart(
        &self,
        spec: &ChartSpec,
        frame: &SensorFrame,
        caption: &str,
    ) -> Result<TaskOutput, PipelineError> {
        let table = spec.build(frame)?;
        tracing::debug!(
            chart = spec.output_name,
            rows = table.timestamps.len(),
            traces = table.traces.len(),
            "Chart table built"
        );

        let artifact = self
            .renderer
            .render(&table)
            .map_err(|e| PipelineError::write_failure(format!("chart {}", spec.output_name), &e))?;
        let report = self
            .reports
            .publish(&table, &artifact, caption)
            .map_err(|e| PipelineError::write_failure(format!("report {}", spec.output_name), &e))?;

        Ok(TaskOutput::Chart { artifact, report })
    }

    /// Every criterion is written even if an earlier write failed; the first
    /// failure is returned once all of them were attempted.
    fn run_extraction(
        &self,
        extractor: &OutlierExtractor,
        frame: &SensorFrame,
    ) -> Result<TaskOutput, PipelineError> {
        let results = extractor.extract(frame)?;

        let mut files = Vec::with_capacity(results.len());
        let mut flagged_rows = 0;
        let mut first_failure = None;
        for (criterion, table) in &results {
            match self.outliers.write(table) {
                Ok(path) => {
                    if !table.is_empty() {
                        tracing::info!(
                            criterion = criterion.output_name,
                            rows = table.len(),
                            "Out-of-criteria rows exported"
                        );
                    }
                    flagged_rows += table.len();
                    files.push(path);
                }
                Err(e) => {
                    tracing::error!(criterion = criterion.output_name, "Export failed: {:#}", e);
                    first_failure.get_or_insert_with(|| {
                        let target = format!("out-of-criteria {}", criterion.output_name);
                        PipelineError::write_failure(target, &e)
                    });
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(TaskOutput::OutOfCriteria { files, flagged_rows }),
        }
    }
}

impl TaskRunner for ReportTaskRunner {
    fn run(
        &self,
        task: &Task,
        frame: &SensorFrame,
        caption: &str,
    ) -> Result<TaskOutput, PipelineError> {
        match task {
            Task::Chart(spec) => self.run_chart(spec, frame, caption),
            Task::OutOfCriteria(extractor) => self.run_extraction(extractor, frame),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sinks::test_support::RecordingSinks;
    use crate::domain::chart::ChartKind;
    use crate::domain::frame::test_support::ts;

    fn runner(sinks: Arc<RecordingSinks>) -> ReportTaskRunner {
        ReportTaskRunner::new(sinks.clone(), sinks.clone(), sinks)
    }

    fn gradient_frame() -> SensorFrame {
        SensorFrame::new(
            (0..3).map(ts).collect(),
            vec![
                ("EHP001MPGrad".to_string(), vec![-5.0, 0.0, 5.0]),
                ("EHP002MPGrad".to_string(), vec![0.0, 0.0, 0.0]),
                ("TGRAD".to_string(), vec![0.0, 0.0, 0.0]),
                ("TMOY".to_string(), vec![40.0, 40.0, 40.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_build_tasks_covers_catalog_and_extraction() {
        let tasks = build_tasks(Mode::Series900, SegregationThreshold::STANDARD);

        assert_eq!(tasks.len(), ChartKind::ALL.len() + 1);
        assert_eq!(tasks[0].id(), "rcp");
        assert_eq!(tasks.last().unwrap().id(), OUT_OF_CRITERIA_TASK);
    }

    #[test]
    fn test_chart_task_renders_then_publishes_with_caption() {
        let sinks = Arc::new(RecordingSinks::default());
        let task = Task::Chart(
            ChartKind::PressureGradient.spec(Mode::Pqy, SegregationThreshold::STANDARD),
        );

        let output = runner(sinks.clone())
            .run(&task, &gradient_frame(), "D02-ARV-01-156-210 FLA 2R")
            .unwrap();

        assert_eq!(
            output,
            TaskOutput::Chart {
                artifact: PathBuf::from("gradients_de_pression.csv"),
                report: PathBuf::from("gradients_de_pression.json"),
            }
        );
        assert_eq!(
            sinks.published.lock().unwrap().as_slice(),
            &[(
                "gradients_de_pression.csv".to_string(),
                "D02-ARV-01-156-210 FLA 2R".to_string()
            )]
        );
    }

    #[test]
    fn test_extraction_writes_all_criteria() {
        let sinks = Arc::new(RecordingSinks::default());
        let task = Task::OutOfCriteria(OutlierExtractor::default());

        let output = runner(sinks.clone()).run(&task, &gradient_frame(), "").unwrap();

        match output {
            TaskOutput::OutOfCriteria { files, flagged_rows } => {
                assert_eq!(files.len(), 8);
                assert_eq!(flagged_rows, 2);
            }
            other => panic!("unexpected output {:?}", other),
        }
        assert_eq!(sinks.exported.lock().unwrap().len(), 8);
    }

    #[test]
    fn test_extraction_keeps_writing_after_a_failed_export() {
        let sinks = Arc::new(RecordingSinks::failing_on("EHP1MPGrad_sup4"));
        let task = Task::OutOfCriteria(OutlierExtractor::default());

        let result = runner(sinks.clone()).run(&task, &gradient_frame(), "");

        match result {
            Err(PipelineError::WriteFailure { target, .. }) => {
                assert_eq!(target, "out-of-criteria EHP1MPGrad_sup4")
            }
            other => panic!("expected WriteFailure, got {:?}", other),
        }
        assert_eq!(sinks.exported.lock().unwrap().len(), 7);
    }

    #[test]
    fn test_render_failure_is_a_write_failure() {
        let sinks = Arc::new(RecordingSinks::failing_on("gradients_de_pression"));
        let task = Task::Chart(
            ChartKind::PressureGradient.spec(Mode::Pqy, SegregationThreshold::STANDARD),
        );

        let result = runner(sinks.clone()).run(&task, &gradient_frame(), "");

        assert!(matches!(result, Err(PipelineError::WriteFailure { .. })));
        assert!(sinks.published.lock().unwrap().is_empty());
    }
}
