// Pipeline error taxonomy
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unknown operational mode '{0}' (expected 900, PQY or DPY)")]
    UnknownMode(String),

    #[error("chart '{chart}' requires column '{column}' which is absent from the frame")]
    MissingColumn { chart: String, column: String },

    #[error("failed to write {target}: {reason}")]
    WriteFailure { target: String, reason: String },

    #[error("task '{task}' terminated abnormally: {reason}")]
    WorkerFailure { task: String, reason: String },

    #[error("task '{task}' was cancelled before it started")]
    Cancelled { task: String },

    #[error("invalid sensor frame: {0}")]
    InvalidFrame(String),
}

impl PipelineError {
    pub fn missing_column(chart: &str, column: &str) -> Self {
        Self::MissingColumn {
            chart: chart.to_string(),
            column: column.to_string(),
        }
    }

    /// Wrap an adapter error, keeping its full context chain in the message.
    pub fn write_failure(target: impl Into<String>, err: &anyhow::Error) -> Self {
        Self::WriteFailure {
            target: target.into(),
            reason: format!("{err:#}"),
        }
    }
}
