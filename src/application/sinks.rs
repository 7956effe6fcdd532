// Collaborator ports for chart artifacts, report documents and out-of-criteria exports
use crate::domain::chart::ChartTable;
use crate::domain::outlier::OutlierTable;
use std::path::{Path, PathBuf};

pub trait ChartRenderer: Send + Sync {
    /// Turn a chart table into an artifact and return where it was written
    fn render(&self, chart: &ChartTable) -> anyhow::Result<PathBuf>;
}

pub trait ReportSink: Send + Sync {
    /// Assemble one report document from a rendered artifact and its caption
    fn publish(&self, chart: &ChartTable, artifact: &Path, caption: &str)
        -> anyhow::Result<PathBuf>;
}

pub trait OutlierSink: Send + Sync {
    /// Export the rows of one out-of-criteria check, even when there are none
    fn write(&self, table: &OutlierTable) -> anyhow::Result<PathBuf>;
}
