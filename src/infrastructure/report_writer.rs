// Report sink assembling one captioned document per chart
use crate::application::sinks::ReportSink;
use crate::domain::chart::ChartTable;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Raw tag or derived trace next to the label shown in the legend.
#[derive(Debug, Serialize)]
struct LegendEntry<'a> {
    column: &'a str,
    label: &'a str,
}

#[derive(Debug, Serialize)]
struct ReportDocument<'a> {
    name: &'a str,
    title: &'a str,
    caption: &'a str,
    artifact: String,
    x_label: &'static str,
    y_label: &'a str,
    legend_title: &'static str,
    legend: Vec<LegendEntry<'a>>,
    rows: usize,
    generated_at: String,
}

#[derive(Debug, Clone)]
pub struct JsonReportSink {
    dir: PathBuf,
}

impl JsonReportSink {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl ReportSink for JsonReportSink {
    fn publish(&self, chart: &ChartTable, artifact: &Path, caption: &str) -> Result<PathBuf> {
        let document = ReportDocument {
            name: &chart.output_name,
            title: &chart.title,
            caption,
            artifact: artifact.display().to_string(),
            x_label: "Date",
            y_label: &chart.y_label,
            legend_title: "Valeurs",
            legend: chart
                .traces
                .iter()
                .map(|t| LegendEntry {
                    column: &t.key,
                    label: &t.label,
                })
                .collect(),
            rows: chart.timestamps.len(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        };

        let path = self.dir.join(format!("{}.json", chart.output_name));
        let file =
            File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &document)
            .with_context(|| format!("failed to write {}", path.display()))?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::Trace;
    use crate::domain::frame::test_support::ts;

    #[test]
    fn test_publish_writes_captioned_document() {
        let dir = tempfile::tempdir().unwrap();
        let chart = ChartTable {
            output_name: "Tmoy".to_string(),
            title: "Suivi de la Tmoy de l'EHP".to_string(),
            y_label: "Température (°C)".to_string(),
            timestamps: vec![ts(0), ts(1)],
            traces: vec![Trace {
                key: "TMOY".to_string(),
                label: "Tmoy".to_string(),
                values: vec![40.0, 41.0],
            }],
        };

        let path = JsonReportSink::new(dir.path().to_path_buf())
            .publish(&chart, Path::new("courbes_png/Tmoy.csv"), "D02-ARV-01-156-210 FLA")
            .unwrap();

        let document: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(document["caption"], "D02-ARV-01-156-210 FLA");
        assert_eq!(document["artifact"], "courbes_png/Tmoy.csv");
        assert_eq!(document["title"], "Suivi de la Tmoy de l'EHP");
        assert_eq!(
            document["legend"],
            serde_json::json!([{ "column": "TMOY", "label": "Tmoy" }])
        );
        assert_eq!(document["rows"], 2);
    }
}
