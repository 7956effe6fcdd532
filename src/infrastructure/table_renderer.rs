// Chart renderer writing the chart-ready table for the plotting stage
use crate::application::sinks::ChartRenderer;
use crate::domain::chart::ChartTable;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Writes `<dir>/<output name>.csv`: a `Date` column followed by one column
/// per trace, headed by its display label.
#[derive(Debug, Clone)]
pub struct TableChartRenderer {
    dir: PathBuf,
}

impl TableChartRenderer {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl ChartRenderer for TableChartRenderer {
    fn render(&self, chart: &ChartTable) -> Result<PathBuf> {
        let path = self.dir.join(format!("{}.csv", chart.output_name));
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;

        let mut header = vec!["Date".to_string()];
        header.extend(chart.traces.iter().map(|t| t.label.clone()));
        writer.write_record(&header)?;

        for (row, timestamp) in chart.timestamps.iter().enumerate() {
            let mut record = vec![timestamp.format(TIMESTAMP_FORMAT).to_string()];
            record.extend(chart.traces.iter().map(|t| format_reading(t.values[row])));
            writer.write_record(&record)?;
        }
        writer
            .flush()
            .with_context(|| format!("failed to flush {}", path.display()))?;

        tracing::debug!(chart = %chart.output_name, path = %path.display(), "Chart table written");
        Ok(path)
    }
}

/// Missing readings are written as empty cells.
pub fn format_reading(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::ChartKind;
    use crate::domain::frame::SensorFrame;
    use crate::domain::frame::test_support::ts;
    use crate::domain::mode::Mode;
    use crate::domain::outlier::SegregationThreshold;

    #[test]
    fn test_render_writes_labelled_table() {
        let dir = tempfile::tempdir().unwrap();
        let frame = SensorFrame::new(
            vec![ts(0), ts(1)],
            vec![
                ("EHP001MPGrad".to_string(), vec![1.5, f64::NAN]),
                ("EHP002MPGrad".to_string(), vec![-2.0, 3.0]),
            ],
        )
        .unwrap();
        let table = ChartKind::PressureGradient
            .spec(Mode::Series900, SegregationThreshold::STANDARD)
            .build(&frame)
            .unwrap();

        let path = TableChartRenderer::new(dir.path().to_path_buf())
            .render(&table)
            .unwrap();

        assert_eq!(path, dir.path().join("gradients_de_pression.csv"));
        let content = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "Date,EHP001MPGrad,EHP002MPGrad,\
             Valeur Max Gradient (+4 bar/min),Valeur Min Gradient (-4 bar/min)"
        );
        assert_eq!(lines[1], "2024-03-01 08:00:00,1.5,-2,4,-4");
        assert_eq!(lines[2], "2024-03-01 08:01:00,,3,4,-4");
    }

    #[test]
    fn test_render_into_missing_dir_fails_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = TableChartRenderer::new(dir.path().join("absent"));
        let table = ChartTable {
            output_name: "Tmoy".to_string(),
            title: String::new(),
            y_label: String::new(),
            timestamps: Vec::new(),
            traces: Vec::new(),
        };

        let err = renderer.render(&table).unwrap_err();
        assert!(err.to_string().contains("Tmoy.csv"));
    }
}
