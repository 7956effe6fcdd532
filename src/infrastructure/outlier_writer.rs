// Out-of-criteria exporter - one CSV per criterion
use crate::application::sinks::OutlierSink;
use crate::domain::outlier::OutlierTable;
use crate::infrastructure::table_renderer::{TIMESTAMP_FORMAT, format_reading};
use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct CsvOutlierSink {
    dir: PathBuf,
}

impl CsvOutlierSink {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl OutlierSink for CsvOutlierSink {
    fn write(&self, table: &OutlierTable) -> Result<PathBuf> {
        let path = self.dir.join(format!("{}.csv", table.output_name));
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;

        writer.write_record(["Date", table.column.as_str()])?;
        for (timestamp, value) in table.timestamps.iter().zip(&table.values) {
            writer.write_record([
                timestamp.format(TIMESTAMP_FORMAT).to_string(),
                format_reading(*value),
            ])?;
        }
        writer
            .flush()
            .with_context(|| format!("failed to flush {}", path.display()))?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::frame::test_support::ts;

    fn table(values: Vec<f64>) -> OutlierTable {
        OutlierTable {
            output_name: "TGRAD_sup28".to_string(),
            column: "TGRAD".to_string(),
            timestamps: (0..values.len() as i64).map(ts).collect(),
            values,
        }
    }

    #[test]
    fn test_write_exports_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = CsvOutlierSink::new(dir.path().to_path_buf())
            .write(&table(vec![30.5, 29.0]))
            .unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(
            content,
            "Date,TGRAD\n2024-03-01 08:00:00,30.5\n2024-03-01 08:01:00,29\n"
        );
    }

    #[test]
    fn test_write_empty_table_still_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = CsvOutlierSink::new(dir.path().to_path_buf())
            .write(&table(Vec::new()))
            .unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), "Date,TGRAD\n");
    }
}
