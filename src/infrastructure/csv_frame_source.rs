// CSV ingestion of acquisition-system exports into a sensor frame
use crate::domain::frame::SensorFrame;
use crate::infrastructure::config::IngestSettings;
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct CsvFrameSource {
    settings: IngestSettings,
}

impl CsvFrameSource {
    pub fn new(settings: IngestSettings) -> Self {
        Self { settings }
    }

    pub fn load(&self, path: &Path) -> Result<SensorFrame> {
        let file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        let frame = self
            .read(BufReader::new(file))
            .with_context(|| format!("failed to ingest {}", path.display()))?;
        if frame.is_empty() {
            tracing::warn!(path = %path.display(), "Export holds no data rows");
        }

        tracing::info!(
            path = %path.display(),
            rows = frame.len(),
            columns = frame.column_names().len(),
            "Sensor frame loaded"
        );
        Ok(frame)
    }

    /// Parse an export: preamble, header row, then one row per acquisition.
    /// Empty or non-numeric cells become missing readings.
    pub fn read<R: BufRead>(&self, mut reader: R) -> Result<SensorFrame> {
        let delimiter = match self.settings.delimiter.as_bytes() {
            [byte] => *byte,
            _ => anyhow::bail!(
                "delimiter must be a single byte, got {:?}",
                self.settings.delimiter
            ),
        };

        let mut line = String::new();
        for skipped in 0..self.settings.skip_rows {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                anyhow::bail!(
                    "file ended after {} of {} preamble lines",
                    skipped,
                    self.settings.skip_rows
                );
            }
        }

        let mut csv = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv.headers().context("failed to read header row")?.clone();
        let timestamp_idx = headers
            .iter()
            .position(|h| h == self.settings.timestamp_column)
            .with_context(|| {
                format!("timestamp column {} not found", self.settings.timestamp_column)
            })?;

        let sensors: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(idx, name)| *idx != timestamp_idx && !name.is_empty())
            .map(|(idx, name)| (idx, name.to_string()))
            .collect();

        let mut timestamps = Vec::new();
        let mut values: Vec<Vec<f64>> = vec![Vec::new(); sensors.len()];
        for (row, record) in csv.records().enumerate() {
            let record = record.with_context(|| format!("malformed data row {}", row + 1))?;
            let raw = record.get(timestamp_idx).unwrap_or_default();
            let timestamp = NaiveDateTime::parse_from_str(raw, &self.settings.timestamp_format)
                .with_context(|| format!("bad timestamp {:?} on data row {}", raw, row + 1))?;
            timestamps.push(timestamp);

            for ((idx, _), column) in sensors.iter().zip(values.iter_mut()) {
                column.push(parse_reading(record.get(*idx).unwrap_or_default()));
            }
        }

        let columns = sensors
            .into_iter()
            .map(|(_, name)| name)
            .zip(values)
            .collect();
        let frame = SensorFrame::new(timestamps, columns)?;
        Ok(frame.every_nth(self.settings.stride))
    }
}

fn parse_reading(cell: &str) -> f64 {
    if cell.is_empty() {
        return f64::NAN;
    }
    cell.replace(',', ".").parse().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn source(skip_rows: usize, stride: usize) -> CsvFrameSource {
        CsvFrameSource::new(IngestSettings {
            skip_rows,
            stride,
            ..IngestSettings::default()
        })
    }

    #[test]
    fn test_read_skips_preamble_and_parses_columns() {
        let input = "\
Installation;FLA
Essai;EHP
Horodatage;EHP001MP;TMOY
01/03/2024 08:00:00;12,5;40
01/03/2024 08:01:00;;41.5
01/03/2024 08:02:00;n/a;43
";
        let frame = source(2, 1).read(input.as_bytes()).unwrap();

        assert_eq!(frame.len(), 3);
        assert_eq!(frame.column_names(), &["EHP001MP".to_string(), "TMOY".to_string()]);
        assert_eq!(
            frame.timestamps()[1],
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(8, 1, 0).unwrap()
        );

        let pressure = frame.column("EHP001MP").unwrap();
        assert_eq!(pressure[0], 12.5);
        assert!(pressure[1].is_nan());
        assert!(pressure[2].is_nan());
        assert_eq!(frame.column("TMOY").unwrap(), &[40.0, 41.5, 43.0]);
    }

    #[test]
    fn test_read_downsamples_by_stride() {
        let mut input = String::from("Horodatage;TGRAD\n");
        for minute in 0..25 {
            input.push_str(&format!("01/03/2024 08:{:02}:00;{}\n", minute, minute));
        }

        let frame = source(0, 10).read(input.as_bytes()).unwrap();
        assert_eq!(frame.column("TGRAD").unwrap(), &[0.0, 10.0, 20.0]);
    }

    #[test]
    fn test_read_requires_timestamp_column() {
        let input = "Date;TMOY\n01/03/2024 08:00:00;40\n";
        let err = source(0, 1).read(input.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Horodatage"));
    }

    #[test]
    fn test_header_only_export_is_empty_frame() {
        let frame = source(0, 1).read("Horodatage;TMOY\n".as_bytes()).unwrap();
        assert!(frame.is_empty());
        assert_eq!(frame.column("TMOY").unwrap(), &[] as &[f64]);
    }

    #[test]
    fn test_read_rejects_short_preamble() {
        let input = "only one line\n";
        assert!(source(20, 1).read(input.as_bytes()).is_err());
    }

    #[test]
    fn test_load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ehp.csv");
        std::fs::write(&path, "Horodatage;TMOY\n01/03/2024 08:00:00;40\n").unwrap();

        let frame = source(0, 1).load(&path).unwrap();
        assert_eq!(frame.column("TMOY").unwrap(), &[40.0]);
    }
}
