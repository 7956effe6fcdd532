// Sensor frame - timestamp-indexed numeric telemetry of one test run
use super::error::PipelineError;
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Read-only table of sensor columns sharing one timestamp index.
///
/// Missing readings are stored as `NaN`, so every comparison against a
/// missing value is false and the row never passes a filter.
#[derive(Debug, Clone, Default)]
pub struct SensorFrame {
    timestamps: Vec<NaiveDateTime>,
    names: Vec<String>,
    columns: HashMap<String, Vec<f64>>,
}

impl SensorFrame {
    pub fn new(
        timestamps: Vec<NaiveDateTime>,
        columns: Vec<(String, Vec<f64>)>,
    ) -> Result<Self, PipelineError> {
        if let Some(pos) = timestamps.windows(2).position(|w| w[1] < w[0]) {
            return Err(PipelineError::InvalidFrame(format!(
                "timestamp at row {} goes backwards ({} after {})",
                pos + 1,
                timestamps[pos + 1],
                timestamps[pos]
            )));
        }

        let mut names = Vec::with_capacity(columns.len());
        let mut by_name = HashMap::with_capacity(columns.len());
        for (name, values) in columns {
            if values.len() != timestamps.len() {
                return Err(PipelineError::InvalidFrame(format!(
                    "column {} has {} values for {} timestamps",
                    name,
                    values.len(),
                    timestamps.len()
                )));
            }
            if by_name.insert(name.clone(), values).is_some() {
                return Err(PipelineError::InvalidFrame(format!("duplicate column {}", name)));
            }
            names.push(name);
        }

        Ok(Self {
            timestamps,
            names,
            columns: by_name,
        })
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Look up a column a chart or criterion depends on.
    pub fn require(&self, owner: &str, name: &str) -> Result<&[f64], PipelineError> {
        self.column(name)
            .ok_or_else(|| PipelineError::missing_column(owner, name))
    }

    /// Keep one row out of every `stride`, starting with the first.
    pub fn every_nth(&self, stride: usize) -> SensorFrame {
        let stride = stride.max(1);

        Self {
            timestamps: self.timestamps.iter().copied().step_by(stride).collect(),
            names: self.names.clone(),
            columns: self
                .columns
                .iter()
                .map(|(name, values)| {
                    (name.clone(), values.iter().copied().step_by(stride).collect())
                })
                .collect(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::ts;
    use super::*;

    #[test]
    fn test_rejects_backwards_timestamps() {
        let result = SensorFrame::new(vec![ts(0), ts(2), ts(1)], vec![]);
        assert!(matches!(result, Err(PipelineError::InvalidFrame(_))));
    }

    #[test]
    fn test_rejects_ragged_columns() {
        let result = SensorFrame::new(
            vec![ts(0), ts(1)],
            vec![("TMOY".to_string(), vec![40.0])],
        );
        assert!(matches!(result, Err(PipelineError::InvalidFrame(_))));
    }

    #[test]
    fn test_require_reports_owner_and_column() {
        let frame = SensorFrame::new(vec![ts(0)], vec![("TMOY".to_string(), vec![40.0])]).unwrap();

        assert_eq!(frame.require("Tmoy", "TMOY").unwrap(), &[40.0]);
        match frame.require("Tgrad", "TGRAD") {
            Err(PipelineError::MissingColumn { chart, column }) => {
                assert_eq!(chart, "Tgrad");
                assert_eq!(column, "TGRAD");
            }
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_every_nth_keeps_first_row_of_each_stride() {
        let frame = SensorFrame::new(
            (0..7).map(ts).collect(),
            vec![("EHP001MP".to_string(), (0..7).map(|v| v as f64).collect())],
        )
        .unwrap();

        let sampled = frame.every_nth(3);
        assert_eq!(sampled.timestamps(), &[ts(0), ts(3), ts(6)]);
        assert_eq!(sampled.column("EHP001MP").unwrap(), &[0.0, 3.0, 6.0]);
        assert_eq!(sampled.column_names(), frame.column_names());
    }
}
