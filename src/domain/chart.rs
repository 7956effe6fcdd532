// Chart specifications and the tables they derive from a sensor frame
use super::error::PipelineError;
use super::frame::SensorFrame;
use super::proof_pressure::{interpolate_linear, merge_above, spread};
use chrono::NaiveDateTime;

/// The fixed battery of charts produced for every test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    RcpPressure,
    DischargePressure,
    DischargePressureDetail,
    VesselBottomTemperature,
    FlangeTemperature,
    SteamGeneratorTemperature,
    PressureGradient,
    MeanTemperature,
    MeanTemperatureGradient,
    FluidTemperature1,
    FluidTemperature2,
    FluidTemperature3,
    MetalGradient1,
    MetalGradient2,
    MetalGradient3,
    ProofPressure,
    ProofPressurePlateau,
}

impl ChartKind {
    pub const ALL: [ChartKind; 17] = [
        ChartKind::RcpPressure,
        ChartKind::DischargePressure,
        ChartKind::DischargePressureDetail,
        ChartKind::VesselBottomTemperature,
        ChartKind::FlangeTemperature,
        ChartKind::SteamGeneratorTemperature,
        ChartKind::PressureGradient,
        ChartKind::MeanTemperature,
        ChartKind::MeanTemperatureGradient,
        ChartKind::FluidTemperature1,
        ChartKind::FluidTemperature2,
        ChartKind::FluidTemperature3,
        ChartKind::MetalGradient1,
        ChartKind::MetalGradient2,
        ChartKind::MetalGradient3,
        ChartKind::ProofPressure,
        ChartKind::ProofPressurePlateau,
    ];
}

/// Which frame rows feed a chart.
#[derive(Debug, Clone, PartialEq)]
pub enum RowSelection {
    All,
    /// Rows where `column` is strictly above `sill`.
    Above { column: &'static str, sill: f64 },
    /// Each chart column keeps its own rows above `sill`; the picks are merged
    /// by timestamp and the gaps between them interpolated.
    MergeAbove { sill: f64 },
}

/// A synthetic trace added next to the sensor columns.
#[derive(Debug, Clone, PartialEq)]
pub enum DerivedTrace {
    Constant {
        key: &'static str,
        value: f64,
    },
    /// `above` on rows where `condition` exceeds `threshold`, `otherwise` elsewhere.
    Banded {
        key: &'static str,
        condition: &'static str,
        threshold: f64,
        above: f64,
        otherwise: f64,
    },
}

impl DerivedTrace {
    pub fn key(&self) -> &'static str {
        match self {
            DerivedTrace::Constant { key, .. } | DerivedTrace::Banded { key, .. } => *key,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub output_name: &'static str,
    pub title: String,
    pub y_label: &'static str,
    pub columns: Vec<&'static str>,
    pub rows: RowSelection,
    pub derived: Vec<DerivedTrace>,
    pub labels: Vec<(&'static str, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub key: String,
    pub label: String,
    pub values: Vec<f64>,
}

/// Chart-ready table handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartTable {
    pub output_name: String,
    pub title: String,
    pub y_label: String,
    pub timestamps: Vec<NaiveDateTime>,
    pub traces: Vec<Trace>,
}

impl ChartTable {
    #[cfg(test)]
    pub fn trace(&self, key: &str) -> Option<&Trace> {
        self.traces.iter().find(|t| t.key == key)
    }
}

impl ChartSpec {
    /// Every frame column the chart reads, in first-use order.
    pub fn required_columns(&self) -> Vec<&'static str> {
        let mut required: Vec<&'static str> = Vec::new();
        let mut push = |name: &'static str| {
            if !required.contains(&name) {
                required.push(name);
            }
        };

        for &column in &self.columns {
            push(column);
        }
        if let RowSelection::Above { column, .. } = self.rows {
            push(column);
        }
        for trace in &self.derived {
            if let DerivedTrace::Banded { condition, .. } = trace {
                push(*condition);
            }
        }
        required
    }

    /// Display label for a column or derived trace key.
    pub fn label_for(&self, key: &str) -> String {
        self.labels
            .iter()
            .find(|(raw, _)| *raw == key)
            .map(|(_, label)| label.clone())
            .unwrap_or_else(|| key.to_string())
    }

    /// Project, filter and decorate the frame into this chart's table.
    pub fn build(&self, frame: &SensorFrame) -> Result<ChartTable, PipelineError> {
        for column in self.required_columns() {
            frame.require(self.output_name, column)?;
        }

        let (rows, mut traces) = match self.rows {
            RowSelection::All => {
                let rows: Vec<usize> = (0..frame.len()).collect();
                let traces = self.project(frame, &rows)?;
                (rows, traces)
            }
            RowSelection::Above { column, sill } => {
                let filter = frame.require(self.output_name, column)?;
                let rows: Vec<usize> = (0..frame.len()).filter(|&i| filter[i] > sill).collect();
                let traces = self.project(frame, &rows)?;
                (rows, traces)
            }
            RowSelection::MergeAbove { sill } => self.merge(frame, sill)?,
        };

        for derived in &self.derived {
            let values = match *derived {
                DerivedTrace::Constant { value, .. } => vec![value; rows.len()],
                DerivedTrace::Banded {
                    condition,
                    threshold,
                    above,
                    otherwise,
                    ..
                } => {
                    let condition = frame.require(self.output_name, condition)?;
                    rows.iter()
                        .map(|&i| if condition[i] > threshold { above } else { otherwise })
                        .collect()
                }
            };
            traces.push(self.trace(derived.key(), values));
        }

        let timestamps = frame.timestamps();
        Ok(ChartTable {
            output_name: self.output_name.to_string(),
            title: self.title.clone(),
            y_label: self.y_label.to_string(),
            timestamps: rows.iter().map(|&i| timestamps[i]).collect(),
            traces,
        })
    }

    fn project(&self, frame: &SensorFrame, rows: &[usize]) -> Result<Vec<Trace>, PipelineError> {
        self.columns
            .iter()
            .map(|&column| {
                let values = frame.require(self.output_name, column)?;
                Ok(self.trace(column, rows.iter().map(|&i| values[i]).collect()))
            })
            .collect()
    }

    fn merge(
        &self,
        frame: &SensorFrame,
        sill: f64,
    ) -> Result<(Vec<usize>, Vec<Trace>), PipelineError> {
        let sources = self
            .columns
            .iter()
            .map(|&column| frame.require(self.output_name, column))
            .collect::<Result<Vec<_>, _>>()?;

        let merged = merge_above(frame, &sources, sill);
        let traces = self
            .columns
            .iter()
            .zip(&sources)
            .enumerate()
            .map(|(source, (&column, values))| {
                let mut filled = spread(&merged, source, values);
                interpolate_linear(&mut filled);
                self.trace(column, filled)
            })
            .collect();

        Ok((merged.iter().map(|m| m.row).collect(), traces))
    }

    fn trace(&self, key: &str, values: Vec<f64>) -> Trace {
        Trace {
            key: key.to_string(),
            label: self.label_for(key),
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::frame::test_support::ts;

    fn spec(rows: RowSelection, derived: Vec<DerivedTrace>) -> ChartSpec {
        ChartSpec {
            output_name: "test_chart",
            title: "Test".to_string(),
            y_label: "bar",
            columns: vec!["EHP001MP", "EHP002MP"],
            rows,
            derived,
            labels: vec![("EHP002MP", "Boucle 2".to_string())],
        }
    }

    fn frame() -> SensorFrame {
        SensorFrame::new(
            (0..4).map(ts).collect(),
            vec![
                ("EHP001MP".to_string(), vec![1.0, 180.0, 5.0, 174.0]),
                ("EHP002MP".to_string(), vec![2.0, 3.0, 175.0, 4.0]),
                ("TMOY".to_string(), vec![40.0, 55.0, 50.0, 61.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_build_projects_columns_and_applies_labels() {
        let spec = spec(
            RowSelection::All,
            vec![DerivedTrace::Constant { key: "val_max_grad", value: 4.0 }],
        );
        let table = spec.build(&frame()).unwrap();

        assert_eq!(table.timestamps.len(), 4);
        assert_eq!(table.traces.len(), 3);
        assert_eq!(table.trace("EHP001MP").unwrap().label, "EHP001MP");
        assert_eq!(table.trace("EHP002MP").unwrap().label, "Boucle 2");
        assert_eq!(table.trace("val_max_grad").unwrap().values, vec![4.0; 4]);
    }

    #[test]
    fn test_build_filters_rows_above_sill() {
        let spec = spec(
            RowSelection::Above { column: "EHP001MP", sill: 4.0 },
            vec![DerivedTrace::Constant { key: "limit", value: 236.0 }],
        );
        let table = spec.build(&frame()).unwrap();

        assert_eq!(table.timestamps, vec![ts(1), ts(2), ts(3)]);
        assert_eq!(table.trace("EHP001MP").unwrap().values, vec![180.0, 5.0, 174.0]);
        assert_eq!(table.trace("limit").unwrap().values.len(), 3);
    }

    #[test]
    fn test_build_banded_trace_follows_condition() {
        let spec = spec(
            RowSelection::All,
            vec![DerivedTrace::Banded {
                key: "Tmoymax",
                condition: "TMOY",
                threshold: 50.0,
                above: 28.0,
                otherwise: 14.0,
            }],
        );
        let table = spec.build(&frame()).unwrap();

        assert_eq!(
            table.trace("Tmoymax").unwrap().values,
            vec![14.0, 28.0, 14.0, 28.0]
        );
        assert_eq!(spec.required_columns(), vec!["EHP001MP", "EHP002MP", "TMOY"]);
    }

    #[test]
    fn test_build_merges_proof_pressure_rows() {
        let spec = spec(RowSelection::MergeAbove { sill: 172.0 }, vec![]);
        let table = spec.build(&frame()).unwrap();

        assert_eq!(table.timestamps, vec![ts(1), ts(2), ts(3)]);
        assert_eq!(table.trace("EHP001MP").unwrap().values, vec![180.0, 177.0, 174.0]);

        let second = &table.trace("EHP002MP").unwrap().values;
        assert!(second[0].is_nan());
        assert_eq!(&second[1..], &[175.0, 175.0]);
    }

    #[test]
    fn test_build_reports_missing_column() {
        let mut spec = spec(RowSelection::All, vec![]);
        spec.columns.push("EHP003MP");

        match spec.build(&frame()) {
            Err(PipelineError::MissingColumn { chart, column }) => {
                assert_eq!(chart, "test_chart");
                assert_eq!(column, "EHP003MP");
            }
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }
}
