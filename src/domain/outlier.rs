// Out-of-criteria extraction - rows breaching gradient safety bounds
use super::error::PipelineError;
use super::frame::SensorFrame;
use chrono::NaiveDateTime;

/// Mean-temperature cutoff selecting the temperature-gradient bound set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegregationThreshold(f64);

impl SegregationThreshold {
    pub const STANDARD: SegregationThreshold = SegregationThreshold(50.0);
    pub const CARBON_SEGREGATION: SegregationThreshold = SegregationThreshold(60.0);

    pub fn from_carbon_segregation(carbon_segregation: bool) -> Self {
        if carbon_segregation {
            Self::CARBON_SEGREGATION
        } else {
            Self::STANDARD
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for SegregationThreshold {
    fn default() -> Self {
        Self::STANDARD
    }
}

pub const PRESSURE_GRADIENT_BOUND: f64 = 4.0;
pub const HOT_TEMPERATURE_GRADIENT_BOUND: f64 = 28.0;
pub const COLD_TEMPERATURE_GRADIENT_BOUND: f64 = 14.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionSide {
    Above,
    AtOrBelow,
}

/// Restricts a criterion to rows where a companion column sits on one side
/// of a threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Condition {
    pub column: &'static str,
    pub threshold: f64,
    pub side: ConditionSide,
}

impl Condition {
    fn holds(&self, value: f64) -> bool {
        match self.side {
            ConditionSide::Above => value > self.threshold,
            ConditionSide::AtOrBelow => value <= self.threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutlierCriterion {
    pub source_column: &'static str,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub condition: Option<Condition>,
    pub output_name: &'static str,
}

impl OutlierCriterion {
    fn below(source_column: &'static str, bound: f64, output_name: &'static str) -> Self {
        Self {
            source_column,
            lower: Some(bound),
            upper: None,
            condition: None,
            output_name,
        }
    }

    fn above(source_column: &'static str, bound: f64, output_name: &'static str) -> Self {
        Self {
            source_column,
            lower: None,
            upper: Some(bound),
            condition: None,
            output_name,
        }
    }

    fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Bounds are exclusive: a reading equal to a bound is within criteria.
    pub fn violated_by(&self, value: f64) -> bool {
        self.lower.is_some_and(|lower| value < lower)
            || self.upper.is_some_and(|upper| value > upper)
    }

    pub fn required_columns(&self) -> Vec<&'static str> {
        let mut columns = vec![self.source_column];
        if let Some(condition) = &self.condition {
            columns.push(condition.column);
        }
        columns
    }

    pub fn filter(&self, frame: &SensorFrame) -> Result<OutlierTable, PipelineError> {
        let values = frame.require(self.output_name, self.source_column)?;
        let condition = match &self.condition {
            Some(condition) => {
                let companion = frame.require(self.output_name, condition.column)?;
                Some((condition, companion))
            }
            None => None,
        };

        let rows = (0..frame.len()).filter(|&i| {
            let in_scope = condition
                .map(|(condition, companion)| condition.holds(companion[i]))
                .unwrap_or(true);
            in_scope && self.violated_by(values[i])
        });

        let (timestamps, values) = rows.map(|i| (frame.timestamps()[i], values[i])).unzip();
        Ok(OutlierTable {
            output_name: self.output_name.to_string(),
            column: self.source_column.to_string(),
            timestamps,
            values,
        })
    }
}

/// Rows of one criterion, exported for manual review.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierTable {
    pub output_name: String,
    pub column: String,
    pub timestamps: Vec<NaiveDateTime>,
    pub values: Vec<f64>,
}

impl OutlierTable {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OutlierExtractor {
    segregation: SegregationThreshold,
}

impl OutlierExtractor {
    pub fn new(segregation: SegregationThreshold) -> Self {
        Self { segregation }
    }

    /// The eight out-of-criteria checks, pressure gradients first.
    pub fn criteria(&self) -> Vec<OutlierCriterion> {
        const HOT: f64 = HOT_TEMPERATURE_GRADIENT_BOUND;
        const COLD: f64 = COLD_TEMPERATURE_GRADIENT_BOUND;
        let hot = Condition {
            column: "TMOY",
            threshold: self.segregation.value(),
            side: ConditionSide::Above,
        };
        let cold = Condition {
            side: ConditionSide::AtOrBelow,
            ..hot
        };

        vec![
            OutlierCriterion::below("EHP001MPGrad", -PRESSURE_GRADIENT_BOUND, "EHP1MPGrad_inf-4"),
            OutlierCriterion::above("EHP001MPGrad", PRESSURE_GRADIENT_BOUND, "EHP1MPGrad_sup4"),
            OutlierCriterion::below("EHP002MPGrad", -PRESSURE_GRADIENT_BOUND, "EHP2MPGrad_inf-4"),
            OutlierCriterion::above("EHP002MPGrad", PRESSURE_GRADIENT_BOUND, "EHP2MPGrad_sup4"),
            OutlierCriterion::below("TGRAD", -HOT, "TGRAD_inf-28").when(hot),
            OutlierCriterion::above("TGRAD", HOT, "TGRAD_sup28").when(hot),
            OutlierCriterion::below("TGRAD", -COLD, "TGRAD_inf-14").when(cold),
            OutlierCriterion::above("TGRAD", COLD, "TGRAD_sup14").when(cold),
        ]
    }

    /// Run every criterion against the frame, empty results included.
    ///
    /// All columns are checked before any row is filtered, so a missing tag
    /// fails the extraction as a whole.
    pub fn extract(
        &self,
        frame: &SensorFrame,
    ) -> Result<Vec<(OutlierCriterion, OutlierTable)>, PipelineError> {
        let criteria = self.criteria();
        for criterion in &criteria {
            for column in criterion.required_columns() {
                frame.require(criterion.output_name, column)?;
            }
        }

        criteria
            .into_iter()
            .map(|criterion| {
                let table = criterion.filter(frame)?;
                Ok((criterion, table))
            })
            .collect()
    }
}
