// Operational modes and their threshold bundles
use super::error::PipelineError;
use std::fmt;
use std::str::FromStr;

/// Plant series the hydrostatic test is run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// 900 MW series, three steam generators.
    Series900,
    /// 1300 MW P4/P'4 series, four steam generators.
    Pqy,
    /// 1300 MW P'4 variant, four steam generators.
    Dpy,
}

impl Mode {
    #[cfg(test)]
    pub const ALL: [Mode; 3] = [Mode::Series900, Mode::Pqy, Mode::Dpy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Series900 => "900",
            Mode::Pqy => "PQY",
            Mode::Dpy => "DPY",
        }
    }

    /// 1300 MW modes carry a fourth steam generator loop.
    pub fn has_fourth_loop(&self) -> bool {
        matches!(self, Mode::Pqy | Mode::Dpy)
    }

    /// Threshold bundle governing the charging pump discharge charts.
    pub fn thresholds(&self) -> ThresholdBundle {
        match self {
            Mode::Series900 => ThresholdBundle {
                pressure_limit: 241.0,
                trip_threshold: 235.5,
                alarm_threshold: 230.0,
                pump_tag: "RIS011PO",
            },
            Mode::Pqy => ThresholdBundle {
                pressure_limit: 244.0,
                trip_threshold: 239.0,
                alarm_threshold: 234.0,
                pump_tag: "RCV191PO",
            },
            Mode::Dpy => ThresholdBundle {
                pressure_limit: 236.0,
                trip_threshold: 232.0,
                alarm_threshold: 228.0,
                pump_tag: "RCV191PO",
            },
        }
    }
}

impl FromStr for Mode {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "900" => Ok(Mode::Series900),
            "PQY" => Ok(Mode::Pqy),
            "DPY" => Ok(Mode::Dpy),
            other => Err(PipelineError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdBundle {
    pub pressure_limit: f64,
    pub trip_threshold: f64,
    pub alarm_threshold: f64,
    pub pump_tag: &'static str,
}

/// Resolve a mode selector string into its threshold bundle.
pub fn resolve(mode: &str) -> Result<ThresholdBundle, PipelineError> {
    Ok(mode.parse::<Mode>()?.thresholds())
}
