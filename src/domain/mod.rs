// Domain layer - telemetry frame, thresholds, chart and out-of-criteria rules
pub mod catalog;
pub mod chart;
pub mod error;
pub mod frame;
pub mod mode;
pub mod outlier;
pub mod proof_pressure;
