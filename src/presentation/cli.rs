// Command-line surface for a charting run
use crate::application::task::RunRequest;
use crate::domain::error::PipelineError;
use crate::domain::mode::{Mode, resolve};
use crate::domain::outlier::SegregationThreshold;
use clap::Parser;
use std::path::PathBuf;

/// Generate the hydrostatic-test chart battery and its out-of-criteria extracts.
#[derive(Debug, Parser)]
#[command(name = "hydrotest-charts", version)]
pub struct Args {
    /// Acquisition-system CSV export
    pub input: PathBuf,

    /// Reactor series: 900, PQY or DPY
    #[arg(long)]
    pub mode: String,

    /// Move the hot/cold temperature-gradient boundary from 50 to 60 °C
    #[arg(long)]
    pub carbon_segregation: bool,

    /// Procedure reference and site printed under every chart
    #[arg(long)]
    pub caption: String,

    /// Override the worker count from configuration
    #[arg(long)]
    pub workers: Option<usize>,
}

impl Args {
    pub fn to_request(&self) -> Result<RunRequest, PipelineError> {
        let thresholds = resolve(&self.mode)?;
        let mode: Mode = self.mode.parse()?;
        tracing::info!(
            %mode,
            pressure_limit = thresholds.pressure_limit,
            trip_threshold = thresholds.trip_threshold,
            alarm_threshold = thresholds.alarm_threshold,
            pump = thresholds.pump_tag,
            "Threshold bundle resolved"
        );

        Ok(RunRequest {
            mode,
            caption: self.caption.clone(),
            segregation: SegregationThreshold::from_carbon_segregation(self.carbon_segregation),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("hydrotest-charts").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_args_map_to_request() {
        let args = parse(&[
            "essai.csv",
            "--mode",
            "PQY",
            "--carbon-segregation",
            "--caption",
            "D02-ARV-01-156-210 PAL",
        ]);
        let request = args.to_request().unwrap();

        assert_eq!(args.input, PathBuf::from("essai.csv"));
        assert_eq!(request.mode, Mode::Pqy);
        assert_eq!(request.segregation, SegregationThreshold::CARBON_SEGREGATION);
        assert_eq!(request.caption, "D02-ARV-01-156-210 PAL");
        assert_eq!(args.workers, None);
    }

    #[test]
    fn test_segregation_defaults_to_standard() {
        let request = parse(&["essai.csv", "--mode", "900", "--caption", "x"])
            .to_request()
            .unwrap();
        assert_eq!(request.segregation, SegregationThreshold::STANDARD);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let args = parse(&["essai.csv", "--mode", "1450", "--caption", "x"]);
        assert!(matches!(
            args.to_request(),
            Err(PipelineError::UnknownMode(mode)) if mode == "1450"
        ));
    }

    #[test]
    fn test_caption_is_required() {
        let result = Args::try_parse_from(["hydrotest-charts", "essai.csv", "--mode", "900"]);
        assert!(result.is_err());
    }
}
