use anyhow::Context;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub ingest: IngestSettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub scheduler: SchedulerSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IngestSettings {
    pub delimiter: String,
    /// Acquisition-system preamble lines before the header row.
    pub skip_rows: usize,
    pub timestamp_column: String,
    pub timestamp_format: String,
    /// Keep one row out of `stride`.
    pub stride: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            delimiter: ";".to_string(),
            skip_rows: 20,
            timestamp_column: "Horodatage".to_string(),
            timestamp_format: "%d/%m/%Y %H:%M:%S".to_string(),
            stride: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputSettings {
    pub chart_dir: PathBuf,
    pub report_dir: PathBuf,
    pub outlier_dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            chart_dir: PathBuf::from("courbes_png"),
            report_dir: PathBuf::from("courbes_word"),
            outlier_dir: PathBuf::from("Hors_criteres"),
        }
    }
}

impl OutputSettings {
    pub fn ensure_dirs(&self) -> anyhow::Result<()> {
        for dir in [&self.chart_dir, &self.report_dir, &self.outlier_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SchedulerSettings {
    /// Overrides the half-the-cores default when set.
    pub workers: Option<usize>,
}

/// Load `config/hydrotest.toml` (optional) with `HYDROTEST__SECTION__KEY`
/// environment overrides on top.
pub fn load_settings() -> anyhow::Result<Settings> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/hydrotest").required(false))
        .add_source(environment())
        .build()?;

    Ok(settings.try_deserialize()?)
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("HYDROTEST")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
