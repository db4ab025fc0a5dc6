mod csv;
mod json;
mod text;

use chrono::Utc;
use serde::Serialize;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::text::TextFormatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Csv,
    Json,
}

/// One time step of a batch vs. streaming comparison
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRow {
    pub index: usize,
    pub time_s: f64,
    pub input: f64,
    pub batch: f64,
    pub stream: f64,
    pub difference: f64,
    /// Second-order-section output, present when both runs start at rest
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<f64>,
}

/// Whole-run outcome of a comparison
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonSummary {
    pub generated_at: String,
    pub samples: usize,
    pub order: usize,
    pub cutoff_hz: f64,
    pub sample_rate_hz: f64,
    pub init: String,
    pub max_abs_difference: f64,
    pub mean_abs_difference: f64,
    pub max_rel_difference: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_reference_difference: Option<f64>,
    pub tolerance: f64,
    pub passed: bool,
}

pub trait Formatter: Send {
    fn format_row(&self, row: &ComparisonRow) -> String;

    fn format_summary(&self, summary: &ComparisonSummary) -> String;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

pub fn iso8601_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
