use super::{ComparisonRow, ComparisonSummary, Formatter};

/// One JSON object per line
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_row(&self, row: &ComparisonRow) -> String {
        // NaN and infinities come out as null
        serde_json::to_string(row).unwrap_or_default()
    }

    fn format_summary(&self, summary: &ComparisonSummary) -> String {
        serde_json::json!({ "summary": summary }).to_string()
    }
}
