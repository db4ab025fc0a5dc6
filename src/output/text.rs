use super::{ComparisonRow, ComparisonSummary, Formatter};

/// Column titles, right-aligned to the widths used by `format_row`
const HEADER: &str = " index       time        input        batch       stream       diff    reference";

pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_row(&self, row: &ComparisonRow) -> String {
        let reference = row
            .reference
            .map_or("-".to_string(), |r| format!("{:>12.6}", r));
        format!(
            "{:>6} {:>9.4}s {:>12.6} {:>12.6} {:>12.6} {:>10.2e} {:>12}",
            row.index, row.time_s, row.input, row.batch, row.stream, row.difference, reference
        )
    }

    fn format_summary(&self, summary: &ComparisonSummary) -> String {
        let verdict = if summary.passed { "MATCH" } else { "DIVERGED" };
        let reference = summary
            .max_reference_difference
            .map_or(String::new(), |d| format!(", SOS reference max diff {:.3e}", d));
        format!(
            "{}: {} samples, order {} @ {} Hz / {} Hz, init {}: max |diff| {:.3e}, mean |diff| {:.3e}, max rel {:.3e} (tolerance {:.1e}){}",
            verdict,
            summary.samples,
            summary.order,
            summary.cutoff_hz,
            summary.sample_rate_hz,
            summary.init,
            summary.max_abs_difference,
            summary.mean_abs_difference,
            summary.max_rel_difference,
            summary.tolerance,
            reference
        )
    }

    fn header(&self) -> Option<&'static str> {
        Some(HEADER)
    }
}
