use super::{ComparisonRow, ComparisonSummary, Formatter};

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format_row(&self, row: &ComparisonRow) -> String {
        let reference = row.reference.map_or(String::new(), |r| format!("{:.12e}", r));
        format!(
            "{},{:.6},{:.12e},{:.12e},{:.12e},{:.3e},{}",
            row.index, row.time_s, row.input, row.batch, row.stream, row.difference, reference
        )
    }

    fn format_summary(&self, summary: &ComparisonSummary) -> String {
        format!(
            "# samples={} max_abs_diff={:.3e} mean_abs_diff={:.3e} max_rel_diff={:.3e} tolerance={:.1e} passed={}",
            summary.samples,
            summary.max_abs_difference,
            summary.mean_abs_difference,
            summary.max_rel_difference,
            summary.tolerance,
            summary.passed
        )
    }

    fn header(&self) -> Option<&'static str> {
        Some("index,time_s,input,batch,stream,difference,reference")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::{sample_row, sample_summary};

    #[test]
    fn test_row_columns_match_header() {
        let f = CsvFormatter;
        let columns = f.header().unwrap().split(',').count();
        assert_eq!(f.format_row(&sample_row(None)).split(',').count(), columns);
        assert_eq!(f.format_row(&sample_row(Some(0.5))).split(',').count(), columns);
    }

    #[test]
    fn test_summary_is_comment() {
        assert!(CsvFormatter.format_summary(&sample_summary(true)).starts_with('#'));
    }
}
