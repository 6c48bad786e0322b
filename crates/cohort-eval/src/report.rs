use crate::summary::AttributeSummary;

/// Render summaries as plain text tables.
pub fn render_summary(summaries: &[AttributeSummary]) -> String {
    let mut lines = Vec::new();
    for entry in summaries {
        let summary = &entry.summary;
        lines.push(format!("{} ({} values)", entry.attribute, summary.total));
        lines.push(format!(
            "  {:<14} {:>8} {:>9} {:>10} {:>9}",
            "range", "observed", "observed%", "expected", "expected%"
        ));
        for bucket in &summary.buckets {
            lines.push(format!(
                "  {:<14} {:>8} {:>8.2}% {:>10.1} {:>8.2}%",
                bucket.label,
                bucket.observed,
                bucket.observed_pct,
                bucket.expected,
                bucket.expected_pct
            ));
        }
        if summary.unmatched > 0 {
            lines.push(format!("  unmatched: {}", summary.unmatched));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::{BucketRange, summarize};
    use cohort_core::GeneratedValue;

    #[test]
    fn renders_one_row_per_bucket() {
        let values: Vec<GeneratedValue> = (1..=4).map(GeneratedValue::Int).collect();
        let ranges = vec![
            BucketRange::new("1..=2", 1, 3, 0.5),
            BucketRange::new("3..=4", 3, 5, 0.5),
        ];
        let summary = summarize(&values, &ranges).expect("summary");
        let text = render_summary(&[AttributeSummary {
            attribute: "age".to_string(),
            summary,
        }]);
        assert!(text.starts_with("age (4 values)"));
        assert!(text.contains("1..=2"));
        assert!(text.contains("50.00%"));
        assert!(!text.contains("unmatched"));
    }
}
