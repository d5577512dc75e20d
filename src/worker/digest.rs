use crate::core::models::Aggregation;

/// Render the aggregation as numbered plain-text sections.
#[must_use]
pub fn format_digest(aggregation: &Aggregation) -> String {
    let mut digest = String::new();
    for (index, summary) in aggregation.summaries().enumerate() {
        digest.push_str(&entry_header(index + 1));
        digest.push('\n');
        digest.push_str(summary);
        digest.push_str("\n\n");
    }
    digest
}

#[must_use]
pub fn entry_header(position: usize) -> String {
    format!("{position}th summarized result")
}
