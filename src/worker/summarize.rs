use tracing::debug;

use crate::ai::TextTransform;
use crate::ai::prompt_builder::{condense_request, shorten_request};
use crate::errors::{SummaryStage, TransformError};

/// Run both summarization passes over one text.
///
/// The second pass only sees the first pass output. A failure in either pass
/// is returned tagged with the stage it happened in.
pub async fn summarize_text<T>(transform: &T, text: &str) -> Result<String, TransformError>
where
    T: TextTransform + ?Sized,
{
    let condensed = transform
        .transform(&condense_request(text))
        .await
        .map_err(|e| e.in_stage(SummaryStage::Condense))?;
    debug!("Condensed summary: {}", condensed);

    transform
        .transform(&shorten_request(&condensed))
        .await
        .map_err(|e| e.in_stage(SummaryStage::Shorten))
}
