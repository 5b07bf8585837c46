use tracing::{debug, warn};

use crate::ai::{GenerationParams, MAX_INPUT_TOKENS, SummarizationModel};
use crate::core::models::SummaryLength;
use crate::errors::BotError;

/// Run one tokenize → generate → detokenize pass.
///
/// Input past [`MAX_INPUT_TOKENS`] is truncated, never rejected. The ids are clamped here
/// as well in case the tokenizer ignores the `truncation` flag.
///
/// # Errors
///
/// Any model-service failure is returned as-is.
pub async fn summarize_text(
    model: &dyn SummarizationModel,
    text: &str,
    length: SummaryLength,
) -> Result<String, BotError> {
    let mut input_ids = model.tokenize(text, MAX_INPUT_TOKENS, true).await?;
    if input_ids.len() > MAX_INPUT_TOKENS {
        warn!(
            tokens = input_ids.len(),
            limit = MAX_INPUT_TOKENS,
            "Tokenizer returned more ids than requested; truncating"
        );
        input_ids.truncate(MAX_INPUT_TOKENS);
    }

    let params = GenerationParams::with_min_length(length.min_length());
    debug!(input_tokens = input_ids.len(), ?params, "Generating summary");
    let output_ids = model.generate(&input_ids, params).await?;

    let summary = model.detokenize(&output_ids, true).await?;
    Ok(summary.trim().to_string())
}
