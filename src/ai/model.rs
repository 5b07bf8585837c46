use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::BotError;

/// Input ceiling: longer inputs are truncated to this many tokens.
pub const MAX_INPUT_TOKENS: usize = 512;
/// Output ceiling passed to generation.
pub const MAX_OUTPUT_TOKENS: u32 = 512;
/// Forbid repeating any bigram in the generated text.
pub const NO_REPEAT_NGRAM_SIZE: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub min_length: u32,
    pub max_length: u32,
    pub no_repeat_ngram_size: u32,
}

impl GenerationParams {
    /// Parameters used for every summary; only the minimum length varies.
    #[must_use]
    pub const fn with_min_length(min_length: u32) -> Self {
        Self {
            min_length,
            max_length: MAX_OUTPUT_TOKENS,
            no_repeat_ngram_size: NO_REPEAT_NGRAM_SIZE,
        }
    }
}

/// A pretrained sequence-to-sequence model.
///
/// `generate` may take a long time and cannot be cancelled once started.
#[async_trait]
pub trait SummarizationModel: Send + Sync {
    async fn tokenize(
        &self,
        text: &str,
        max_length: usize,
        truncation: bool,
    ) -> Result<Vec<u32>, BotError>;

    async fn generate(
        &self,
        input_ids: &[u32],
        params: GenerationParams,
    ) -> Result<Vec<u32>, BotError>;

    async fn detokenize(&self, ids: &[u32], skip_special_tokens: bool)
    -> Result<String, BotError>;
}
