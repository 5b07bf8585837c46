//! All model-service functionality

pub mod client;
pub mod model;

// Re-export main types for convenience
pub use client::ModelServiceClient;
pub use model::{
    GenerationParams, MAX_INPUT_TOKENS, MAX_OUTPUT_TOKENS, NO_REPEAT_NGRAM_SIZE,
    SummarizationModel,
};
