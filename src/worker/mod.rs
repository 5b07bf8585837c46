//! Summarization jobs: model call, progress reporting and delivery

pub mod deliver;
pub mod handler;
pub mod progress;
pub mod summarize;

pub use handler::{JobReport, SummaryWorker};
pub use progress::ProgressMode;

/// Canonical failure message shown to users when summarization fails.
pub const CANONICAL_FAILURE_MESSAGE: &str =
    "Sorry, I couldn't generate a summary at this time. Please try again later.";
