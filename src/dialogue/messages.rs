//! User-facing texts of the dialogue.

use crate::core::models::SummaryLength;

/// Approximate word count above which input gets cut at the model's token ceiling.
pub const ADVISORY_WORD_LIMIT: usize = 600;

pub const GUIDANCE_CHOOSE_LENGTH: &str =
    "Please choose a summary length first: Short, Medium or Long.";

pub const LENGTH_PROMPT: &str = "Choose a summary length: Short, Medium or Long.";

pub const ANOTHER_ROUND_PROMPT: &str =
    "Want to summarize another text? Choose a summary length: Short, Medium or Long.";

pub const ANALYZING: &str = "Analyzing your text...";

pub const STILL_WORKING: &str =
    "I'm still working on your previous text. Please wait for the summary before sending another one.";

pub const PROGRESS_STARTED: &str = "Generating summary...";
pub const PROGRESS_INDETERMINATE: &str = "Generating summary... this can take a while ⏳";
pub const PROGRESS_DONE: &str = "Summary ready ✅";
pub const PROGRESS_FAILED: &str = "Summary generation failed ❌";

pub const EMPTY_SUMMARY: &str =
    "The model returned an empty summary. Try a longer text or a different length.";

#[must_use]
pub fn welcome(model_name: &str) -> String {
    format!(
        "Welcome to the text summarization bot! 📚✨\n\
         This bot uses the {model_name} model to write short abstractive summaries of your texts."
    )
}

#[must_use]
pub fn instructions() -> String {
    let mut text = String::from("How to use the bot:\n");
    text.push_str("1. Getting started: press the 'Continue' button below. ▶️\n");
    text.push_str("2. Choosing a summary length:\n");
    for (len, blurb) in [
        (SummaryLength::Short, "for the briefest overview ✨"),
        (SummaryLength::Medium, "for a more detailed summary 🌟"),
        (SummaryLength::Long, "for the most detailed summary 🌠"),
    ] {
        text.push_str(&format!(
            "   - {}: {} (at least {} tokens).\n",
            len.label(),
            blurb,
            len.min_length()
        ));
    }
    text.push_str("3. Sending text: after choosing a length, send the text you want summarized. 🖊️\n");
    text.push_str("4. Getting the result: wait while the bot processes your text. ⏳\n\n");
    text.push_str(&format!(
        "Note: keep your text under about {ADVISORY_WORD_LIMIT} words; longer texts are cut off before summarizing. ⚠️"
    ));
    text
}

#[must_use]
pub fn length_confirmation(length: SummaryLength) -> String {
    format!(
        "Summary length selected: {}. Now send me the text to summarize.",
        length.label()
    )
}

#[must_use]
pub fn progress_tick(percent: u32) -> String {
    format!("{PROGRESS_STARTED} {percent}%")
}
