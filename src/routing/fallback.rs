//! Pre-authored responses streamed when no provider can answer.

use super::RequestType;

/// Canned answer for `request_type`.
pub fn fallback_text(request_type: RequestType) -> &'static str {
    match request_type {
        RequestType::Chat => {
            "I'm having trouble reaching our AI services right now. Your question has been \
             saved, so please try again in a moment and we'll pick up where you left off."
        }
        RequestType::Analysis => {
            "A detailed analysis isn't available at the moment. In the meantime, review the \
             dates, places and sources attached to each record; gaps and conflicts there are \
             usually the best place to start."
        }
        RequestType::Generation => {
            "Content generation is temporarily unavailable. Please try again shortly; your \
             family records are safe and nothing has been lost."
        }
        RequestType::Coding => {
            "Technical assistance is temporarily unavailable. Please retry in a few minutes."
        }
        RequestType::Business => {
            "Business insights are temporarily unavailable. Heritage services tend to grow \
             through trusted community partnerships and clear, respectful storytelling; we'll \
             have tailored recommendations for you as soon as our analysis service is back."
        }
        RequestType::Cultural => {
            "Cultural context is temporarily unavailable. Family traditions, naming customs and \
             migration stories carry deep meaning, and we want to treat yours with care. Please \
             try again shortly for a complete answer."
        }
        RequestType::Creative => {
            "Every family has a story worth telling. Our storytelling assistant is resting for \
             a moment; please try again soon and we'll help you bring your ancestors' journey \
             to life."
        }
        RequestType::Technical => {
            "Technical details are temporarily unavailable. Please retry in a few minutes."
        }
        RequestType::Research => {
            "Research assistance is temporarily unavailable. Census records, parish registers \
             and immigration manifests are good places to continue while we reconnect."
        }
    }
}

/// Split text into word chunks that concatenate back to the original.
pub fn word_chunks(text: &str) -> Vec<String> {
    text.split_inclusive(' ').map(str::to_string).collect()
}
