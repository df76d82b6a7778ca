//! Field helpers for structured logging

/// Longest prompt preview written to the log, in characters.
pub const PROMPT_PREVIEW_CHARS: usize = 100;

/// Truncate a prompt for logging preview (privacy-safe)
///
/// Returns `None` when content logging is disabled or the prompt is blank.
/// Prompts often hold family history, so they are only logged on request.
///
/// # Examples
///
/// ```
/// use genesis::logging::truncate_prompt;
///
/// assert_eq!(truncate_prompt("Where was Ada born?", false), None);
/// assert_eq!(truncate_prompt("Where was Ada born?", true).as_deref(), Some("Where was Ada born?"));
/// ```
pub fn truncate_prompt(prompt: &str, enable_content_logging: bool) -> Option<String> {
    if !enable_content_logging {
        return None;
    }
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return None;
    }
    Some(truncate_string(prompt, PROMPT_PREVIEW_CHARS))
}

/// Truncate to at most `max_chars` characters, never splitting a character.
fn truncate_string(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        None => s.to_string(),
        Some((byte_idx, _)) => format!("{}...", &s[..byte_idx]),
    }
}
