//! Cleanup for text coming back from completion providers.

/// Remove a Markdown code fence wrapped around a provider answer.
///
/// Providers are told to answer with bare JSON but sometimes wrap it in
/// ```` ```json ... ``` ```` anyway. Unfenced input is only trimmed.
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let without_open = match trimmed.strip_prefix("```") {
        Some(rest) => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
        None => trimmed,
    };
    let without_close = without_open.strip_suffix("```").unwrap_or(without_open);
    without_close.trim()
}

/// Reduce a free-text "which language is this" answer to a lowercase name.
///
/// Returns `None` unless the answer is a single word, e.g. `"Italian."` gives
/// `italian` but `"It looks like Italian"` gives nothing.
pub fn normalize_language_answer(answer: &str) -> Option<String> {
    let word = strip_code_fences(answer)
        .trim_matches(|c: char| !c.is_alphabetic())
        .to_lowercase();
    if word.is_empty() || !word.chars().all(|c| c.is_alphabetic() || c == '-') {
        return None;
    }
    Some(word)
}
